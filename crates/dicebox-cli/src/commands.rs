//! CLI command definitions and dispatch.

use clap::{Args, Parser, Subcommand};
use dicebox_protocol::{PlayerId, SessionId};

use crate::{CliError, DiceboxClient, output};

/// dicebox: roll dice against other players
#[derive(Debug, Parser)]
#[command(name = "dicebox", version, about, long_about = None)]
pub struct Cli {
    /// URL of the dicebox server
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    pub url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new session and print its id
    New(NewArgs),
    /// Roll in a session and wait for the winner
    Roll(RollArgs),
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Number of players per session
    #[arg(long, default_value_t = 2)]
    pub num: i64,

    /// Session duration in seconds
    #[arg(long, default_value_t = 10)]
    pub duration: i64,
}

#[derive(Debug, Args)]
pub struct RollArgs {
    /// Username, must be unique per session
    #[arg(long)]
    pub user: String,

    /// Session id to roll for
    #[arg(long)]
    pub session: String,
}

impl Cli {
    /// Runs the command and returns the line to print.
    pub async fn execute(&self) -> Result<String, CliError> {
        let client = DiceboxClient::new(self.url.as_str());
        match &self.command {
            Commands::New(args) => {
                let info = client.create_session(args.num, args.duration).await?;
                Ok(output::session_created(&info))
            }
            Commands::Roll(args) => {
                let session_id = SessionId::new(args.session.as_str());
                let player_id = PlayerId::new(args.user.as_str());
                let response = client.roll(&session_id, &player_id).await?;
                Ok(output::roll_outcome(&response))
            }
        }
    }
}
