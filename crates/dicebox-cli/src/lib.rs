//! Command-line client for dicebox.
//!
//! ```text
//! dicebox new --num 3 --duration 30
//! dicebox roll --session <id> --user alice
//! ```

mod client;
mod commands;
mod error;
pub mod output;

pub use client::DiceboxClient;
pub use commands::{Cli, Commands, NewArgs, RollArgs};
pub use error::CliError;
