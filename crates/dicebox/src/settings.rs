//! Server settings: built-in defaults, an optional `dicebox.toml`, then the
//! process environment.

use std::collections::HashMap;
use std::time::Duration;

use config::{Config, Environment, File};
use dicebox_session::RegistryConfig;
use serde::Deserialize;

use crate::DiceboxError;

/// Everything the server binary needs to start.
///
/// Environment keys are the upper-case field names: `HOST`, `PORT`,
/// `DEBUG`, `MAX_NUM_SESSIONS`, `MAX_NUM_PLAYERS`, `MAX_ROLL_NUM`,
/// `DEFAULT_DURATION_SECONDS`, `MAX_DURATION_SECONDS`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Log at `debug` instead of `warn` when `RUST_LOG` is unset.
    pub debug: bool,
    pub max_num_sessions: usize,
    /// Largest `num_players` a client may ask for.
    pub max_num_players: usize,
    /// Exclusive upper bound for rolls.
    pub max_roll_num: u32,
    pub default_duration_seconds: u64,
    /// Longer requested durations are cut down to this.
    pub max_duration_seconds: u64,
}

impl ServerConfig {
    /// Loads settings from `dicebox.toml` (if present) and the environment.
    pub fn load() -> Result<Self, DiceboxError> {
        Self::build(Environment::default())
    }

    /// Loads settings with `vars` standing in for the process environment.
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self, DiceboxError> {
        Self::build(Environment::default().source(Some(vars)))
    }

    fn build(env: Environment) -> Result<Self, DiceboxError> {
        let settings = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("debug", false)?
            .set_default("max_num_sessions", 100)?
            .set_default("max_num_players", 1_000)?
            .set_default("max_roll_num", 100)?
            .set_default("default_duration_seconds", 10)?
            .set_default("max_duration_seconds", 3_600)?
            .add_source(File::with_name("dicebox").required(false))
            .add_source(env.try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// The `host:port` string to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Registry settings derived from this config. Not yet validated.
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            max_sessions: self.max_num_sessions,
            max_players: self.max_num_players,
            max_roll: self.max_roll_num,
            default_duration: Duration::from_secs(self.default_duration_seconds),
            max_duration: Duration::from_secs(self.max_duration_seconds),
            ..RegistryConfig::default()
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "warn" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_from_env_map_empty_uses_defaults() {
        let config = ServerConfig::from_env_map(HashMap::new()).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert!(!config.debug);
        assert_eq!(config.max_num_sessions, 100);
        assert_eq!(config.max_roll_num, 100);
        assert_eq!(config.default_duration_seconds, 10);
        assert_eq!(config.max_num_players, 1_000);
        assert_eq!(config.max_duration_seconds, 3_600);
        assert_eq!(config.addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_from_env_map_overrides_defaults() {
        let config = ServerConfig::from_env_map(vars(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("DEBUG", "true"),
            ("MAX_NUM_SESSIONS", "7"),
            ("MAX_ROLL_NUM", "6"),
        ]))
        .unwrap();

        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert!(config.debug);
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.max_num_sessions, 7);
        assert_eq!(config.max_roll_num, 6);
    }

    #[test]
    fn test_from_env_map_invalid_port_fails() {
        let result = ServerConfig::from_env_map(vars(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(DiceboxError::Config(_))));
    }

    #[test]
    fn test_registry_config_carries_limits() {
        let config = ServerConfig::from_env_map(vars(&[
            ("MAX_NUM_SESSIONS", "3"),
            ("DEFAULT_DURATION_SECONDS", "30"),
            ("MAX_NUM_PLAYERS", "12"),
            ("MAX_DURATION_SECONDS", "120"),
        ]))
        .unwrap();

        let registry = config.registry_config();

        assert_eq!(registry.max_sessions, 3);
        assert_eq!(registry.max_players, 12);
        assert_eq!(registry.max_duration, Duration::from_secs(120));
        assert_eq!(registry.max_roll, 100);
        assert_eq!(registry.default_duration, Duration::from_secs(30));
        assert_eq!(registry.id_length, 20);
    }

    #[test]
    fn test_log_filter_defaults_to_warn() {
        let config = ServerConfig::from_env_map(HashMap::new()).unwrap();
        assert_eq!(config.log_filter(), "warn");
    }
}
