//! Server configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then `DND_NEAR_`-prefixed environment variables. CLI flags are applied
//! on top by the binary.

use std::net::SocketAddr;
use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_LIMIT;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DND_NEAR_";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// SQLite file; None = in-memory
    pub db_path: Option<String>,
    /// Entries kept in the roll history
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            db_path: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Build the layered figment
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load configuration from defaults, an optional file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(file).extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load(None)?;
            assert_eq!(config, Config::default());
            assert_eq!(config.bind_addr.port(), 8080);
            assert_eq!(config.history_limit, 20);
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "dnd-near.toml",
                r#"
                bind_addr = "0.0.0.0:9000"
                db_path = "state.db"
                history_limit = 5
                "#,
            )?;
            jail.set_env("DND_NEAR_HISTORY_LIMIT", "50");

            let config = Config::load(Some(Path::new("dnd-near.toml")))?;
            assert_eq!(config.bind_addr.port(), 9000);
            assert_eq!(config.db_path.as_deref(), Some("state.db"));
            assert_eq!(config.history_limit, 50);
            Ok(())
        });
    }
}
