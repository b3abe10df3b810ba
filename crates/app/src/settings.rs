//! Settings for the `starjar` binary.
//!
//! Read from `settings.toml` (optional) and then from `STARJAR_*`
//! environment variables, e.g. `STARJAR_LEDGER__MAX_AWARD_POINTS=20`.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub max_award_points: i64,
    pub lock_timeout_ms: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        let defaults = engine::LedgerSettings::default();
        Self {
            max_award_points: defaults.max_award_points,
            lock_timeout_ms: u64::try_from(defaults.lock_timeout.as_millis()).unwrap_or(2_000),
        }
    }
}

impl From<&Ledger> for engine::LedgerSettings {
    fn from(value: &Ledger) -> Self {
        Self {
            max_award_points: value.max_award_points,
            lock_timeout: Duration::from_millis(value.lock_timeout_ms),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub ledger: Ledger,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(
                    Environment::with_prefix("STARJAR")
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}
