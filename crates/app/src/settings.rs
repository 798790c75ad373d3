//! Handles settings for the application. Configuration is read from
//! `settings.toml` and `PYNNY__*` environment variables, the latter winning.
//!
//! See `settings.toml` at the repository root for an example.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    /// Log level for the `pynny` and `engine` targets.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
    #[default]
    #[serde(skip)]
    Unset,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_PATH)).required(false))
            .add_source(Environment::with_prefix("PYNNY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

impl Database {
    /// Connection string, `None` when nothing was configured.
    pub fn url(&self) -> Option<String> {
        match self {
            Self::Memory => Some("sqlite::memory:".to_string()),
            Self::Sqlite(path) => Some(format!("sqlite:{path}?mode=rwc")),
            Self::Unset => None,
        }
    }
}
