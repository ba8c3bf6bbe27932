//! Handles settings for the application. Configuration is read from
//! `settings.toml` (optional) and `EASY_INVENTORY_*` environment variables.
//!
//! ```toml
//! [app]
//! level = "info"
//! timezone = "Africa/Cairo"
//!
//! [database]
//! sqlite = "easy_inventory.db"
//! ```
//!
//! `database = "memory"` keeps everything in memory, which is only useful
//! for trying the commands out.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
    /// IANA name used for report months and statement dates.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
            timezone: default_timezone(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("easy_inventory.db".to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("EASY_INVENTORY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
