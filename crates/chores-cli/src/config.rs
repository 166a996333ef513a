use chores_core::models::MaterializationConfig;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite file holding all data
    pub database_path: String,
    /// Default acting user, overridden by `--user`
    pub user: Option<String>,
    pub materialization: MaterializationSettings,
}

/// How far ahead recurring tasks are written out.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MaterializationSettings {
    /// The horizon is the last day of the month this many months after the current one
    pub horizon_months: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "chores.db".to_string(),
            user: None,
            materialization: MaterializationSettings::default(),
        }
    }
}

impl Default for MaterializationSettings {
    fn default() -> Self {
        Self {
            horizon_months: MaterializationConfig::default().horizon_months,
        }
    }
}

impl From<&MaterializationSettings> for MaterializationConfig {
    fn from(settings: &MaterializationSettings) -> Self {
        MaterializationConfig {
            horizon_months: settings.horizon_months,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("CHORES_").split("__"))
    }
}
