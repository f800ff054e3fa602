use std::collections::BTreeMap;
use std::path::Path;

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::models::Tab;

/// Minimum accepted length of `secret_key`.
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Load(#[from] ::config::ConfigError),
    #[error("secret_key must be at least {MIN_SECRET_LEN} characters long")]
    WeakSecret,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Postgres URL; when absent the in-memory store is used.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self { url: None, max_connections: default_max_connections() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TabSettings {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub debug: bool,
    pub secret_key: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Keyed by tab slug.
    #[serde(default)]
    pub tabs: BTreeMap<String, TabSettings>,
}

fn default_bind() -> String { "0.0.0.0:8080".into() }
fn default_max_connections() -> u32 { 5 }

impl Settings {
    /// Load from `$CONVO_CONFIG` (default `config.toml`) with `CONVO_*` overrides.
    pub fn load() -> Result<Self, SettingsError> {
        let path = std::env::var("CONVO_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::from_path(path)
    }

    /// The file is optional; environment variables such as `CONVO_SECRET_KEY`
    /// or `CONVO_DATABASE__URL` override it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("CONVO")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.secret_key.len() < MIN_SECRET_LEN {
            return Err(SettingsError::WeakSecret);
        }
        Ok(())
    }

    /// Configured tabs, in slug order.
    pub fn tabs(&self) -> Vec<Tab> {
        self.tabs
            .iter()
            .map(|(slug, t)| Tab { slug: slug.clone(), name: t.name.clone(), nodes: t.nodes.clone() })
            .collect()
    }
}
