use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::session::SessionConfig;
use super::store::StoreConfig;
use crate::providers::ProviderConfig;
use crate::search::GoogleBooksConfig;

/// Environment variables with this prefix override the YAML file.
/// Nested keys use `__`, e.g. `BOOKTRACKER_SEARCH__API_KEY`.
pub const ENV_PREFIX: &str = "BOOKTRACKER_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct ConfigV1 {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Identity provider behind register/login.
    pub auth: ProviderConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Where favorites documents live.
    pub store: StoreConfig,
    #[serde(default)]
    pub search: GoogleBooksConfig,
}

fn extract(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from a YAML file, with environment overrides on top.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, figment::Error> {
    extract(
        Figment::new()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__")),
    )
}

/// Load config from an in-memory YAML document. No environment overrides.
pub fn load_config_from_str(yaml: &str) -> Result<ConfigV1, figment::Error> {
    extract(Figment::new().merge(Yaml::string(yaml)))
}

/// The JSON schema of the configuration, pretty-printed.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}
