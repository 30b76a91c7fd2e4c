use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_key() -> String {
    "booktracker:authUser".to_string()
}

/// Where the signed-in session is kept between runs.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct SessionConfig {
    /// Storage key the serialized session is written under.
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default)]
    pub persistence: PersistenceBackend,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            key: default_key(),
            persistence: PersistenceBackend::default(),
        }
    }
}

/// The key-value backends, differentiated by a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone, Default)]
#[serde(tag = "type")]
pub enum PersistenceBackend {
    #[serde(rename = "file")]
    File { path: PathBuf },
    /// Nothing survives a restart.
    #[serde(rename = "memory")]
    #[default]
    Memory,
}
