use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::store::firestore_store::FirestoreConfig;

/// The favorites store backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
#[serde(tag = "type")]
pub enum StoreConfig {
    #[serde(rename = "firestore")]
    Firestore(FirestoreConfig),
    /// Process-local documents, for development and tests.
    #[serde(rename = "memory")]
    Memory,
}
