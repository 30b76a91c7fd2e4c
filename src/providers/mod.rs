pub mod base;
pub mod firebase_provider;
pub mod plain_provider;

// Re-export so callers can "use crate::providers::{IdentityProvider, create_identity_provider};"
pub use base::{IdentityProvider, ProviderConfig, create_identity_provider};
