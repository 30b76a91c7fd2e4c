pub mod client;
pub mod persistence;

pub use client::{AuthClient, SessionSubscription};
pub use persistence::{FileStorage, KeyValueStorage, MemoryStorage, create_storage};
