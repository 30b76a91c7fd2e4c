pub mod base;
pub mod firestore_store;
pub mod firestore_value;
pub mod memory_store;

// Re-export the primary store items so code outside can do
// "use crate::store::{FavoritesStore, create_store};"
pub use base::{FavoritesStore, create_store};
