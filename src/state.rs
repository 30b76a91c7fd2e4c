//! Shared application state.
//!
//! Bundles the configuration and the three remote clients every screen
//! action is served by.

use crate::auth::AuthClient;
use crate::config::ConfigV1;
use crate::search::BookSearch;
use crate::store::FavoritesStore;
use std::sync::Arc;

/// Services shared by the navigator and the screens.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Identity provider wrapper owning the session channel.
    pub auth: Arc<AuthClient>,
    /// Per-user favorites documents.
    pub favorites: Arc<dyn FavoritesStore>,
    /// Catalog keyword search.
    pub search: Arc<dyn BookSearch>,
}
