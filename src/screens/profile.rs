use tracing::{error, warn};

use super::{DetailsScreen, Notice};
use crate::auth::AuthClient;
use crate::models::{BookRecord, Session};
use crate::store::FavoritesStore;

pub const NO_FAVORITES: &str = "You have no favorites yet!";

/// The signed-in user's favorites.
#[derive(Debug, Default)]
pub struct ProfileScreen {
    favorites: Vec<BookRecord>,
    notice: Option<Notice>,
    loading: bool,
}

impl ProfileScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn favorites(&self) -> &[BookRecord] {
        &self.favorites
    }

    /// Fetch favorites, as done when the screen is mounted. Without a session
    /// nothing is fetched. A failed fetch keeps the current list.
    pub async fn load(&mut self, session: Option<&Session>, store: &dyn FavoritesStore) {
        let Some(session) = session else {
            return;
        };
        self.loading = true;
        let outcome = store.get_favorites(session).await;
        self.loading = false;
        match outcome {
            Ok(document) => self.favorites = document.into_books(),
            Err(e) => {
                error!("Error fetching favorites: {}", e);
                self.notice = Some(Notice::error(format!("Could not load favorites: {}", e)));
            }
        }
    }

    pub fn select(&self, index: usize) -> Option<DetailsScreen> {
        self.favorites.get(index).cloned().map(DetailsScreen::new)
    }

    /// Sign out. A provider-side failure does not keep the user signed in and
    /// is only logged.
    pub async fn logout(&mut self, auth: &AuthClient) {
        if let Err(e) = auth.logout().await {
            warn!("Logout reported a failure: {}", e);
        }
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}
