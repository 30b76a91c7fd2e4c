use tracing::{error, warn};

use super::Notice;
use crate::models::{BookRecord, Session};
use crate::store::FavoritesStore;

pub const ADDED_TO_FAVORITES: &str = "Book added to favorites!";
pub const NOT_SIGNED_IN: &str = "You must be logged in to save favorites.";

/// Details of one book. Only constructible with the record to show; there is
/// no fetch-by-id fallback.
#[derive(Debug, Clone)]
pub struct DetailsScreen {
    book: BookRecord,
    notice: Option<Notice>,
    saving: bool,
}

impl DetailsScreen {
    pub fn new(book: BookRecord) -> Self {
        DetailsScreen {
            book,
            notice: None,
            saving: false,
        }
    }

    pub fn book(&self) -> &BookRecord {
        &self.book
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Save this book for the signed-in user. Without a session the store is
    /// never called. The outcome is left as a one-shot notice.
    pub async fn add_to_favorites(
        &mut self,
        session: Option<&Session>,
        store: &dyn FavoritesStore,
    ) -> bool {
        let Some(session) = session else {
            warn!("Add to favorites attempted without a session");
            self.notice = Some(Notice::error(NOT_SIGNED_IN));
            return false;
        };

        self.saving = true;
        let outcome = store.add_favorite(session, &self.book).await;
        self.saving = false;
        match outcome {
            Ok(()) => {
                self.notice = Some(Notice::info(ADDED_TO_FAVORITES));
                true
            }
            Err(e) => {
                error!("Error adding favorite '{}': {}", self.book.id, e);
                self.notice = Some(Notice::error(format!("Could not save favorite: {}", e)));
                false
            }
        }
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}
