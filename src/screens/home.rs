use crate::models::BookRecord;
use crate::screens::DetailsScreen;
use crate::search::BookSearch;

/// Search box and result list.
#[derive(Debug, Default)]
pub struct HomeScreen {
    pub query: String,
    results: Vec<BookRecord>,
    loading: bool,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn results(&self) -> &[BookRecord] {
        &self.results
    }

    /// Run the current query. A blank query does nothing and keeps the
    /// previous results; returns whether a search was issued.
    ///
    /// Each response replaces the list wholesale, so when searches overlap the
    /// last one to finish wins.
    pub async fn search(&mut self, search: &dyn BookSearch) -> bool {
        if self.query.trim().is_empty() {
            return false;
        }
        self.loading = true;
        self.results = search.search(&self.query).await;
        self.loading = false;
        true
    }

    /// Open the details of result `index`, carrying that exact record.
    pub fn select(&self, index: usize) -> Option<DetailsScreen> {
        self.results.get(index).cloned().map(DetailsScreen::new)
    }
}
