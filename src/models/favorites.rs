use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::book::BookRecord;

/// The per-user favorites document: book id -> book record.
///
/// The key space is exactly the set of favorited ids. There is no removal;
/// writes only ever add or replace a single key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct FavoritesDocument {
    books: BTreeMap<String, BookRecord>,
}

impl FavoritesDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `book` under its id, replacing a previous entry for that id only.
    pub fn merge(&mut self, book: BookRecord) {
        self.books.insert(book.id.clone(), book);
    }

    pub fn get(&self, book_id: &str) -> Option<&BookRecord> {
        self.books.get(book_id)
    }

    pub fn contains(&self, book_id: &str) -> bool {
        self.books.contains_key(book_id)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn into_books(self) -> Vec<BookRecord> {
        self.books.into_values().collect()
    }
}

impl FromIterator<BookRecord> for FavoritesDocument {
    fn from_iter<T: IntoIterator<Item = BookRecord>>(iter: T) -> Self {
        let mut doc = FavoritesDocument::new();
        for book in iter {
            doc.merge(book);
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_replaces_only_same_id() {
        let mut doc = FavoritesDocument::new();
        doc.merge(BookRecord::new("a", "First", None));
        doc.merge(BookRecord::new("b", "Second", None));
        doc.merge(BookRecord::new("a", "First, revised", None));

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("a").unwrap().title(), "First, revised");
        assert_eq!(doc.get("b").unwrap().title(), "Second");
    }

    #[test]
    fn test_serializes_as_plain_mapping() {
        let doc: FavoritesDocument = vec![BookRecord::new("a", "First", None)].into_iter().collect();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["a"]["volumeInfo"]["title"], "First");
    }
}
