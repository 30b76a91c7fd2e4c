use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fallback shown when a volume carries no authors.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// A volume as returned by the catalog search API.
///
/// Only the fields the screens read are typed. Everything else is kept in
/// `extra` so a record written to the favorites store comes back as the same
/// JSON tree.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub id: String,
    #[serde(rename = "volumeInfo", default)]
    pub volume_info: VolumeInfo,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "imageLinks", skip_serializing_if = "Option::is_none")]
    pub image_links: Option<ImageLinks>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ImageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BookRecord {
    /// Build a record with just the typed fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>, authors: Option<Vec<String>>) -> Self {
        BookRecord {
            id: id.into(),
            volume_info: VolumeInfo {
                title: title.into(),
                authors,
                ..Default::default()
            },
            extra: Map::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.volume_info.title
    }

    pub fn description(&self) -> Option<&str> {
        self.volume_info.description.as_deref()
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.volume_info
            .image_links
            .as_ref()
            .and_then(|links| links.thumbnail.as_deref())
    }

    /// Authors joined with ", ", or [`UNKNOWN_AUTHOR`].
    pub fn author_line(&self) -> String {
        match &self.volume_info.authors {
            Some(authors) if !authors.is_empty() => authors.join(", "),
            _ => UNKNOWN_AUTHOR.to_string(),
        }
    }
}
