//! City records

use serde::{Deserialize, Serialize};

use super::location::Position;

/// A destination city in the catalog
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Image URL
    pub image: String,
    pub position: Position,
    /// Rating from 0 to 5
    pub rating: f64,
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl City {
    /// Whether any tag contains `needle`, ignoring case.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn has_tag_containing(&self, needle: &str) -> bool {
        self.tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
    }
}
