//! Points of interest and their classification

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::location::Position;
use crate::WertigoError;

/// Kind of point of interest
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Restaurant,
    Attraction,
    Accommodation,
    Shopping,
    Nightlife,
}

impl PlaceCategory {
    /// Every category, in the order the category explorer lists them
    pub const ALL: [PlaceCategory; 5] = [
        PlaceCategory::Restaurant,
        PlaceCategory::Attraction,
        PlaceCategory::Accommodation,
        PlaceCategory::Shopping,
        PlaceCategory::Nightlife,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::Restaurant => "restaurant",
            PlaceCategory::Attraction => "attraction",
            PlaceCategory::Accommodation => "accommodation",
            PlaceCategory::Shopping => "shopping",
            PlaceCategory::Nightlife => "nightlife",
        }
    }

    /// Capitalised name, e.g. "Restaurant"
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            PlaceCategory::Restaurant => "Restaurant",
            PlaceCategory::Attraction => "Attraction",
            PlaceCategory::Accommodation => "Accommodation",
            PlaceCategory::Shopping => "Shopping",
            PlaceCategory::Nightlife => "Nightlife",
        }
    }

    /// Heading used for a list of places of this category
    #[must_use]
    pub fn section_label(&self) -> &'static str {
        match self {
            PlaceCategory::Restaurant => "Restaurants",
            PlaceCategory::Attraction => "Attractions",
            PlaceCategory::Accommodation => "Accommodations",
            PlaceCategory::Shopping => "Shopping",
            PlaceCategory::Nightlife => "Nightlife",
        }
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceCategory {
    type Err = WertigoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlaceCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WertigoError::validation(format!("Unknown place category: {s}")))
    }
}

/// Relative cost of a place, 1 (cheapest) to 4
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub enum PriceLevel {
    Inexpensive = 1,
    Moderate = 2,
    Expensive = 3,
    VeryExpensive = 4,
}

impl PriceLevel {
    #[must_use]
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Dollar signs, one per level
    #[must_use]
    pub fn symbol(&self) -> String {
        "$".repeat(usize::from(self.value()))
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            PriceLevel::Inexpensive => "Inexpensive",
            PriceLevel::Moderate => "Moderate",
            PriceLevel::Expensive => "Expensive",
            PriceLevel::VeryExpensive => "Very Expensive",
        }
    }
}

impl TryFrom<u8> for PriceLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PriceLevel::Inexpensive),
            2 => Ok(PriceLevel::Moderate),
            3 => Ok(PriceLevel::Expensive),
            4 => Ok(PriceLevel::VeryExpensive),
            other => Err(format!("price level must be between 1 and 4, got {other}")),
        }
    }
}

impl From<PriceLevel> for u8 {
    fn from(level: PriceLevel) -> Self {
        level.value()
    }
}

/// A point of interest belonging (loosely) to a city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub position: Position,
    /// Owning city. Not guaranteed to reference a catalog city.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_id: Option<String>,
    pub category: PlaceCategory,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<PriceLevel>,
    pub tags: Vec<String>,
}

impl Place {
    /// Whether any tag contains `needle`, ignoring case.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn has_tag_containing(&self, needle: &str) -> bool {
        self.tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
    }

    #[must_use]
    pub fn belongs_to(&self, city_id: &str) -> bool {
        self.city_id.as_deref() == Some(city_id)
    }
}
