//! Catalog store
//!
//! Holds the immutable city and place collections every other component reads
//! from. The catalog is loaded once at startup, either from the document
//! embedded in the binary or from a JSON file with the same shape.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::models::{City, Place, PlaceCategory, RecordKind};
use crate::{Result, WertigoError};

const EMBEDDED_CATALOG: &str = include_str!("catalog.json");

/// On-disk shape of a catalog document
#[derive(Debug, Serialize, Deserialize)]
struct CatalogDocument {
    cities: Vec<City>,
    places: Vec<Place>,
}

/// Read-only collection of cities and places, in catalog order
#[derive(Debug, Clone)]
pub struct Catalog {
    cities: Vec<City>,
    places: Vec<Place>,
}

impl Catalog {
    /// Build a catalog from records, validating its invariants
    pub fn new(cities: Vec<City>, places: Vec<Place>) -> Result<Self> {
        let catalog = Self { cities, places };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog shipped with the binary
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Parse a catalog document
    pub fn from_json(json: &str) -> Result<Self> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::new(document.cities, document.places)
    }

    /// Load a catalog document from disk
    #[instrument]
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("Reading catalog from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from `path` when given, otherwise use the embedded catalog
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let catalog = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::embedded()?,
        };
        info!(
            "Catalog loaded with {} cities and {} places",
            catalog.cities.len(),
            catalog.places.len()
        );
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut city_ids = HashSet::new();
        for city in &self.cities {
            if !city_ids.insert(city.id.as_str()) {
                return Err(WertigoError::catalog(format!(
                    "Duplicate city id '{}'",
                    city.id
                )));
            }
            check_record(RecordKind::City, &city.id, city.rating, city.position.is_valid())?;
        }

        let mut place_ids = HashSet::new();
        for place in &self.places {
            if !place_ids.insert(place.id.as_str()) {
                return Err(WertigoError::catalog(format!(
                    "Duplicate place id '{}'",
                    place.id
                )));
            }
            check_record(RecordKind::Place, &place.id, place.rating, place.position.is_valid())?;

            if let Some(city_id) = &place.city_id {
                if !city_ids.contains(city_id.as_str()) {
                    warn!(
                        "Place '{}' references unknown city '{}'",
                        place.id, city_id
                    );
                }
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    #[must_use]
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    #[must_use]
    pub fn city(&self, id: &str) -> Option<&City> {
        self.cities.iter().find(|city| city.id == id)
    }

    #[must_use]
    pub fn place(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|place| place.id == id)
    }

    /// Like [`Catalog::city`], reporting a miss as [`WertigoError::NotFound`]
    pub fn require_city(&self, id: &str) -> Result<&City> {
        self.city(id)
            .ok_or_else(|| WertigoError::not_found(RecordKind::City, id))
    }

    /// Like [`Catalog::place`], reporting a miss as [`WertigoError::NotFound`]
    pub fn require_place(&self, id: &str) -> Result<&Place> {
        self.place(id)
            .ok_or_else(|| WertigoError::not_found(RecordKind::Place, id))
    }

    /// The city a place belongs to, when the reference resolves
    #[must_use]
    pub fn city_of(&self, place: &Place) -> Option<&City> {
        place.city_id.as_deref().and_then(|id| self.city(id))
    }

    pub fn places_in_city<'a>(&'a self, city_id: &'a str) -> impl Iterator<Item = &'a Place> + 'a {
        self.places.iter().filter(move |place| place.belongs_to(city_id))
    }

    pub fn places_in_category(&self, category: PlaceCategory) -> impl Iterator<Item = &Place> + '_ {
        self.places
            .iter()
            .filter(move |place| place.category == category)
    }

    pub fn featured_cities(&self) -> impl Iterator<Item = &City> + '_ {
        self.cities.iter().filter(|city| city.is_featured)
    }
}

fn check_record(kind: RecordKind, id: &str, rating: f64, position_valid: bool) -> Result<()> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(WertigoError::catalog(format!(
            "{} '{}' has rating {} outside 0-5",
            kind.as_str(),
            id,
            rating
        )));
    }
    if !position_valid {
        return Err(WertigoError::catalog(format!(
            "{} '{}' has an invalid position",
            kind.as_str(),
            id
        )));
    }
    Ok(())
}
