//! Filter/query engine
//!
//! Text search with optional city and category constraints over the catalog.
//! Results keep catalog order and an unmatched filter yields an empty list,
//! never an error.

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::catalog::Catalog;
use crate::models::{City, Place, PlaceCategory};

/// Category constraint as received from a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    Known(PlaceCategory),
    /// A name that is not a category. Admits no place.
    Unknown(String),
}

impl CategoryFilter {
    /// Parse a raw parameter; blank input means "no filter"
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        Some(match raw.parse::<PlaceCategory>() {
            Ok(category) => CategoryFilter::Known(category),
            Err(_) => CategoryFilter::Unknown(raw.to_string()),
        })
    }

    #[must_use]
    pub fn admits(&self, category: PlaceCategory) -> bool {
        matches!(self, CategoryFilter::Known(wanted) if *wanted == category)
    }

    #[must_use]
    pub fn category(&self) -> Option<PlaceCategory> {
        match self {
            CategoryFilter::Known(category) => Some(*category),
            CategoryFilter::Unknown(_) => None,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::Known(category) => f.write_str(category.as_str()),
            CategoryFilter::Unknown(raw) => f.write_str(raw.trim()),
        }
    }
}

impl From<PlaceCategory> for CategoryFilter {
    fn from(category: PlaceCategory) -> Self {
        CategoryFilter::Known(category)
    }
}

/// Search term plus structured filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub term: String,
    /// Restricts places to this city id
    pub city: Option<String>,
    /// Restricts places to this category
    pub category: Option<CategoryFilter>,
}

impl SearchQuery {
    #[must_use]
    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    /// Build a query from optional raw request parameters. The city id is
    /// trimmed; blank values mean no filter.
    #[must_use]
    pub fn from_params(term: Option<&str>, city: Option<&str>, category: Option<&str>) -> Self {
        Self {
            term: term.unwrap_or_default().to_string(),
            city: city
                .map(str::trim)
                .filter(|city| !city.is_empty())
                .map(str::to_string),
            category: category.and_then(CategoryFilter::parse),
        }
    }

    #[must_use]
    pub fn with_city(mut self, city_id: impl Into<String>) -> Self {
        self.city = Some(city_id.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<CategoryFilter>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Whether a place passes the city and category constraints
    #[must_use]
    pub fn admits_place(&self, place: &Place) -> bool {
        let city_ok = self
            .city
            .as_deref()
            .is_none_or(|city_id| place.belongs_to(city_id));
        let category_ok = self
            .category
            .as_ref()
            .is_none_or(|filter| filter.admits(place.category));
        city_ok && category_ok
    }
}

/// Cities and places matching a [`SearchQuery`]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResults {
    pub cities: Vec<City>,
    pub places: Vec<Place>,
}

impl SearchResults {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty() && self.places.is_empty()
    }
}

/// Case-insensitive substring test over name, description and tags.
///
/// `term` must already be lowercase. An empty term matches everything.
#[must_use]
pub fn text_matches(term: &str, name: &str, description: &str, tags: &[String]) -> bool {
    term.is_empty()
        || name.to_lowercase().contains(term)
        || description.to_lowercase().contains(term)
        || tags.iter().any(|tag| tag.to_lowercase().contains(term))
}

#[must_use]
pub fn city_matches(city: &City, term: &str) -> bool {
    text_matches(term, &city.name, &city.description, &city.tags)
}

#[must_use]
pub fn place_matches(place: &Place, term: &str) -> bool {
    text_matches(term, &place.name, &place.description, &place.tags)
}

/// Run a query against the catalog
#[instrument(skip(catalog))]
pub fn search(catalog: &Catalog, query: &SearchQuery) -> SearchResults {
    let term = query.term.to_lowercase();

    let cities: Vec<City> = catalog
        .cities()
        .iter()
        .filter(|city| city_matches(city, &term))
        .cloned()
        .collect();

    let places: Vec<Place> = catalog
        .places()
        .iter()
        .filter(|place| place_matches(place, &term) && query.admits_place(place))
        .cloned()
        .collect();

    debug!(
        "Search matched {} cities and {} places",
        cities.len(),
        places.len()
    );

    SearchResults { cities, places }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn catalog() -> Catalog {
        Catalog::embedded().unwrap()
    }

    fn city_contains(city: &City, term: &str) -> bool {
        let term = term.to_lowercase();
        city.name.to_lowercase().contains(&term)
            || city.description.to_lowercase().contains(&term)
            || city.tags.iter().any(|t| t.to_lowercase().contains(&term))
    }

    fn place_contains(place: &Place, term: &str) -> bool {
        let term = term.to_lowercase();
        place.name.to_lowercase().contains(&term)
            || place.description.to_lowercase().contains(&term)
            || place.tags.iter().any(|t| t.to_lowercase().contains(&term))
    }

    #[rstest]
    #[case("beach")]
    #[case("BEACH")]
    #[case("history")]
    #[case("lechon")]
    #[case("Island Hopping")]
    #[case("zzz-no-match")]
    fn test_term_containment(catalog: Catalog, #[case] term: &str) {
        let results = search(&catalog, &SearchQuery::term(term));

        for city in catalog.cities() {
            let included = results.cities.iter().any(|c| c.id == city.id);
            assert_eq!(included, city_contains(city, term), "city {}", city.id);
        }
        for place in catalog.places() {
            let included = results.places.iter().any(|p| p.id == place.id);
            assert_eq!(included, place_contains(place, term), "place {}", place.id);
        }
    }

    #[rstest]
    fn test_empty_term_returns_whole_catalog(catalog: Catalog) {
        let results = search(&catalog, &SearchQuery::default());
        assert_eq!(results.cities, catalog.cities());
        assert_eq!(results.places, catalog.places());
    }

    #[rstest]
    fn test_city_filter_restricts_places_only(catalog: Catalog) {
        let results = search(&catalog, &SearchQuery::default().with_city("cebu"));
        assert_eq!(results.cities.len(), catalog.cities().len());
        assert!(!results.places.is_empty());
        assert!(results.places.iter().all(|p| p.belongs_to("cebu")));
    }

    #[rstest]
    fn test_category_filter_leaves_cities_alone(catalog: Catalog) {
        let results = search(
            &catalog,
            &SearchQuery::default().with_category(PlaceCategory::Nightlife),
        );
        assert_eq!(results.cities.len(), catalog.cities().len());
        assert!(results
            .places
            .iter()
            .all(|p| p.category == PlaceCategory::Nightlife));
    }

    #[rstest]
    fn test_filters_are_intersections(catalog: Catalog) {
        for city in catalog.cities() {
            for category in PlaceCategory::ALL {
                let both = search(
                    &catalog,
                    &SearchQuery::default()
                        .with_city(city.id.clone())
                        .with_category(category),
                );
                let by_city = search(&catalog, &SearchQuery::default().with_city(city.id.clone()));
                let by_category =
                    search(&catalog, &SearchQuery::default().with_category(category));

                for place in &both.places {
                    assert!(by_city.places.contains(place));
                    assert!(by_category.places.contains(place));
                }
            }
        }
    }

    #[rstest]
    fn test_unknown_filters_degrade_to_empty(catalog: Catalog) {
        let query = SearchQuery::from_params(None, Some("atlantis"), None);
        assert!(search(&catalog, &query).places.is_empty());

        let query = SearchQuery::from_params(None, None, Some("spa"));
        assert_eq!(query.category, Some(CategoryFilter::Unknown("spa".into())));
        let results = search(&catalog, &query);
        assert!(results.places.is_empty());
        assert_eq!(results.cities.len(), catalog.cities().len());
    }

    #[rstest]
    fn test_blank_params_mean_no_filter() {
        let query = SearchQuery::from_params(Some(""), Some(""), Some("  "));
        assert_eq!(query, SearchQuery::default());
    }

    #[rstest]
    fn test_padded_city_param_is_trimmed(catalog: Catalog) {
        let query = SearchQuery::from_params(None, Some(" cebu "), None);
        assert_eq!(query.city.as_deref(), Some("cebu"));

        let results = search(&catalog, &query);
        assert!(!results.places.is_empty());
        assert!(results.places.iter().all(|place| place.belongs_to("cebu")));
    }

    #[rstest]
    fn test_category_param_ignores_case(catalog: Catalog) {
        let lower = SearchQuery::from_params(None, None, Some("restaurant"));
        let mixed = SearchQuery::from_params(None, None, Some(" Restaurant"));
        assert_eq!(lower, mixed);
        assert_eq!(search(&catalog, &lower), search(&catalog, &mixed));
    }

    #[rstest]
    fn test_search_is_idempotent(catalog: Catalog) {
        let query = SearchQuery::term("an").with_category(PlaceCategory::Restaurant);
        assert_eq!(search(&catalog, &query), search(&catalog, &query));
    }
}
