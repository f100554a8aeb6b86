//! Page view models
//!
//! Each navigable page of the site is described by a serializable view
//! assembled from the catalog and the engines. Rendering is left to clients.

use serde::Serialize;
use tracing::instrument;

use crate::catalog::Catalog;
use crate::chat::{SUGGESTIONS, Suggestion, welcome_messages};
use crate::map::{MapController, MapFilter, MapSettings, MapState};
use crate::models::{ChatMessage, City, Place, PlaceCategory, RecordKind};
use crate::search::{self, CategoryFilter, SearchQuery};
use crate::Result;

/// Places shown per category tab on the home page
const CATEGORY_PREVIEW: usize = 4;

/// Places listed under "Similar ..." on a place page
const SIMILAR_LIMIT: usize = 3;

pub const NO_RESULTS_MESSAGE: &str = "No results found. Try different search terms or filters.";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct HeroStat {
    pub value: &'static str,
    pub label: &'static str,
}

pub const HERO_STATS: [HeroStat; 4] = [
    HeroStat {
        value: "7,641",
        label: "Islands",
    },
    HeroStat {
        value: "82+",
        label: "Languages",
    },
    HeroStat {
        value: "36,289 km",
        label: "Coastline",
    },
    HeroStat {
        value: "∞",
        label: "Adventures",
    },
];

/// Navigation target rendered as a link
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategorySection {
    pub category: PlaceCategory,
    pub label: &'static str,
    pub places: Vec<Place>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub stats: &'static [HeroStat],
    pub featured_cities: Vec<City>,
    pub categories: Vec<CategorySection>,
}

#[instrument(skip(catalog))]
#[must_use]
pub fn home(catalog: &Catalog) -> HomeView {
    let categories = PlaceCategory::ALL
        .into_iter()
        .map(|category| CategorySection {
            category,
            label: category.section_label(),
            places: catalog
                .places_in_category(category)
                .take(CATEGORY_PREVIEW)
                .cloned()
                .collect(),
        })
        .collect();

    HomeView {
        stats: &HERO_STATS,
        featured_cities: catalog.featured_cities().cloned().collect(),
        categories,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// City options for the filter drop-down
    pub cities: Vec<Link>,
    pub filter: MapFilterView,
    pub map: MapState,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapFilterView {
    pub city: Option<String>,
    pub category: Option<String>,
    pub term: String,
}

impl From<&MapFilter> for MapFilterView {
    fn from(filter: &MapFilter) -> Self {
        Self {
            city: filter.selected_city.clone(),
            category: filter.category.as_ref().map(|c| c.to_string()),
            term: filter.term.clone(),
        }
    }
}

/// Map page for an already configured controller
#[must_use]
pub fn map_page(catalog: &Catalog, controller: &MapController<'_>) -> MapView {
    MapView {
        cities: catalog
            .cities()
            .iter()
            .map(|city| Link::new(&city.name, RecordKind::City.detail_path(&city.id)))
            .collect(),
        filter: MapFilterView::from(controller.filter()),
        map: controller.state(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatView {
    pub messages: Vec<ChatMessage>,
    pub suggestions: &'static [Suggestion],
}

#[must_use]
pub fn chat() -> ChatView {
    ChatView {
        messages: welcome_messages(),
        suggestions: &SUGGESTIONS,
    }
}

/// A place listed in search results, with the name of its city
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResult {
    #[serde(flatten)]
    pub place: Place,
    pub city_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchView {
    pub heading: String,
    /// Active filters as "City: Cebu" / "Category: Restaurant"
    pub filters: Vec<String>,
    /// Hidden while a category filter is active
    pub cities: Vec<City>,
    pub places: Vec<PlaceResult>,
    pub message: Option<&'static str>,
}

#[instrument(skip(catalog))]
#[must_use]
pub fn search_page(catalog: &Catalog, query: &SearchQuery) -> SearchView {
    let results = search::search(catalog, query);
    let empty = results.is_empty();

    let heading = if query.term.trim().is_empty() {
        "Popular Destinations".to_string()
    } else {
        format!("Search Results for \"{}\"", query.term)
    };

    let mut filters = Vec::new();
    if let Some(city_id) = &query.city {
        let name = catalog
            .city(city_id)
            .map_or(city_id.as_str(), |city| city.name.as_str());
        filters.push(format!("City: {name}"));
    }
    if let Some(category) = &query.category {
        filters.push(format!("Category: {}", category_label(category)));
    }

    let cities = if query.category.is_some() {
        Vec::new()
    } else {
        results.cities
    };
    let places = results
        .places
        .into_iter()
        .map(|place| PlaceResult {
            city_name: catalog.city_of(&place).map(|city| city.name.clone()),
            place,
        })
        .collect();

    SearchView {
        heading,
        filters,
        cities,
        places,
        message: empty.then_some(NO_RESULTS_MESSAGE),
    }
}

fn category_label(filter: &CategoryFilter) -> String {
    match filter {
        CategoryFilter::Known(category) => category.label().to_string(),
        CategoryFilter::Unknown(raw) => {
            let mut chars = raw.trim().chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CityDetailView {
    pub city: City,
    pub restaurants: Vec<Place>,
    pub attractions: Vec<Place>,
    /// Search page listing every restaurant of the city
    pub all_restaurants: Link,
    /// Search page listing every attraction of the city
    pub all_attractions: Link,
    pub map: MapState,
}

fn view_all(city: &City, category: PlaceCategory) -> Link {
    Link::new(
        format!("View all {}", category.section_label().to_lowercase()),
        format!("/search?city={}&category={}", city.id, category.as_str()),
    )
}

/// Detail page of a city; unknown ids are reported as not found
#[instrument(skip(catalog, settings))]
pub fn city_detail(catalog: &Catalog, settings: MapSettings, id: &str) -> Result<CityDetailView> {
    let city = catalog.require_city(id)?;
    let in_city = |category| {
        catalog
            .places_in_city(&city.id)
            .filter(|place| place.category == category)
            .cloned()
            .collect::<Vec<_>>()
    };

    let map = MapController::new(catalog, settings)
        .with_filter(MapFilter {
            selected_city: Some(city.id.clone()),
            ..MapFilter::default()
        })
        .state();

    Ok(CityDetailView {
        city: city.clone(),
        restaurants: in_city(PlaceCategory::Restaurant),
        attractions: in_city(PlaceCategory::Attraction),
        all_restaurants: view_all(city, PlaceCategory::Restaurant),
        all_attractions: view_all(city, PlaceCategory::Attraction),
        map,
    })
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceView {
    pub symbol: String,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetailView {
    pub place: Place,
    pub city: Option<City>,
    pub category_label: &'static str,
    pub price: Option<PriceView>,
    pub back: Link,
    pub website: String,
    pub coordinates: String,
    /// e.g. "Similar Restaurants"
    pub similar_heading: String,
    pub similar: Vec<Place>,
    pub map: MapState,
}

/// Up to three other places of the same category, from the same city or
/// without any city
#[must_use]
pub fn similar_places<'a>(catalog: &'a Catalog, place: &Place) -> Vec<&'a Place> {
    catalog
        .places_in_category(place.category)
        .filter(|other| other.id != place.id)
        .filter(|other| other.city_id == place.city_id || other.city_id.is_none())
        .take(SIMILAR_LIMIT)
        .collect()
}

/// Placeholder website derived from the place name
#[must_use]
pub fn website_for(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("www.{slug}.com")
}

/// Detail page of a place; unknown ids are reported as not found
#[instrument(skip(catalog, settings))]
pub fn place_detail(catalog: &Catalog, settings: MapSettings, id: &str) -> Result<PlaceDetailView> {
    let place = catalog.require_place(id)?;
    let city = catalog.city_of(place);

    let back = match city {
        Some(city) => Link::new(
            format!("Back to {}", city.name),
            RecordKind::City.detail_path(&city.id),
        ),
        None => Link::new("Back to Search", "/search"),
    };

    let map = MapController::new(catalog, settings)
        .with_filter(MapFilter {
            selected_city: city.map(|city| city.id.clone()),
            category: Some(CategoryFilter::Known(place.category)),
            term: String::new(),
        })
        .state();

    Ok(PlaceDetailView {
        city: city.cloned(),
        category_label: place.category.label(),
        price: place.price_level.map(|level| PriceView {
            symbol: level.symbol(),
            label: level.label(),
        }),
        back,
        website: website_for(&place.name),
        coordinates: place.position.format_coordinates(),
        similar_heading: format!("Similar {}", place.category.section_label()),
        similar: similar_places(catalog, place).into_iter().cloned().collect(),
        map,
        place: place.clone(),
    })
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotFoundView {
    pub status: u16,
    pub title: &'static str,
    pub message: &'static str,
    pub links: Vec<Link>,
}

#[must_use]
pub fn not_found() -> NotFoundView {
    NotFoundView {
        status: 404,
        title: "Page Not Found",
        message: "Sorry, we couldn't find the page you're looking for. The destination might have moved or no longer exists.",
        links: vec![
            Link::new("Go to Homepage", "/"),
            Link::new("Explore Map", "/map"),
        ],
    }
}
