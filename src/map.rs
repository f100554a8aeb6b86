//! Map state controller
//!
//! Derives the markers and viewport of the map from the current filter and
//! city selection, and tracks the single focused entity shown in the info
//! overlay.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::catalog::Catalog;
use crate::config::MapConfig;
use crate::models::{Place, PlaceCategory, Position, RecordKind};
use crate::search::{self, CategoryFilter, SearchQuery};
use crate::{Result, WertigoError};

/// Fixed viewport parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSettings {
    /// Country-level center used when no city is selected
    pub overview_center: Position,
    pub overview_zoom: u8,
    /// Zoom applied when centering on a selected city
    pub city_zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            overview_center: Position::new(12.8797, 121.7740),
            overview_zoom: 6,
            city_zoom: 10,
        }
    }
}

impl From<&MapConfig> for MapSettings {
    fn from(config: &MapConfig) -> Self {
        Self {
            overview_center: Position::new(config.center_latitude, config.center_longitude),
            overview_zoom: config.overview_zoom,
            city_zoom: config.city_zoom,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Viewport {
    pub center: Position,
    pub zoom: u8,
}

/// Icon family of a marker
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStyle {
    City,
    Restaurant,
    Attraction,
}

impl MarkerStyle {
    fn for_place(place: &Place) -> Self {
        match place.category {
            PlaceCategory::Restaurant => MarkerStyle::Restaurant,
            _ => MarkerStyle::Attraction,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Marker {
    pub kind: RecordKind,
    pub id: String,
    pub name: String,
    pub position: Position,
    pub style: MarkerStyle,
    pub rating: f64,
}

/// Reference to a focusable catalog entity, written `city:<id>` or `place:<id>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub kind: RecordKind,
    pub id: String,
}

impl EntityRef {
    #[must_use]
    pub fn city(id: impl Into<String>) -> Self {
        Self {
            kind: RecordKind::City,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn place(id: impl Into<String>) -> Self {
        Self {
            kind: RecordKind::Place,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

impl FromStr for EntityRef {
    type Err = WertigoError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (kind, id) = s.split_once(':').ok_or_else(|| {
            WertigoError::validation("Focus must look like 'city:<id>' or 'place:<id>'")
        })?;
        let id = id.trim();
        if id.is_empty() {
            return Err(WertigoError::validation("Focus id cannot be empty"));
        }
        match kind.trim() {
            "city" => Ok(EntityRef::city(id)),
            "place" => Ok(EntityRef::place(id)),
            other => Err(WertigoError::validation(format!(
                "Unknown focus kind '{other}'"
            ))),
        }
    }
}

/// Marker focus state machine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Unfocused,
    Focused(EntityRef),
}

/// Details shown for the focused entity
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FocusOverlay {
    pub kind: RecordKind,
    pub id: String,
    pub name: String,
    pub image: String,
    pub rating: f64,
    /// First two tags
    pub tags: Vec<String>,
    pub description: String,
    pub link: String,
}

const OVERLAY_TAGS: usize = 2;

/// Filter and selection inputs of the map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapFilter {
    pub selected_city: Option<String>,
    pub category: Option<CategoryFilter>,
    pub term: String,
}

impl From<SearchQuery> for MapFilter {
    fn from(query: SearchQuery) -> Self {
        Self {
            selected_city: query.city,
            category: query.category,
            term: query.term,
        }
    }
}

impl MapFilter {
    fn to_query(&self) -> SearchQuery {
        SearchQuery {
            term: self.term.clone(),
            city: self.selected_city.clone(),
            category: self.category.clone(),
        }
    }
}

/// Everything a map view needs to render
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapState {
    pub viewport: Viewport,
    pub markers: Vec<Marker>,
    pub focus: Option<FocusOverlay>,
}

/// Map state container for one view
#[derive(Debug, Clone)]
pub struct MapController<'a> {
    catalog: &'a Catalog,
    settings: MapSettings,
    filter: MapFilter,
    focus: Focus,
}

impl<'a> MapController<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, settings: MapSettings) -> Self {
        Self {
            catalog,
            settings,
            filter: MapFilter::default(),
            focus: Focus::Unfocused,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: MapFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn filter(&self) -> &MapFilter {
        &self.filter
    }

    #[must_use]
    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    /// Focus an entity, replacing any previous focus.
    ///
    /// Ids missing from the catalog leave the state untouched.
    pub fn select(&mut self, target: EntityRef) -> Result<()> {
        match target.kind {
            RecordKind::City => {
                self.catalog.require_city(&target.id)?;
            }
            RecordKind::Place => {
                self.catalog.require_place(&target.id)?;
            }
        }
        debug!("Map focus set to {}", target);
        self.focus = Focus::Focused(target);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.focus = Focus::Unfocused;
    }

    /// Return to the default view; drops the focus overlay
    pub fn reset_view(&mut self) {
        self.clear();
    }

    /// Center and zoom for the current selection
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        match self
            .filter
            .selected_city
            .as_deref()
            .and_then(|id| self.catalog.city(id))
        {
            Some(city) => Viewport {
                center: city.position,
                zoom: self.settings.city_zoom,
            },
            None => Viewport {
                center: self.settings.overview_center,
                zoom: self.settings.overview_zoom,
            },
        }
    }

    /// City markers first, then place markers, each in catalog order
    #[must_use]
    pub fn markers(&self) -> Vec<Marker> {
        let results = search::search(self.catalog, &self.filter.to_query());

        let cities = results.cities.into_iter().map(|city| Marker {
            kind: RecordKind::City,
            style: MarkerStyle::City,
            position: city.position,
            rating: city.rating,
            id: city.id,
            name: city.name,
        });
        let places = results.places.into_iter().map(|place| Marker {
            kind: RecordKind::Place,
            style: MarkerStyle::for_place(&place),
            position: place.position,
            rating: place.rating,
            id: place.id,
            name: place.name,
        });

        cities.chain(places).collect()
    }

    #[must_use]
    pub fn overlay(&self) -> Option<FocusOverlay> {
        let Focus::Focused(target) = &self.focus else {
            return None;
        };

        match target.kind {
            RecordKind::City => self.catalog.city(&target.id).map(|city| FocusOverlay {
                kind: RecordKind::City,
                id: city.id.clone(),
                name: city.name.clone(),
                image: city.image.clone(),
                rating: city.rating,
                tags: city.tags.iter().take(OVERLAY_TAGS).cloned().collect(),
                description: city.description.clone(),
                link: RecordKind::City.detail_path(&city.id),
            }),
            RecordKind::Place => self.catalog.place(&target.id).map(|place| FocusOverlay {
                kind: RecordKind::Place,
                id: place.id.clone(),
                name: place.name.clone(),
                image: place.image.clone(),
                rating: place.rating,
                tags: place.tags.iter().take(OVERLAY_TAGS).cloned().collect(),
                description: place.description.clone(),
                link: RecordKind::Place.detail_path(&place.id),
            }),
        }
    }

    #[instrument(skip(self))]
    #[must_use]
    pub fn state(&self) -> MapState {
        MapState {
            viewport: self.viewport(),
            markers: self.markers(),
            focus: self.overlay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn catalog() -> Catalog {
        Catalog::embedded().unwrap()
    }

    #[rstest]
    fn test_overview_viewport(catalog: Catalog) {
        let map = MapController::new(&catalog, MapSettings::default());
        let viewport = map.viewport();
        assert_eq!(viewport.center, Position::new(12.8797, 121.7740));
        assert_eq!(viewport.zoom, 6);
    }

    #[rstest]
    fn test_selected_city_viewport(catalog: Catalog) {
        let map = MapController::new(&catalog, MapSettings::default()).with_filter(MapFilter {
            selected_city: Some("bohol".into()),
            ..MapFilter::default()
        });
        let viewport = map.viewport();
        assert_eq!(viewport.center, catalog.city("bohol").unwrap().position);
        assert_eq!(viewport.zoom, 10);
    }

    #[rstest]
    fn test_unknown_selected_city_falls_back_to_overview(catalog: Catalog) {
        let map = MapController::new(&catalog, MapSettings::default()).with_filter(MapFilter {
            selected_city: Some("atlantis".into()),
            ..MapFilter::default()
        });
        assert_eq!(map.viewport().zoom, 6);
        assert!(map
            .markers()
            .iter()
            .all(|marker| marker.kind == RecordKind::City));
    }

    #[rstest]
    fn test_markers_follow_filters(catalog: Catalog) {
        let map = MapController::new(&catalog, MapSettings::default()).with_filter(MapFilter {
            selected_city: Some("cebu".into()),
            category: Some(PlaceCategory::Restaurant.into()),
            term: String::new(),
        });
        let markers = map.markers();

        let cities = markers.iter().filter(|m| m.kind == RecordKind::City).count();
        assert_eq!(cities, catalog.cities().len());

        let places: Vec<&Marker> = markers.iter().filter(|m| m.kind == RecordKind::Place).collect();
        assert!(!places.is_empty());
        for marker in places {
            let place = catalog.place(&marker.id).unwrap();
            assert!(place.belongs_to("cebu"));
            assert_eq!(marker.style, MarkerStyle::Restaurant);
        }
    }

    #[rstest]
    fn test_marker_styles(catalog: Catalog) {
        let map = MapController::new(&catalog, MapSettings::default());
        for marker in map.markers() {
            let expected = match marker.kind {
                RecordKind::City => MarkerStyle::City,
                RecordKind::Place => {
                    match catalog.place(&marker.id).unwrap().category {
                        PlaceCategory::Restaurant => MarkerStyle::Restaurant,
                        _ => MarkerStyle::Attraction,
                    }
                }
            };
            assert_eq!(marker.style, expected);
        }
    }

    #[rstest]
    fn test_focus_transitions(catalog: Catalog) {
        let mut map = MapController::new(&catalog, MapSettings::default());
        assert_eq!(map.focus(), &Focus::Unfocused);

        map.select(EntityRef::city("cebu")).unwrap();
        assert_eq!(map.focus(), &Focus::Focused(EntityRef::city("cebu")));

        map.select(EntityRef::place("white-beach")).unwrap();
        assert_eq!(map.focus(), &Focus::Focused(EntityRef::place("white-beach")));

        map.clear();
        assert_eq!(map.focus(), &Focus::Unfocused);

        map.clear();
        assert_eq!(map.focus(), &Focus::Unfocused);
    }

    #[rstest]
    fn test_unknown_focus_keeps_state(catalog: Catalog) {
        let mut map = MapController::new(&catalog, MapSettings::default());
        map.select(EntityRef::city("vigan")).unwrap();

        let err = map.select(EntityRef::place("nowhere")).unwrap_err();
        assert!(matches!(err, WertigoError::NotFound { .. }));
        assert_eq!(map.focus(), &Focus::Focused(EntityRef::city("vigan")));
    }

    #[rstest]
    fn test_reset_view_clears_focus(catalog: Catalog) {
        let mut map = MapController::new(&catalog, MapSettings::default());
        map.select(EntityRef::place("kayangan-lake")).unwrap();
        map.reset_view();
        assert!(map.overlay().is_none());
    }

    #[rstest]
    fn test_overlay_shows_two_tags(catalog: Catalog) {
        let mut map = MapController::new(&catalog, MapSettings::default());
        map.select(EntityRef::city("boracay")).unwrap();
        let overlay = map.state().focus.unwrap();
        assert_eq!(overlay.name, "Boracay");
        assert_eq!(overlay.tags.len(), 2);
        assert_eq!(overlay.link, "/city/boracay");
    }

    #[rstest]
    #[case("city:cebu", EntityRef::city("cebu"))]
    #[case("place:white-beach", EntityRef::place("white-beach"))]
    fn test_entity_ref_parse(#[case] raw: &str, #[case] expected: EntityRef) {
        assert_eq!(raw.parse::<EntityRef>().unwrap(), expected);
        assert_eq!(expected.to_string(), raw);
    }

    #[rstest]
    #[case("cebu")]
    #[case("town:cebu")]
    #[case("city:")]
    fn test_entity_ref_rejects(#[case] raw: &str) {
        assert!(raw.parse::<EntityRef>().is_err());
    }
}
