//! Recommendation responder
//!
//! Maps a free-text utterance to a canned reply and a short list of catalog
//! records. Rules are evaluated in a fixed order and the first one that
//! applies produces the reply; the last rule always applies.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::catalog::Catalog;
use crate::models::{City, Place, PlaceCategory, Recommendation};

/// Upper bound on recommendations attached to a reply
pub const MAX_RECOMMENDATIONS: usize = 5;

const BEACH_CITY_LIMIT: usize = 3;
const BEACH_PLACE_LIMIT: usize = 2;
const CITY_PLACE_LIMIT: usize = 4;

pub const BEACH_REPLY: &str =
    "Here are some of the Philippines' most beautiful beaches and beach destinations:";
pub const FOOD_REPLY: &str = "Here are some of the best-rated restaurants across the Philippines:";
pub const DEFAULT_REPLY: &str = "Here are some of our top-rated destinations in the Philippines:";

/// Reply text plus the records backing it
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Reply {
    pub text: String,
    pub recommendations: Vec<Recommendation>,
    /// Name of the rule that produced this reply
    pub rule: &'static str,
}

type Predicate = fn(&Catalog, &str) -> bool;
type Handler = fn(&Catalog, &str) -> Option<(String, Vec<Recommendation>)>;

/// One (predicate, handler) pair of the rule chain.
///
/// Both functions receive the lowercased utterance. A handler returning
/// `None` passes control to the next rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    applies: Predicate,
    handle: Handler,
}

impl Rule {
    #[must_use]
    pub const fn new(name: &'static str, applies: Predicate, handle: Handler) -> Self {
        Self {
            name,
            applies,
            handle,
        }
    }

    /// Whether this rule would fire for `utterance`
    #[must_use]
    pub fn applies(&self, catalog: &Catalog, utterance: &str) -> bool {
        (self.applies)(catalog, &utterance.to_lowercase())
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Ordered rule chain over a catalog
#[derive(Debug, Clone)]
pub struct Responder {
    rules: Vec<Rule>,
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Responder {
    /// A responder with a custom rule order
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Answer an utterance
    #[instrument(skip(self, catalog))]
    pub fn respond(&self, catalog: &Catalog, utterance: &str) -> Reply {
        let lowered = utterance.to_lowercase();

        for rule in &self.rules {
            if !(rule.applies)(catalog, &lowered) {
                continue;
            }
            if let Some((text, mut recommendations)) = (rule.handle)(catalog, &lowered) {
                recommendations.truncate(MAX_RECOMMENDATIONS);
                debug!(
                    "Rule '{}' answered with {} recommendations",
                    rule.name,
                    recommendations.len()
                );
                return Reply {
                    text,
                    recommendations,
                    rule: rule.name,
                };
            }
        }

        // Only reachable with a custom chain lacking a catch-all rule
        debug!("No rule answered, falling back to top-rated cities");
        let (text, recommendations) = top_rated_cities(catalog);
        Reply {
            text,
            recommendations,
            rule: "default",
        }
    }
}

/// Beach, food, city mention, then top-rated cities
#[must_use]
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new("beach", mentions_beach, beach_destinations),
        Rule::new("food", mentions_food, best_restaurants),
        Rule::new("city", |catalog, text| mentioned_city(catalog, text).is_some(), city_highlights),
        Rule::new("default", |_, _| true, |catalog, _| Some(top_rated_cities(catalog))),
    ]
}

fn mentions_beach(_: &Catalog, text: &str) -> bool {
    // "beaches" contains "beach"
    text.contains("beach")
}

fn mentions_food(_: &Catalog, text: &str) -> bool {
    text.contains("food") || text.contains("restaurant")
}

/// First city, in catalog order, whose name occurs in `text`
fn mentioned_city<'a>(catalog: &'a Catalog, text: &str) -> Option<&'a City> {
    catalog
        .cities()
        .iter()
        .find(|city| text.contains(&city.name.to_lowercase()))
}

fn beach_destinations(catalog: &Catalog, _: &str) -> Option<(String, Vec<Recommendation>)> {
    let cities = catalog
        .cities()
        .iter()
        .filter(|city| city.has_tag_containing("beach"))
        .take(BEACH_CITY_LIMIT)
        .map(Recommendation::from);
    let places = catalog
        .places()
        .iter()
        .filter(|place| place.has_tag_containing("beach"))
        .take(BEACH_PLACE_LIMIT)
        .map(Recommendation::from);

    Some((BEACH_REPLY.to_string(), cities.chain(places).collect()))
}

fn best_restaurants(catalog: &Catalog, _: &str) -> Option<(String, Vec<Recommendation>)> {
    let mut restaurants: Vec<&Place> = catalog
        .places_in_category(PlaceCategory::Restaurant)
        .collect();
    restaurants.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    let recommendations = restaurants
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(Recommendation::from)
        .collect();
    Some((FOOD_REPLY.to_string(), recommendations))
}

fn city_highlights(catalog: &Catalog, text: &str) -> Option<(String, Vec<Recommendation>)> {
    let city = mentioned_city(catalog, text)?;

    let mut places: Vec<&Place> = catalog.places_in_city(&city.id).collect();
    places.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    let recommendations = std::iter::once(Recommendation::from(city))
        .chain(
            places
                .into_iter()
                .take(CITY_PLACE_LIMIT)
                .map(Recommendation::from),
        )
        .collect();

    Some((
        format!("Here are the top-rated places to visit in {}:", city.name),
        recommendations,
    ))
}

fn top_rated_cities(catalog: &Catalog) -> (String, Vec<Recommendation>) {
    // Sort a view, never the catalog itself
    let mut cities: Vec<&City> = catalog.cities().iter().collect();
    cities.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    let recommendations = cities
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(Recommendation::from)
        .collect();
    (DEFAULT_REPLY.to_string(), recommendations)
}
