use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::chat::Transcript;
use crate::map::{EntityRef, MapController, MapFilter, MapSettings, MapState};
use crate::models::{ChatMessage, City, Place};
use crate::recommend::Reply;
use crate::search::{self, SearchQuery, SearchResults};
use crate::web::AppState;
use crate::{Result, WertigoError};

/// `?q=&city=&category=`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub city: Option<String>,
    pub category: Option<String>,
}

impl SearchParams {
    #[must_use]
    pub fn to_query(&self) -> SearchQuery {
        SearchQuery::from_params(
            self.q.as_deref(),
            self.city.as_deref(),
            self.category.as_deref(),
        )
    }
}

/// `?city=&category=&q=&focus=city:<id>|place:<id>`
#[derive(Debug, Default, Deserialize)]
pub struct MapParams {
    pub city: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub focus: Option<String>,
}

impl MapParams {
    /// Same normalization as the search parameters
    #[must_use]
    pub fn filter(&self) -> MapFilter {
        SearchQuery::from_params(
            self.q.as_deref(),
            self.city.as_deref(),
            self.category.as_deref(),
        )
        .into()
    }

    /// Map controller for these parameters, with the requested focus applied
    pub fn controller<'a>(
        &self,
        catalog: &'a Catalog,
        settings: MapSettings,
    ) -> Result<MapController<'a>> {
        let mut controller = MapController::new(catalog, settings).with_filter(self.filter());
        self.apply_focus(&mut controller)?;
        Ok(controller)
    }

    /// Select the `focus` entity, if any; the controller is untouched on error
    pub fn apply_focus(&self, controller: &mut MapController<'_>) -> Result<()> {
        if let Some(focus) = self.focus.as_deref().filter(|f| !f.trim().is_empty()) {
            controller.select(focus.parse::<EntityRef>()?)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cities", get(list_cities))
        .route("/cities/{id}", get(get_city))
        .route("/places", get(list_places))
        .route("/places/{id}", get(get_place))
        .route("/search", get(search_catalog))
        .route("/recommendations", post(recommend))
        .route("/map", get(map_state))
        .route("/chat/sessions", post(create_session))
        .route("/chat/sessions/{id}", get(get_session))
        .route("/chat/sessions/{id}/messages", post(send_message))
}

async fn list_cities(State(state): State<AppState>) -> Json<Vec<City>> {
    Json(state.catalog.cities().to_vec())
}

async fn get_city(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<City>> {
    let city = state.catalog.require_city(&id)?;
    Ok(Json(city.clone()))
}

async fn list_places(State(state): State<AppState>) -> Json<Vec<Place>> {
    Json(state.catalog.places().to_vec())
}

async fn get_place(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Place>> {
    let place = state.catalog.require_place(&id)?;
    Ok(Json(place.clone()))
}

async fn search_catalog(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResults> {
    Json(search::search(&state.catalog, &params.to_query()))
}

#[instrument(skip(state, request))]
async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> Json<Reply> {
    let reply = state.chat.respond(&request.message);
    debug!(
        "Rule '{}' answered with {} recommendations",
        reply.rule,
        reply.recommendations.len()
    );
    Json(reply)
}

async fn map_state(
    State(state): State<AppState>,
    Query(params): Query<MapParams>,
) -> Result<Json<MapState>> {
    let controller = params.controller(&state.catalog, state.map)?;
    Ok(Json(controller.state()))
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<Transcript>) {
    (StatusCode::CREATED, Json(state.chat.create_session().await))
}

fn session_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| WertigoError::session_not_found(raw))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Transcript>> {
    let transcript = state.chat.transcript(session_id(&id)?).await?;
    Ok(Json(transcript))
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    let message = state.chat.send(session_id(&id)?, &request.text).await?;
    Ok((StatusCode::ACCEPTED, Json(message)))
}
