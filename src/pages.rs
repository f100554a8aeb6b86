//! Page routes
//!
//! Serves the view models of the navigable pages. Unknown city or place ids
//! redirect to the not-found page.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
};
use tracing::warn;

use crate::api::{MapParams, SearchParams};
use crate::map::MapController;
use crate::views::{self, ChatView, HomeView, MapView, SearchView};
use crate::web::AppState;
use crate::WertigoError;

pub const NOT_FOUND_PATH: &str = "/not-found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/map", get(map))
        .route("/chat", get(chat))
        .route("/search", get(search))
        .route("/city/{id}", get(city))
        .route("/place/{id}", get(place))
}

async fn home(State(state): State<AppState>) -> Json<HomeView> {
    Json(views::home(&state.catalog))
}

async fn map(State(state): State<AppState>, Query(params): Query<MapParams>) -> Json<MapView> {
    let mut controller = MapController::new(&state.catalog, state.map).with_filter(params.filter());
    if let Err(e) = params.apply_focus(&mut controller) {
        warn!("Ignoring map focus: {}", e);
    }
    Json(views::map_page(&state.catalog, &controller))
}

async fn chat() -> Json<ChatView> {
    Json(views::chat())
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchView> {
    Json(views::search_page(&state.catalog, &params.to_query()))
}

async fn city(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    detail_or_redirect(views::city_detail(&state.catalog, state.map, &id))
}

async fn place(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    detail_or_redirect(views::place_detail(&state.catalog, state.map, &id))
}

fn detail_or_redirect<T: serde::Serialize>(view: crate::Result<T>) -> Response {
    match view {
        Ok(view) => Json(view).into_response(),
        Err(WertigoError::NotFound { kind, id }) => {
            warn!("Unknown {} '{}', redirecting", kind.as_str(), id);
            Redirect::to(NOT_FOUND_PATH).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Fallback for every path without a page
pub async fn not_found() -> (StatusCode, Json<views::NotFoundView>) {
    (StatusCode::NOT_FOUND, Json(views::not_found()))
}
