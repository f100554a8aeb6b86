//! `WerTigo` - Philippine travel discovery
//!
//! This library provides the travel catalog, search and filtering, map state,
//! the scripted recommendation assistant and the HTTP surface serving them.

pub mod api;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod map;
pub mod models;
pub mod pages;
pub mod recommend;
pub mod search;
pub mod views;
pub mod web;

// Re-export core types for public API
pub use catalog::Catalog;
pub use chat::{ChatService, ChatSession, ReplyDelay, Transcript};
pub use config::WertigoConfig;
pub use error::WertigoError;
pub use map::{EntityRef, Focus, MapController, MapFilter, MapSettings, MapState};
pub use models::{ChatMessage, City, Place, PlaceCategory, PriceLevel, Recommendation};
pub use recommend::{Reply, Responder};
pub use search::{CategoryFilter, SearchQuery, SearchResults};
pub use web::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WertigoError>;
