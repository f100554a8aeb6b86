//! Data models for the WerTigo catalog
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic positions
//! - City / Place: Read-only catalog records
//! - Chat: Transcript messages and attached recommendations

pub mod chat;
pub mod city;
pub mod location;
pub mod place;

// Re-export all public types for convenient access
pub use chat::{ChatMessage, Recommendation, RecordKind, Sender};
pub use city::City;
pub use location::Position;
pub use place::{Place, PlaceCategory, PriceLevel};
