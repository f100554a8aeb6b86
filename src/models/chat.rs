//! Chat transcript entries and the recommendations attached to them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{City, Place};

/// Which catalog collection a record comes from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    City,
    Place,
}

impl RecordKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::City => "city",
            RecordKind::Place => "place",
        }
    }

    /// Page path of a record of this kind
    #[must_use]
    pub fn detail_path(&self, id: &str) -> String {
        format!("/{}/{id}", self.as_str())
    }
}

/// A catalog record suggested by the assistant
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recommendation {
    pub kind: RecordKind,
    pub id: String,
    pub name: String,
    pub rating: f64,
    pub image: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Detail page for the record
    pub link: String,
}

impl From<&City> for Recommendation {
    fn from(city: &City) -> Self {
        Self {
            kind: RecordKind::City,
            id: city.id.clone(),
            name: city.name.clone(),
            rating: city.rating,
            image: city.image.clone(),
            description: city.description.clone(),
            tags: city.tags.clone(),
            link: RecordKind::City.detail_path(&city.id),
        }
    }
}

impl From<&Place> for Recommendation {
    fn from(place: &Place) -> Self {
        Self {
            kind: RecordKind::Place,
            id: place.id.clone(),
            name: place.name.clone(),
            rating: place.rating,
            image: place.image.clone(),
            description: place.description.clone(),
            tags: place.tags.clone(),
            link: RecordKind::Place.detail_path(&place.id),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One entry of a chat transcript
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<Recommendation>,
}

impl ChatMessage {
    /// A message typed by the visitor
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            recommendations: Vec::new(),
        }
    }

    /// An assistant message, optionally carrying recommendations
    #[must_use]
    pub fn assistant(text: impl Into<String>, recommendations: Vec<Recommendation>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender: Sender::Assistant,
            timestamp: Utc::now(),
            recommendations,
        }
    }

    /// Replace the generated id, used for the fixed welcome messages
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_paths() {
        assert_eq!(RecordKind::City.detail_path("cebu"), "/city/cebu");
        assert_eq!(RecordKind::Place.detail_path("magellans-cross"), "/place/magellans-cross");
    }

    #[test]
    fn test_message_constructors() {
        let user = ChatMessage::user("Where should I go?");
        assert_eq!(user.sender, Sender::User);
        assert!(user.recommendations.is_empty());

        let assistant = ChatMessage::assistant("Hello", Vec::new()).with_id("welcome-1");
        assert_eq!(assistant.sender, Sender::Assistant);
        assert_eq!(assistant.id, "welcome-1");
        assert_ne!(user.id, ChatMessage::user("again").id);
    }

    #[test]
    fn test_empty_recommendations_are_omitted() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert!(json.get("recommendations").is_none());
        assert_eq!(json["sender"], "user");
    }
}
