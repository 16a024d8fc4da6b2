//! Frontend Models
//!
//! Rows of the hosted `user_comments` and `comment_reactions` tables and the
//! payloads written back to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification written when the form supplies none
pub const DEFAULT_COUNTRY_CODE: &str = "XX";

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A pinned note (row of `user_comments`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(rename = "twitter_username")]
    pub handle: String,
    #[serde(rename = "twitter_display_name", default)]
    pub display_name: Option<String>,
    #[serde(rename = "twitter_profile_pic", default)]
    pub profile_pic: Option<String>,
    #[serde(rename = "comment")]
    pub body: String,
    /// Optional place label
    #[serde(rename = "country_name", default)]
    pub label: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Position when both coordinates are present
    pub fn position(&self) -> Option<LatLng> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(LatLng { lat, lng }),
            _ => None,
        }
    }
}

/// An emoji reaction (row of `comment_reactions`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: String,
    #[serde(rename = "comment_id")]
    pub note_id: String,
    pub emoji: String,
    pub user_identifier: String,
    pub created_at: DateTime<Utc>,
}

/// A note with the reactions that reference it
#[derive(Debug, Clone, PartialEq)]
pub struct NoteWithReactions {
    pub note: Note,
    pub reactions: Vec<Reaction>,
}

impl NoteWithReactions {
    pub fn id(&self) -> &str {
        &self.note.id
    }
}

/// Fields collected by the entry form
#[derive(Debug, Clone, PartialEq)]
pub struct NoteFields {
    pub handle: String,
    pub body: String,
    pub label: Option<String>,
    pub position: LatLng,
}

/// Insert payload for `user_comments`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNote {
    #[serde(rename = "twitter_username")]
    pub handle: String,
    #[serde(rename = "comment")]
    pub body: String,
    #[serde(rename = "country_name", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewNote {
    pub fn from_fields(fields: NoteFields, country_code: Option<String>) -> Self {
        Self {
            handle: fields.handle,
            body: fields.body,
            label: fields.label,
            country_code: country_code.unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()),
            latitude: fields.position.lat,
            longitude: fields.position.lng,
        }
    }
}

/// Insert payload for `comment_reactions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReaction {
    #[serde(rename = "comment_id")]
    pub note_id: String,
    pub emoji: String,
    pub user_identifier: String,
}
