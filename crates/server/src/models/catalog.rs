//! Content catalog: guided meditations and ambient sounds.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use halcyon_core::{MeditationId, SoundId};

use crate::store::StoreError;
use crate::store::collection::Entity;

/// Default publication status for new catalog entries.
///
/// The status is a free-form string owned by the content editors,
/// conventionally "Draft" or "Active".
fn default_status() -> String {
    "Draft".to_string()
}

/// A guided meditation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meditation {
    pub id: MeditationId,
    pub title: String,
    /// Session length in minutes.
    pub duration_minutes: f64,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a meditation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMeditation {
    #[serde(default)]
    pub id: Option<MeditationId>,
    pub title: String,
    pub duration_minutes: f64,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl Meditation {
    /// Build a meditation from create parameters, assigning a fresh id
    /// when the caller did not supply one.
    #[must_use]
    pub fn from_new(new: NewMeditation) -> Self {
        let now = Utc::now();
        Self {
            id: new.id.unwrap_or_else(MeditationId::generate),
            title: new.title,
            duration_minutes: new.duration_minutes,
            level: new.level,
            category: new.category,
            description: new.description,
            status: new.status.unwrap_or_else(default_status),
            thumbnail_url: new.thumbnail_url,
            banner_url: new.banner_url,
            audio_url: new.audio_url,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Meditation {
    const COLLECTION: &'static str = "meditations";

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }

    fn validate(&self) -> Result<(), StoreError> {
        validate_catalog_fields(&self.title, self.duration_minutes)
    }
}

/// An ambient sound track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sound {
    pub id: SoundId,
    pub title: String,
    /// Track length in minutes.
    pub duration_minutes: f64,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    /// Unordered mood tags ("sleep", "focus", ...).
    #[serde(default)]
    pub moods: BTreeSet<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a sound.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSound {
    #[serde(default)]
    pub id: Option<SoundId>,
    pub title: String,
    pub duration_minutes: f64,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub moods: BTreeSet<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl Sound {
    /// Build a sound from create parameters, assigning a fresh id when
    /// the caller did not supply one.
    #[must_use]
    pub fn from_new(new: NewSound) -> Self {
        let now = Utc::now();
        Self {
            id: new.id.unwrap_or_else(SoundId::generate),
            title: new.title,
            duration_minutes: new.duration_minutes,
            frequency: new.frequency,
            artist: new.artist,
            description: new.description,
            status: new.status.unwrap_or_else(default_status),
            moods: new.moods,
            thumbnail_url: new.thumbnail_url,
            banner_url: new.banner_url,
            audio_url: new.audio_url,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Sound {
    const COLLECTION: &'static str = "sounds";

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }

    fn validate(&self) -> Result<(), StoreError> {
        validate_catalog_fields(&self.title, self.duration_minutes)
    }
}

fn validate_catalog_fields(title: &str, duration_minutes: f64) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation("title is required".to_string()));
    }
    if !duration_minutes.is_finite() || duration_minutes <= 0.0 {
        return Err(StoreError::Validation(
            "duration_minutes must be a positive number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_meditation() -> NewMeditation {
        NewMeditation {
            id: None,
            title: "Morning Calm".to_string(),
            duration_minutes: 12.0,
            level: Some("beginner".to_string()),
            category: None,
            description: None,
            status: None,
            thumbnail_url: None,
            banner_url: None,
            audio_url: None,
        }
    }

    #[test]
    fn test_meditation_defaults_to_draft() {
        let meditation = Meditation::from_new(new_meditation());
        assert_eq!(meditation.status, "Draft");
    }

    #[test]
    fn test_meditation_rejects_empty_title() {
        let mut new = new_meditation();
        new.title = String::new();
        let meditation = Meditation::from_new(new);
        assert!(matches!(
            meditation.validate(),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_meditation_rejects_non_positive_duration() {
        let mut new = new_meditation();
        new.duration_minutes = 0.0;
        assert!(Meditation::from_new(new).validate().is_err());

        let mut new = new_meditation();
        new.duration_minutes = f64::NAN;
        assert!(Meditation::from_new(new).validate().is_err());
    }

    #[test]
    fn test_sound_moods_are_a_set() {
        let sound = Sound::from_new(NewSound {
            id: None,
            title: "Ocean Waves".to_string(),
            duration_minutes: 45.0,
            frequency: Some("432hz".to_string()),
            artist: None,
            description: None,
            status: Some("Active".to_string()),
            moods: ["sleep", "calm", "sleep"].iter().map(ToString::to_string).collect(),
            thumbnail_url: None,
            banner_url: None,
            audio_url: None,
        });

        assert_eq!(sound.moods.len(), 2);
        assert!(sound.moods.contains("sleep"));
        assert_eq!(sound.status, "Active");
    }

    #[test]
    fn test_missing_duration_fails_deserialization() {
        let result: Result<NewMeditation, _> =
            serde_json::from_value(serde_json::json!({"title": "No duration"}));
        assert!(result.is_err());
    }
}
