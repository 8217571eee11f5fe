//! Companion (practitioner) applications.
//!
//! One record, two read projections: the administrative view exposes the
//! raw submission with its list fields split out, the public view exposes
//! a curated subset for the companion directory - approved records only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use halcyon_core::{ApplicationId, ApplicationStatus, Email};

use crate::store::StoreError;
use crate::store::collection::Entity;

/// Placeholder rating until real reviews exist.
const PLACEHOLDER_RATING: f64 = 5.0;

/// A companion application as submitted.
///
/// `specialties` and `certifications` are stored raw, comma-separated,
/// exactly as practitioners type them into the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionApplication {
    pub id: ApplicationId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub specialties: Option<String>,
    #[serde(default)]
    pub certifications: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    pub hourly_rate: f64,
    pub call_rate: f64,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for submitting an application.
#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
    #[serde(default)]
    pub id: Option<ApplicationId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub specialties: Option<String>,
    #[serde(default)]
    pub certifications: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    pub hourly_rate: f64,
    pub call_rate: f64,
}

impl CompanionApplication {
    /// Build an application from submission parameters. New applications
    /// always start pending.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when the email does not parse or
    /// a required field is empty/malformed.
    pub fn from_new(new: NewApplication) -> Result<Self, StoreError> {
        let email =
            Email::parse(&new.email).map_err(|e| StoreError::Validation(e.to_string()))?;
        let now = Utc::now();

        let application = Self {
            id: new.id.unwrap_or_else(ApplicationId::generate),
            name: new.name,
            email,
            mobile: new.mobile,
            specialties: new.specialties,
            certifications: new.certifications,
            bio: new.bio,
            experience_years: new.experience_years,
            hourly_rate: new.hourly_rate,
            call_rate: new.call_rate,
            status: ApplicationStatus::Pending,
            submitted_at: now,
            created_at: now,
            updated_at: now,
        };
        application.validate()?;
        Ok(application)
    }

    /// Administrative projection: raw fields with list fields split.
    #[must_use]
    pub fn admin_view(&self) -> AdminApplicationView {
        AdminApplicationView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            mobile: self.mobile.clone(),
            specialties: split_list(self.specialties.as_deref()),
            certifications: split_list(self.certifications.as_deref()),
            bio: self.bio.clone(),
            experience_years: self.experience_years,
            hourly_rate: self.hourly_rate,
            call_rate: self.call_rate,
            status: self.status,
            submitted_at: self.submitted_at,
        }
    }

    /// Public directory projection. Only meaningful for approved records;
    /// callers filter on status first.
    #[must_use]
    pub fn public_view(&self) -> PublicCompanion {
        PublicCompanion {
            id: self.id,
            name: self.name.clone(),
            specialties: split_list(self.specialties.as_deref()),
            bio: self.bio.clone(),
            experience_years: self.experience_years,
            hourly_rate: self.hourly_rate,
            call_rate: self.call_rate,
            rating: PLACEHOLDER_RATING,
            review_count: 0,
        }
    }
}

impl Entity for CompanionApplication {
    const COLLECTION: &'static str = "companion_applications";

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }

    fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("name is required".to_string()));
        }
        for (field, rate) in [("hourly_rate", self.hourly_rate), ("call_rate", self.call_rate)] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(StoreError::Validation(format!(
                    "{field} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

/// Administrative read projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminApplicationView {
    pub id: ApplicationId,
    pub name: String,
    pub email: Email,
    pub mobile: Option<String>,
    pub specialties: Vec<String>,
    pub certifications: Vec<String>,
    pub bio: Option<String>,
    pub experience_years: Option<u32>,
    pub hourly_rate: f64,
    pub call_rate: f64,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Public companion directory entry. Rating and review count are
/// synthesized placeholders until the review system lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicCompanion {
    pub id: ApplicationId,
    pub name: String,
    pub specialties: Vec<String>,
    pub bio: Option<String>,
    pub experience_years: Option<u32>,
    pub hourly_rate: f64,
    pub call_rate: f64,
    pub rating: f64,
    pub review_count: u32,
}

/// Split a raw comma-separated field into trimmed, non-empty entries.
fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_application() -> NewApplication {
        NewApplication {
            id: None,
            name: "Ana Torres".to_string(),
            email: "ana@wellness.example".to_string(),
            mobile: None,
            specialties: Some("breathwork, yoga nidra,  grief support".to_string()),
            certifications: None,
            bio: Some("Somatic practitioner.".to_string()),
            experience_years: Some(7),
            hourly_rate: 80.0,
            call_rate: 25.0,
        }
    }

    #[test]
    fn test_new_applications_start_pending() {
        let application = CompanionApplication::from_new(new_application()).unwrap();
        assert_eq!(application.status, ApplicationStatus::Pending);
        assert_eq!(application.submitted_at, application.created_at);
    }

    #[test]
    fn test_admin_view_splits_list_fields() {
        let application = CompanionApplication::from_new(new_application()).unwrap();
        let view = application.admin_view();
        assert_eq!(
            view.specialties,
            vec!["breathwork", "yoga nidra", "grief support"]
        );
        assert!(view.certifications.is_empty());
    }

    #[test]
    fn test_public_view_synthesizes_placeholders() {
        let application = CompanionApplication::from_new(new_application()).unwrap();
        let view = application.public_view();
        assert!((view.rating - 5.0).abs() < f64::EPSILON);
        assert_eq!(view.review_count, 0);
    }

    #[test]
    fn test_public_view_omits_contact_details() {
        let application = CompanionApplication::from_new(new_application()).unwrap();
        let json = serde_json::to_value(application.public_view()).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("mobile").is_none());
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let mut new = new_application();
        new.hourly_rate = -1.0;
        assert!(matches!(
            CompanionApplication::from_new(new),
            Err(StoreError::Validation(_))
        ));
    }
}
