// Persistence collaborators for concession applications
//
// The workflow only talks to these traits, so the local JSON file store can
// be swapped for a database or a remote backend without touching it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::workflows::state::{ApplicationPatch, ConcessionApplication};
use crate::workflows::types::{
    ApplicationId, ApplicationStatus, Itinerary, PassDuration, TravelClass, UserId,
};
use crate::workflows::error::ValidationError;

pub mod file;
pub mod memory;
#[cfg(feature = "database")]
pub mod sqlite;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;
#[cfg(feature = "database")]
pub use sqlite::SqliteStore;

/// Errors raised by a persistence backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Application {0} already exists")]
    Duplicate(ApplicationId),

    #[error("Lock acquisition failed: {reason}")]
    Lock { reason: String },

    #[error("Background task failed: {0}")]
    Task(String),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Record storage keyed by application id
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Persist a new record. Fails if the id is already taken.
    async fn create(&self, application: &ConcessionApplication) -> Result<(), StoreError>;

    async fn get_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ConcessionApplication>, StoreError>;

    /// Records owned by `user_id`, most recent first
    async fn list_by_owner(&self, user_id: &UserId)
        -> Result<Vec<ConcessionApplication>, StoreError>;

    /// Records currently in `status`, most recent first
    async fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ConcessionApplication>, StoreError>;

    async fn list_all(&self) -> Result<Vec<ConcessionApplication>, StoreError>;

    /// Apply `patch` as a single all-or-nothing write. `None` if the id is unknown.
    async fn update(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Option<ConcessionApplication>, StoreError>;
}

/// A partially filled application form kept between sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_station: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_station: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_class: Option<TravelClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<PassDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college_id_uri: Option<String>,
}

impl ApplicationDraft {
    /// Overlay the fields set in `other` onto this draft
    pub fn merge(&mut self, other: ApplicationDraft) {
        if other.source_station.is_some() {
            self.source_station = other.source_station;
        }
        if other.destination_station.is_some() {
            self.destination_station = other.destination_station;
        }
        if other.travel_class.is_some() {
            self.travel_class = other.travel_class;
        }
        if other.duration.is_some() {
            self.duration = other.duration;
        }
        if other.reason.is_some() {
            self.reason = other.reason;
        }
        if other.college_id_uri.is_some() {
            self.college_id_uri = other.college_id_uri;
        }
    }

    /// Stations are required; class and duration fall back to second / monthly
    pub fn to_itinerary(&self) -> Result<Itinerary, ValidationError> {
        let source = self
            .source_station
            .clone()
            .ok_or(ValidationError::MissingField {
                field: "source station",
            })?;
        let destination = self
            .destination_station
            .clone()
            .ok_or(ValidationError::MissingField {
                field: "destination station",
            })?;
        Ok(Itinerary::new(
            source,
            destination,
            self.travel_class.unwrap_or_default(),
            self.duration.unwrap_or_default(),
        ))
    }
}

/// Draft storage keyed by the owning user
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save_draft(&self, user_id: &UserId, draft: &ApplicationDraft)
        -> Result<(), StoreError>;

    async fn get_draft(&self, user_id: &UserId) -> Result<Option<ApplicationDraft>, StoreError>;

    async fn clear_draft(&self, user_id: &UserId) -> Result<(), StoreError>;
}

/// Everything a full backend provides
pub trait Store: ApplicationStore + DraftStore {}

impl<T: ApplicationStore + DraftStore> Store for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_merge_overlays_only_set_fields() {
        let mut draft = ApplicationDraft {
            source_station: Some("CSMT".to_string()),
            duration: Some(PassDuration::Quarterly),
            ..Default::default()
        };
        draft.merge(ApplicationDraft {
            destination_station: Some("TNA".to_string()),
            ..Default::default()
        });

        assert_eq!(draft.source_station.as_deref(), Some("CSMT"));
        assert_eq!(draft.destination_station.as_deref(), Some("TNA"));
        assert_eq!(draft.duration, Some(PassDuration::Quarterly));
    }

    #[test]
    fn test_draft_itinerary_requires_both_stations() {
        let draft = ApplicationDraft {
            source_station: Some("CSMT".to_string()),
            ..Default::default()
        };
        assert_eq!(
            draft.to_itinerary().unwrap_err(),
            ValidationError::MissingField {
                field: "destination station"
            }
        );

        let complete = ApplicationDraft {
            destination_station: Some("BCT".to_string()),
            ..draft
        };
        let itinerary = complete.to_itinerary().unwrap();
        assert_eq!(itinerary.travel_class, TravelClass::Second);
        assert_eq!(itinerary.duration, PassDuration::Monthly);
    }
}
