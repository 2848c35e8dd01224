// Application lifecycle state and the persisted application record
//
// The in-memory state is a tagged variant that carries only the fields valid
// for each status. The persisted form is the flat camelCase object the
// storage layer has always used; converting back from it checks that the
// optional fields agree with the status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::types::{
    ApplicationId, ApplicationStatus, Itinerary, StudentProfile, UserId, ValidityWindow,
};

pub const DEFAULT_TRAVEL_REASON: &str = "Academic Travel";

/// Opaque pass credential issued on railway approval. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PassToken(String);

impl PassToken {
    /// Panics on an empty token; issuers must always produce something.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        assert!(!token.is_empty(), "pass token must not be empty");
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PassToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review stage at which an application was turned down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewStage {
    College,
    Railway { college_approved_at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: String,
    pub rejected_at: DateTime<Utc>,
    pub stage: ReviewStage,
}

/// Lifecycle state of a concession application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationState {
    Submitted,
    CollegeApproved {
        college_approved_at: DateTime<Utc>,
    },
    RailwayApproved {
        college_approved_at: DateTime<Utc>,
        railway_approved_at: DateTime<Utc>,
        pass_token: PassToken,
    },
    Rejected(Rejection),
}

impl ApplicationState {
    pub fn status(&self) -> ApplicationStatus {
        match self {
            ApplicationState::Submitted => ApplicationStatus::Submitted,
            ApplicationState::CollegeApproved { .. } => ApplicationStatus::CollegeApproved,
            ApplicationState::RailwayApproved { .. } => ApplicationStatus::RailwayApproved,
            ApplicationState::Rejected(_) => ApplicationStatus::Rejected,
        }
    }

    pub fn college_approved_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ApplicationState::Submitted => None,
            ApplicationState::CollegeApproved {
                college_approved_at,
            }
            | ApplicationState::RailwayApproved {
                college_approved_at,
                ..
            } => Some(*college_approved_at),
            ApplicationState::Rejected(rejection) => match rejection.stage {
                ReviewStage::College => None,
                ReviewStage::Railway {
                    college_approved_at,
                } => Some(college_approved_at),
            },
        }
    }

    pub fn railway_approved_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ApplicationState::RailwayApproved {
                railway_approved_at,
                ..
            } => Some(*railway_approved_at),
            _ => None,
        }
    }

    pub fn pass_token(&self) -> Option<&PassToken> {
        match self {
            ApplicationState::RailwayApproved { pass_token, .. } => Some(pass_token),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ApplicationState::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection().map(|r| r.reason.as_str())
    }
}

/// Fields supplied by the student when creating an application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub itinerary: Itinerary,
    pub profile: StudentProfile,
    pub reason: String,
    pub college_id_uri: Option<String>,
}

impl NewApplication {
    pub fn new(itinerary: Itinerary) -> Self {
        Self {
            itinerary,
            profile: StudentProfile::default(),
            reason: DEFAULT_TRAVEL_REASON.to_string(),
            college_id_uri: None,
        }
    }

    pub fn with_profile(mut self, profile: StudentProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_college_id_uri(mut self, uri: impl Into<String>) -> Self {
        self.college_id_uri = Some(uri.into());
        self
    }
}

impl From<Itinerary> for NewApplication {
    fn from(itinerary: Itinerary) -> Self {
        Self::new(itinerary)
    }
}

/// A student's concession application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FlatApplication", into = "FlatApplication")]
pub struct ConcessionApplication {
    id: ApplicationId,
    user_id: UserId,
    applicant: StudentProfile,
    itinerary: Itinerary,
    reason: String,
    college_id_uri: Option<String>,
    state: ApplicationState,
    validity: ValidityWindow,
    college_remarks: Option<String>,
    railway_remarks: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConcessionApplication {
    /// Builds a freshly submitted record. Input is assumed already validated.
    pub(crate) fn submitted(
        id: ApplicationId,
        user_id: UserId,
        request: NewApplication,
        now: DateTime<Utc>,
    ) -> Self {
        let validity = ValidityWindow::starting_at(now, request.itinerary.duration);
        Self {
            id,
            user_id,
            applicant: request.profile,
            itinerary: request.itinerary,
            reason: request.reason,
            college_id_uri: request.college_id_uri,
            state: ApplicationState::Submitted,
            validity,
            college_remarks: None,
            railway_remarks: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &ApplicationId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn applicant(&self) -> &StudentProfile {
        &self.applicant
    }

    pub fn itinerary(&self) -> &Itinerary {
        &self.itinerary
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn college_id_uri(&self) -> Option<&str> {
        self.college_id_uri.as_deref()
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    pub fn status(&self) -> ApplicationStatus {
        self.state.status()
    }

    pub fn validity(&self) -> &ValidityWindow {
        &self.validity
    }

    pub fn college_remarks(&self) -> Option<&str> {
        self.college_remarks.as_deref()
    }

    pub fn railway_remarks(&self) -> Option<&str> {
        self.railway_remarks.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Railway approved and inside its validity window
    pub fn is_active_pass(&self, now: DateTime<Utc>) -> bool {
        self.status() == ApplicationStatus::RailwayApproved && self.validity.contains(now)
    }

    /// Applies a partial update. Identity, ownership and itinerary are never touched.
    pub fn apply_patch(&mut self, patch: ApplicationPatch) {
        if let Some(state) = patch.state {
            self.state = state;
        }
        if let Some(remarks) = patch.college_remarks {
            self.college_remarks = Some(remarks);
        }
        if let Some(remarks) = patch.railway_remarks {
            self.railway_remarks = Some(remarks);
        }
        self.updated_at = patch.updated_at;
    }
}

/// Partial update handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationPatch {
    pub state: Option<ApplicationState>,
    pub college_remarks: Option<String>,
    pub railway_remarks: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationPatch {
    pub fn touch(updated_at: DateTime<Utc>) -> Self {
        Self {
            state: None,
            college_remarks: None,
            railway_remarks: None,
            updated_at,
        }
    }

    pub fn with_state(mut self, state: ApplicationState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_college_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.college_remarks = Some(remarks.into());
        self
    }

    pub fn with_railway_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.railway_remarks = Some(remarks.into());
        self
    }
}

/// A persisted record whose fields contradict its status
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("inconsistent {status} record {id}: {problem}")]
pub struct RecordError {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub problem: String,
}

fn default_reason() -> String {
    DEFAULT_TRAVEL_REASON.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatApplication {
    id: ApplicationId,
    user_id: UserId,
    #[serde(flatten)]
    applicant: StudentProfile,
    #[serde(flatten)]
    itinerary: Itinerary,
    #[serde(default = "default_reason")]
    reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    college_id_uri: Option<String>,
    status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    college_remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    railway_remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    college_approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    railway_approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qr_code: Option<String>,
    #[serde(flatten)]
    validity: ValidityWindow,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConcessionApplication> for FlatApplication {
    fn from(app: ConcessionApplication) -> Self {
        let college_approved_at = app.state.college_approved_at();
        let railway_approved_at = app.state.railway_approved_at();
        let qr_code = app.state.pass_token().map(|t| t.as_str().to_string());
        let (rejection_reason, rejected_at) = match &app.state {
            ApplicationState::Rejected(rejection) => {
                (Some(rejection.reason.clone()), Some(rejection.rejected_at))
            }
            _ => (None, None),
        };
        let status = app.state.status();

        Self {
            id: app.id,
            user_id: app.user_id,
            applicant: app.applicant,
            itinerary: app.itinerary,
            reason: app.reason,
            college_id_uri: app.college_id_uri,
            status,
            rejection_reason,
            rejected_at,
            college_remarks: app.college_remarks,
            railway_remarks: app.railway_remarks,
            college_approved_at,
            railway_approved_at,
            qr_code,
            validity: app.validity,
            created_at: app.created_at,
            updated_at: app.updated_at,
        }
    }
}

impl TryFrom<FlatApplication> for ConcessionApplication {
    type Error = RecordError;

    fn try_from(flat: FlatApplication) -> Result<Self, Self::Error> {
        let fail = |problem: &str| RecordError {
            id: flat.id.clone(),
            status: flat.status,
            problem: problem.to_string(),
        };

        if flat.rejection_reason.is_some() && flat.status != ApplicationStatus::Rejected {
            return Err(fail("rejectionReason set on a record that was not rejected"));
        }
        if flat.railway_approved_at.is_some() && flat.college_approved_at.is_none() {
            return Err(fail("railwayApprovedAt set without collegeApprovedAt"));
        }

        let state = match flat.status {
            ApplicationStatus::Submitted => {
                if flat.college_approved_at.is_some()
                    || flat.railway_approved_at.is_some()
                    || flat.qr_code.is_some()
                {
                    return Err(fail("approval fields set on a submitted record"));
                }
                ApplicationState::Submitted
            }
            ApplicationStatus::CollegeApproved => {
                if flat.railway_approved_at.is_some() || flat.qr_code.is_some() {
                    return Err(fail("railway approval fields set before railway approval"));
                }
                let college_approved_at = flat
                    .college_approved_at
                    .ok_or_else(|| fail("collegeApprovedAt missing"))?;
                ApplicationState::CollegeApproved {
                    college_approved_at,
                }
            }
            ApplicationStatus::RailwayApproved => {
                let college_approved_at = flat
                    .college_approved_at
                    .ok_or_else(|| fail("collegeApprovedAt missing"))?;
                let railway_approved_at = flat
                    .railway_approved_at
                    .ok_or_else(|| fail("railwayApprovedAt missing"))?;
                if railway_approved_at < college_approved_at {
                    return Err(fail("railway approval predates college approval"));
                }
                let token = flat
                    .qr_code
                    .clone()
                    .filter(|token| !token.is_empty())
                    .ok_or_else(|| fail("pass credential missing"))?;
                ApplicationState::RailwayApproved {
                    college_approved_at,
                    railway_approved_at,
                    pass_token: PassToken(token),
                }
            }
            ApplicationStatus::Rejected => {
                if flat.railway_approved_at.is_some() || flat.qr_code.is_some() {
                    return Err(fail("rejected record carries a railway approval"));
                }
                let reason = flat
                    .rejection_reason
                    .clone()
                    .filter(|reason| !reason.trim().is_empty())
                    .ok_or_else(|| fail("rejectionReason missing"))?;
                let stage = match flat.college_approved_at {
                    Some(college_approved_at) => ReviewStage::Railway {
                        college_approved_at,
                    },
                    None => ReviewStage::College,
                };
                ApplicationState::Rejected(Rejection {
                    reason,
                    rejected_at: flat.rejected_at.unwrap_or(flat.updated_at),
                    stage,
                })
            }
        };

        Ok(Self {
            id: flat.id,
            user_id: flat.user_id,
            applicant: flat.applicant,
            itinerary: flat.itinerary,
            reason: flat.reason,
            college_id_uri: flat.college_id_uri,
            state,
            validity: flat.validity,
            college_remarks: flat.college_remarks,
            railway_remarks: flat.railway_remarks,
            created_at: flat.created_at,
            updated_at: flat.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::types::{PassDuration, TravelClass};
    use chrono::{Duration, TimeZone};
    use serde_json::{json, Value};

    fn submitted_record() -> ConcessionApplication {
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap();
        let itinerary = Itinerary::new("CSMT", "BCT", TravelClass::Second, PassDuration::Monthly);
        ConcessionApplication::submitted(
            ApplicationId::from("app-1"),
            UserId::from("student-1"),
            NewApplication::new(itinerary),
            now,
        )
    }

    #[test]
    fn test_flat_json_uses_storage_field_names() {
        let value = serde_json::to_value(submitted_record()).unwrap();

        assert_eq!(value["id"], "app-1");
        assert_eq!(value["userId"], "student-1");
        assert_eq!(value["sourceStation"], "CSMT");
        assert_eq!(value["destinationStation"], "BCT");
        assert_eq!(value["travelClass"], "second");
        assert_eq!(value["status"], "submitted");
        assert_eq!(value["reason"], DEFAULT_TRAVEL_REASON);
        assert!(value.get("validFrom").is_some());
        assert!(value.get("validTo").is_some());
        assert!(value.get("collegeApprovedAt").is_none());
        assert!(value.get("qrCode").is_none());
    }

    #[test]
    fn test_railway_approved_record_exposes_pass_fields() {
        let mut record = submitted_record();
        let college_at = record.created_at() + Duration::hours(2);
        let railway_at = college_at + Duration::hours(3);
        record.apply_patch(
            ApplicationPatch::touch(railway_at).with_state(ApplicationState::RailwayApproved {
                college_approved_at: college_at,
                railway_approved_at: railway_at,
                pass_token: PassToken::new("RCP-1"),
            }),
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "railway_approved");
        assert_eq!(value["qrCode"], "RCP-1");
        assert!(value.get("collegeApprovedAt").is_some());

        let back: ConcessionApplication = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_load_rejects_railway_approval_without_college_approval() {
        let mut value = serde_json::to_value(submitted_record()).unwrap();
        value["status"] = json!("railway_approved");
        value["railwayApprovedAt"] = json!("2025-07-02T08:00:00Z");
        value["qrCode"] = json!("generated");

        let err = serde_json::from_value::<ConcessionApplication>(value).unwrap_err();
        assert!(err.to_string().contains("railwayApprovedAt set without collegeApprovedAt"));
    }

    #[test]
    fn test_load_rejects_rejection_reason_on_live_record() {
        let mut value = serde_json::to_value(submitted_record()).unwrap();
        value["rejectionReason"] = json!("blurry id");

        assert!(serde_json::from_value::<ConcessionApplication>(value).is_err());
    }

    #[test]
    fn test_load_rejects_approved_record_without_credential() {
        let mut value = serde_json::to_value(submitted_record()).unwrap();
        value["status"] = json!("railway_approved");
        value["collegeApprovedAt"] = json!("2025-07-01T09:00:00Z");
        value["railwayApprovedAt"] = json!("2025-07-01T10:00:00Z");

        assert!(serde_json::from_value::<ConcessionApplication>(value).is_err());
    }

    #[test]
    fn test_load_legacy_rejection_recovers_stage_and_time() {
        let mut value = serde_json::to_value(submitted_record()).unwrap();
        value["status"] = json!("rejected");
        value["travelClass"] = json!("1st");
        value["collegeApprovedAt"] = json!("2025-07-01T09:00:00Z");
        value["rejectionReason"] = json!("Application rejected");
        value["updatedAt"] = json!("2025-07-03T12:00:00Z");

        let record: ConcessionApplication = serde_json::from_value(value).unwrap();
        let rejection = record.state().rejection().unwrap();

        assert_eq!(record.itinerary().travel_class, TravelClass::First);
        assert!(matches!(rejection.stage, ReviewStage::Railway { .. }));
        assert_eq!(
            rejection.rejected_at,
            Utc.with_ymd_and_hms(2025, 7, 3, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_patch_leaves_identity_untouched() {
        let mut record = submitted_record();
        let before = record.clone();
        let later = record.created_at() + Duration::minutes(5);

        record.apply_patch(ApplicationPatch::touch(later).with_college_remarks("documents ok"));

        assert_eq!(record.id(), before.id());
        assert_eq!(record.itinerary(), before.itinerary());
        assert_eq!(record.status(), ApplicationStatus::Submitted);
        assert_eq!(record.college_remarks(), Some("documents ok"));
        assert_eq!(record.updated_at(), later);
        let value: Value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["collegeRemarks"], "documents ok");
    }
}
