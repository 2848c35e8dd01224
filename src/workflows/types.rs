// Core types for the concession application workflow

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Error returned when parsing one of the workflow enums from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Opaque identifier of a concession application
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ApplicationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a user (student or administrator)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role held by an actor. Fixed when the identity is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    CollegeAdmin,
    RailwayAdmin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::CollegeAdmin, Role::RailwayAdmin];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::CollegeAdmin => "college_admin",
            Role::RailwayAdmin => "railway_admin",
        }
    }

    /// Status an administrator of this role works through on their dashboard
    pub const fn review_queue_status(&self) -> Option<ApplicationStatus> {
        match self {
            Role::Student => None,
            Role::CollegeAdmin => Some(ApplicationStatus::Submitted),
            Role::RailwayAdmin => Some(ApplicationStatus::CollegeApproved),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "student" => Ok(Role::Student),
            "college_admin" | "college" => Ok(Role::CollegeAdmin),
            "railway_admin" | "railway" => Ok(Role::RailwayAdmin),
            _ => Err(ParseEnumError::new("role", s)),
        }
    }
}

/// An authenticated identity acting on the workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
    /// College an administrator belongs to, used when college scoping is enforced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
}

impl Actor {
    pub fn new(id: impl Into<UserId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            college: None,
        }
    }

    pub fn student(id: impl Into<UserId>) -> Self {
        Self::new(id, Role::Student)
    }

    pub fn college_admin(id: impl Into<UserId>) -> Self {
        Self::new(id, Role::CollegeAdmin)
    }

    pub fn railway_admin(id: impl Into<UserId>) -> Self {
        Self::new(id, Role::RailwayAdmin)
    }

    pub fn with_college(mut self, college: impl Into<String>) -> Self {
        self.college = Some(college.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelClass {
    #[serde(alias = "1st")]
    First,
    #[default]
    #[serde(alias = "2nd")]
    Second,
}

impl TravelClass {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TravelClass::First => "first",
            TravelClass::Second => "second",
        }
    }
}

impl fmt::Display for TravelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelClass {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "1st" | "1" => Ok(TravelClass::First),
            "second" | "2nd" | "2" => Ok(TravelClass::Second),
            _ => Err(ParseEnumError::new("travel class", s)),
        }
    }
}

/// How long a concession pass stays valid once issued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassDuration {
    #[default]
    Monthly,
    Quarterly,
}

impl PassDuration {
    pub const fn validity_days(&self) -> i64 {
        match self {
            PassDuration::Monthly => 30,
            PassDuration::Quarterly => 90,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            PassDuration::Monthly => "monthly",
            PassDuration::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for PassDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassDuration {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(PassDuration::Monthly),
            "quarterly" | "quarter" => Ok(PassDuration::Quarterly),
            _ => Err(ParseEnumError::new("duration", s)),
        }
    }
}

/// Discriminant of the application lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    CollegeApproved,
    RailwayApproved,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::CollegeApproved,
        ApplicationStatus::RailwayApproved,
        ApplicationStatus::Rejected,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::CollegeApproved => "college_approved",
            ApplicationStatus::RailwayApproved => "railway_approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Human readable badge text
    pub const fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::CollegeApproved => "College Approved",
            ApplicationStatus::RailwayApproved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::RailwayApproved | ApplicationStatus::Rejected
        )
    }

    /// Still waiting on one of the two approval stages
    pub const fn is_pending(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Submitted | ApplicationStatus::CollegeApproved
        )
    }

    /// Next status along the approval path, if any
    pub const fn next_approval(&self) -> Option<ApplicationStatus> {
        match self {
            ApplicationStatus::Submitted => Some(ApplicationStatus::CollegeApproved),
            ApplicationStatus::CollegeApproved => Some(ApplicationStatus::RailwayApproved),
            ApplicationStatus::RailwayApproved | ApplicationStatus::Rejected => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "submitted" => Ok(ApplicationStatus::Submitted),
            "college_approved" => Ok(ApplicationStatus::CollegeApproved),
            "railway_approved" | "approved" => Ok(ApplicationStatus::RailwayApproved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

/// Requested journey. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub source_station: String,
    pub destination_station: String,
    pub travel_class: TravelClass,
    pub duration: PassDuration,
}

impl Itinerary {
    pub fn new(
        source_station: impl Into<String>,
        destination_station: impl Into<String>,
        travel_class: TravelClass,
        duration: PassDuration,
    ) -> Self {
        Self {
            source_station: source_station.into(),
            destination_station: destination_station.into(),
            travel_class,
            duration,
        }
    }

    /// Station codes trimmed and upper-cased
    pub fn normalized(self) -> Self {
        Self {
            source_station: normalize_station_code(&self.source_station),
            destination_station: normalize_station_code(&self.destination_station),
            ..self
        }
    }
}

pub fn normalize_station_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Snapshot of the applicant's profile copied onto the application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub college_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub prn: String,
}

impl StudentProfile {
    /// Whether the fields a reviewer needs are filled in
    pub fn is_complete(&self) -> bool {
        [
            &self.student_name,
            &self.college_name,
            &self.department,
            &self.year,
            &self.prn,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

/// Period a concession pass is valid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityWindow {
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

impl ValidityWindow {
    pub fn starting_at(start: DateTime<Utc>, duration: PassDuration) -> Self {
        Self {
            valid_from: start,
            valid_to: start + Duration::days(duration.validity_days()),
        }
    }

    pub fn length(&self) -> Duration {
        self.valid_to - self.valid_from
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.valid_from <= instant && instant <= self.valid_to
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_to
    }

    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        if self.is_expired(now) {
            0
        } else {
            (self.valid_to - now.max(self.valid_from)).num_days()
        }
    }
}
