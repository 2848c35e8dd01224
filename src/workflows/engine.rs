// Application workflow - submission, role-gated transitions and queries
//
// The workflow owns no records. It validates a request, computes the new
// state from the transition table and hands a single patch to the store.
// A refused or failed request leaves the stored record as it was.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

use super::clock::{Clock, SystemClock};
use super::error::{ValidationError, WorkflowError};
use super::pass::{PassIssuer, RandomPassIssuer};
use super::state::{ApplicationPatch, ConcessionApplication, NewApplication};
use super::state_machine::{self, TransitionContext, TransitionEffect};
use super::types::{
    Actor, ApplicationId, ApplicationStatus, Itinerary, Role, StudentProfile, UserId,
};
use crate::stations;
use crate::storage::{ApplicationDraft, ApplicationStore, DraftStore, Store};
use crate::telemetry::{create_workflow_span, generate_correlation_id};

pub const DEFAULT_REJECTION_REASON: &str = "Application rejected";

/// Policy knobs for the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Stored when a reviewer rejects without giving a reason
    pub default_rejection_reason: String,
    /// Restrict college admins to applications from their own college
    pub enforce_college_scope: bool,
    /// Refuse station codes missing from the catalog
    pub require_known_stations: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            default_rejection_reason: DEFAULT_REJECTION_REASON.to_string(),
            enforce_college_scope: false,
            require_known_stations: false,
        }
    }
}

/// Dashboard counts for one student
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationSummary {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Most recent railway-approved application still inside its validity window
    pub active_pass: Option<ConcessionApplication>,
}

impl ApplicationSummary {
    fn from_applications(applications: Vec<ConcessionApplication>, now: DateTime<Utc>) -> Self {
        let count = |status: ApplicationStatus| {
            applications.iter().filter(|a| a.status() == status).count()
        };
        let pending = applications.iter().filter(|a| a.status().is_pending()).count();
        let approved = count(ApplicationStatus::RailwayApproved);
        let rejected = count(ApplicationStatus::Rejected);
        let total = applications.len();
        let active_pass = applications.into_iter().find(|a| a.is_active_pass(now));

        Self {
            total,
            pending,
            approved,
            rejected,
            active_pass,
        }
    }
}

pub struct ApplicationWorkflow<S: ?Sized = dyn Store> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    issuer: Arc<dyn PassIssuer>,
    settings: WorkflowSettings,
}

impl<S: ApplicationStore + ?Sized> ApplicationWorkflow<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            issuer: Arc::new(RandomPassIssuer::default()),
            settings: WorkflowSettings::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_pass_issuer(mut self, issuer: Arc<dyn PassIssuer>) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn with_settings(mut self, settings: WorkflowSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Normalizes station codes and checks the itinerary is usable
    pub fn validate_itinerary(&self, itinerary: Itinerary) -> Result<Itinerary, ValidationError> {
        let itinerary = itinerary.normalized();

        if itinerary.source_station.is_empty() {
            return Err(ValidationError::EmptyStation { field: "source" });
        }
        if itinerary.destination_station.is_empty() {
            return Err(ValidationError::EmptyStation {
                field: "destination",
            });
        }
        if itinerary.source_station == itinerary.destination_station {
            return Err(ValidationError::SameStation {
                code: itinerary.source_station,
            });
        }
        if self.settings.require_known_stations {
            for code in [&itinerary.source_station, &itinerary.destination_station] {
                if !stations::is_known(code) {
                    return Err(ValidationError::UnknownStation { code: code.clone() });
                }
            }
        }

        Ok(itinerary)
    }

    /// Create a submitted application with default profile and reason
    pub async fn submit(
        &self,
        itinerary: Itinerary,
        actor: &Actor,
    ) -> Result<ConcessionApplication, WorkflowError> {
        self.submit_application(NewApplication::new(itinerary), actor)
            .await
    }

    pub async fn submit_application(
        &self,
        request: NewApplication,
        actor: &Actor,
    ) -> Result<ConcessionApplication, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span = create_workflow_span(
            "submit",
            None,
            actor.id.as_str(),
            actor.role.as_str(),
            &correlation_id,
        );

        self.create_submitted(request, actor)
            .instrument(span)
            .await
    }

    /// Move an application to `target` on behalf of `actor`.
    ///
    /// `reason` is the rejection reason for rejections and the reviewer's
    /// remarks for approvals.
    pub async fn transition(
        &self,
        id: &ApplicationId,
        target: ApplicationStatus,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<ConcessionApplication, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span = create_workflow_span(
            "transition",
            Some(id.as_str()),
            actor.id.as_str(),
            actor.role.as_str(),
            &correlation_id,
        );

        self.apply_transition(id, target, actor, reason)
            .instrument(span)
            .await
    }

    /// Approve at the stage matching the actor's role
    pub async fn approve(
        &self,
        id: &ApplicationId,
        actor: &Actor,
        remarks: Option<&str>,
    ) -> Result<ConcessionApplication, WorkflowError> {
        let target = match actor.role {
            Role::CollegeAdmin => ApplicationStatus::CollegeApproved,
            Role::RailwayAdmin => ApplicationStatus::RailwayApproved,
            Role::Student => {
                let current = self.get(id).await?;
                current
                    .status()
                    .next_approval()
                    .unwrap_or(ApplicationStatus::RailwayApproved)
            }
        };
        self.transition(id, target, actor, remarks).await
    }

    pub async fn reject(
        &self,
        id: &ApplicationId,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<ConcessionApplication, WorkflowError> {
        self.transition(id, ApplicationStatus::Rejected, actor, reason)
            .await
    }

    pub async fn get(&self, id: &ApplicationId) -> Result<ConcessionApplication, WorkflowError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(id.clone()))
    }

    /// A student's applications, most recent first
    pub async fn list_for_owner(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConcessionApplication>, WorkflowError> {
        Ok(self.store.list_by_owner(user_id).await?)
    }

    pub async fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ConcessionApplication>, WorkflowError> {
        Ok(self.store.list_by_status(status).await?)
    }

    /// Applications waiting on this actor's decision
    pub async fn review_queue(
        &self,
        actor: &Actor,
    ) -> Result<Vec<ConcessionApplication>, WorkflowError> {
        let Some(status) = actor.role.review_queue_status() else {
            return Ok(Vec::new());
        };
        let queue = self.store.list_by_status(status).await?;
        Ok(queue
            .into_iter()
            .filter(|application| self.in_scope(actor, application))
            .collect())
    }

    /// Dashboard counts for `user_id`, with the pass active at `now`
    pub async fn summary_for_owner(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<ApplicationSummary, WorkflowError> {
        let applications = self.store.list_by_owner(user_id).await?;
        Ok(ApplicationSummary::from_applications(applications, now))
    }

    /// Statuses the actor could move this application to right now
    pub fn available_transitions(
        &self,
        application: &ConcessionApplication,
        actor: &Actor,
    ) -> Vec<ApplicationStatus> {
        if !self.in_scope(actor, application) {
            return Vec::new();
        }
        state_machine::permitted_targets(application.status(), actor.role)
    }

    async fn create_submitted(
        &self,
        request: NewApplication,
        actor: &Actor,
    ) -> Result<ConcessionApplication, WorkflowError> {
        if actor.role != Role::Student {
            warn!(role = %actor.role, "Refused submission from non-student");
            return Err(ValidationError::RoleNotPermitted { role: actor.role }.into());
        }

        let itinerary = self
            .validate_itinerary(request.itinerary)
            .inspect_err(|e| warn!(error = %e, "Submission failed validation"))?;
        let request = NewApplication {
            itinerary,
            ..request
        };

        let application = ConcessionApplication::submitted(
            ApplicationId::generate(),
            actor.id.clone(),
            request,
            self.clock.now(),
        );
        self.store.create(&application).await?;

        info!(
            application_id = %application.id(),
            source = %application.itinerary().source_station,
            destination = %application.itinerary().destination_station,
            duration = %application.itinerary().duration,
            valid_to = %application.validity().valid_to,
            "Application submitted"
        );
        Ok(application)
    }

    async fn apply_transition(
        &self,
        id: &ApplicationId,
        target: ApplicationStatus,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<ConcessionApplication, WorkflowError> {
        let current = self.get(id).await?;
        let from = current.status();

        let rule = state_machine::plan_transition(from, target, actor.role)
            .inspect_err(|_| warn!(from = %from, to = %target, "Refused transition"))?;

        if !self.in_scope(actor, &current) {
            warn!(
                college = %current.applicant().college_name,
                "Refused transition outside reviewer's college"
            );
            return Err(WorkflowError::OutOfScope {
                application_id: id.clone(),
                application_college: current.applicant().college_name.clone(),
            });
        }

        let now = self.clock.now();
        let ctx = TransitionContext {
            application_id: id,
            now,
            reason,
            default_rejection_reason: &self.settings.default_rejection_reason,
            issuer: self.issuer.as_ref(),
        };
        let next = state_machine::next_state(current.state(), rule, &ctx)?;

        let mut patch = ApplicationPatch::touch(now).with_state(next);
        let remarks = reason.map(str::trim).filter(|r| !r.is_empty());
        match (rule.effect, remarks) {
            (TransitionEffect::StampCollegeApproval, Some(remarks)) => {
                patch = patch.with_college_remarks(remarks);
            }
            (TransitionEffect::IssuePass, Some(remarks)) => {
                patch = patch.with_railway_remarks(remarks);
            }
            _ => {}
        }

        let updated = self
            .store
            .update(id, patch)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(id.clone()))?;

        info!(from = %from, to = %updated.status(), "Application transitioned");
        Ok(updated)
    }

    fn in_scope(&self, actor: &Actor, application: &ConcessionApplication) -> bool {
        if !self.settings.enforce_college_scope || actor.role != Role::CollegeAdmin {
            return true;
        }
        actor.college.as_deref().is_some_and(|college| {
            college
                .trim()
                .eq_ignore_ascii_case(application.applicant().college_name.trim())
        })
    }
}

impl<S: ApplicationStore + DraftStore + ?Sized> ApplicationWorkflow<S> {
    /// Merge `draft` into the actor's saved draft and return the result
    pub async fn save_draft(
        &self,
        actor: &Actor,
        draft: ApplicationDraft,
    ) -> Result<ApplicationDraft, WorkflowError> {
        Self::require_student(actor)?;
        let mut merged = self
            .store
            .get_draft(&actor.id)
            .await?
            .unwrap_or_default();
        merged.merge(draft);
        self.store.save_draft(&actor.id, &merged).await?;
        Ok(merged)
    }

    pub async fn load_draft(&self, actor: &Actor) -> Result<Option<ApplicationDraft>, WorkflowError> {
        Ok(self.store.get_draft(&actor.id).await?)
    }

    pub async fn discard_draft(&self, actor: &Actor) -> Result<(), WorkflowError> {
        Ok(self.store.clear_draft(&actor.id).await?)
    }

    /// Submit the saved draft; the draft is cleared only once the record exists
    pub async fn submit_draft(
        &self,
        actor: &Actor,
        profile: StudentProfile,
    ) -> Result<ConcessionApplication, WorkflowError> {
        Self::require_student(actor)?;
        let draft = self
            .store
            .get_draft(&actor.id)
            .await?
            .unwrap_or_default();

        let mut request = NewApplication::new(draft.to_itinerary()?).with_profile(profile);
        if let Some(reason) = draft.reason.filter(|r| !r.trim().is_empty()) {
            request = request.with_reason(reason);
        }
        if let Some(uri) = draft.college_id_uri {
            request = request.with_college_id_uri(uri);
        }

        let application = self.submit_application(request, actor).await?;
        self.store.clear_draft(&actor.id).await?;
        Ok(application)
    }

    fn require_student(actor: &Actor) -> Result<(), WorkflowError> {
        if actor.role == Role::Student {
            Ok(())
        } else {
            Err(ValidationError::RoleNotPermitted { role: actor.role }.into())
        }
    }
}
