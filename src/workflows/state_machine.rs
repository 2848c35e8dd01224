// Role-gated transition table for concession applications
//
// Every status change goes through `plan_transition`; nothing else decides
// whether an actor may move an application.

use chrono::{DateTime, Utc};

use super::error::WorkflowError;
use super::pass::PassIssuer;
use super::state::{ApplicationState, Rejection, ReviewStage};
use super::types::{ApplicationId, ApplicationStatus, Role};

/// Side effect applied when a transition fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    /// Record when the college signed off
    StampCollegeApproval,
    /// Record the railway sign-off and issue the pass credential
    IssuePass,
    /// Record the reason the application was turned down
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub role: Role,
    pub effect: TransitionEffect,
}

pub const TRANSITION_TABLE: [TransitionRule; 4] = [
    TransitionRule {
        from: ApplicationStatus::Submitted,
        to: ApplicationStatus::CollegeApproved,
        role: Role::CollegeAdmin,
        effect: TransitionEffect::StampCollegeApproval,
    },
    TransitionRule {
        from: ApplicationStatus::Submitted,
        to: ApplicationStatus::Rejected,
        role: Role::CollegeAdmin,
        effect: TransitionEffect::Reject,
    },
    TransitionRule {
        from: ApplicationStatus::CollegeApproved,
        to: ApplicationStatus::RailwayApproved,
        role: Role::RailwayAdmin,
        effect: TransitionEffect::IssuePass,
    },
    TransitionRule {
        from: ApplicationStatus::CollegeApproved,
        to: ApplicationStatus::Rejected,
        role: Role::RailwayAdmin,
        effect: TransitionEffect::Reject,
    },
];

/// Looks up the rule allowing `role` to move an application from `from` to `to`
pub fn plan_transition(
    from: ApplicationStatus,
    to: ApplicationStatus,
    role: Role,
) -> Result<&'static TransitionRule, WorkflowError> {
    TRANSITION_TABLE
        .iter()
        .find(|rule| rule.from == from && rule.to == to && rule.role == role)
        .ok_or(WorkflowError::InvalidTransition { from, to, role })
}

/// Statuses `role` may move an application in `from` to
pub fn permitted_targets(from: ApplicationStatus, role: Role) -> Vec<ApplicationStatus> {
    TRANSITION_TABLE
        .iter()
        .filter(|rule| rule.from == from && rule.role == role)
        .map(|rule| rule.to)
        .collect()
}

/// Inputs a rule's effect may draw on
pub struct TransitionContext<'a> {
    pub application_id: &'a ApplicationId,
    pub now: DateTime<Utc>,
    pub reason: Option<&'a str>,
    pub default_rejection_reason: &'a str,
    pub issuer: &'a dyn PassIssuer,
}

/// Computes the state after `rule` fires. Pure: the current state is not modified.
pub fn next_state(
    current: &ApplicationState,
    rule: &TransitionRule,
    ctx: &TransitionContext<'_>,
) -> Result<ApplicationState, WorkflowError> {
    let mismatch = || WorkflowError::InvalidTransition {
        from: current.status(),
        to: rule.to,
        role: rule.role,
    };
    if current.status() != rule.from {
        return Err(mismatch());
    }

    let next = match rule.effect {
        TransitionEffect::StampCollegeApproval => ApplicationState::CollegeApproved {
            college_approved_at: ctx.now,
        },
        TransitionEffect::IssuePass => {
            let college_approved_at = current.college_approved_at().ok_or_else(mismatch)?;
            // A clock that stepped back must not date the pass before the college stamp.
            let railway_approved_at = ctx.now.max(college_approved_at);
            ApplicationState::RailwayApproved {
                college_approved_at,
                railway_approved_at,
                pass_token: ctx.issuer.issue(ctx.application_id, railway_approved_at),
            }
        }
        TransitionEffect::Reject => {
            let reason = ctx
                .reason
                .map(str::trim)
                .filter(|reason| !reason.is_empty())
                .unwrap_or(ctx.default_rejection_reason)
                .to_string();
            let stage = match current.college_approved_at() {
                Some(college_approved_at) => ReviewStage::Railway {
                    college_approved_at,
                },
                None => ReviewStage::College,
            };
            ApplicationState::Rejected(Rejection {
                reason,
                rejected_at: ctx.now,
                stage,
            })
        }
    };

    Ok(next)
}
