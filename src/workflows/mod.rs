// Concession application workflow
//
// Submission, the role-gated approval chain and the queries the dashboards
// need. Every state change goes through the transition table in
// `state_machine`; the engine only reads it.

pub mod clock;
pub mod engine;
pub mod error;
pub mod pass;
pub mod state;
pub mod state_machine;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{
    ApplicationSummary, ApplicationWorkflow, WorkflowSettings, DEFAULT_REJECTION_REASON,
};
pub use error::{ValidationError, WorkflowError};
pub use pass::{PassIssuer, RandomPassIssuer};
pub use state::{
    ApplicationPatch, ApplicationState, ConcessionApplication, NewApplication, PassToken,
    Rejection, ReviewStage,
};
pub use state_machine::{plan_transition, TransitionEffect, TransitionRule, TRANSITION_TABLE};
pub use types::{
    Actor, ApplicationId, ApplicationStatus, Itinerary, PassDuration, Role, StudentProfile,
    TravelClass, UserId, ValidityWindow,
};
