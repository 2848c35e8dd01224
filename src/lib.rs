// Rail Concession Library - student railway concession workflow
// This exposes the core components for the CLI and for integration tests

pub mod config;
pub mod identity;
pub mod stations;
pub mod storage;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::{config, ConcessionConfig};
pub use identity::{IdentityError, IdentityProvider, Session, SessionFile, StaticIdentity};
pub use storage::{ApplicationStore, DraftStore, InMemoryStore, JsonFileStore, Store, StoreError};
pub use telemetry::{create_workflow_span, generate_correlation_id, init_telemetry};
pub use workflows::{
    Actor, ApplicationId, ApplicationStatus, ApplicationSummary, ApplicationWorkflow,
    ConcessionApplication, Itinerary, PassDuration, Role, TravelClass, UserId, ValidationError,
    WorkflowError, WorkflowSettings,
};
