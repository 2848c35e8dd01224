// End-to-end workflow scenarios against the in-memory store
//
// Each test drives ApplicationWorkflow through the public API the CLI uses
// and checks both the returned record and what the store holds afterwards.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rail_concession::storage::{ApplicationDraft, ApplicationStore, InMemoryStore};
use rail_concession::workflows::{
    Actor, ApplicationId, ApplicationStatus, ApplicationWorkflow, ConcessionApplication,
    FixedClock, Itinerary, NewApplication, PassDuration, PassIssuer, PassToken, ReviewStage,
    StudentProfile, TravelClass, ValidationError, WorkflowError, WorkflowSettings,
};
use std::sync::Arc;

struct SerialIssuer;

impl PassIssuer for SerialIssuer {
    fn issue(&self, application_id: &ApplicationId, _issued_at: DateTime<Utc>) -> PassToken {
        PassToken::new(format!("PASS-{application_id}"))
    }
}

struct Harness {
    store: Arc<InMemoryStore>,
    clock: Arc<FixedClock>,
    workflow: ApplicationWorkflow<InMemoryStore>,
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap()
}

fn harness_with(settings: WorkflowSettings) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(FixedClock::new(start()));
    let workflow = ApplicationWorkflow::new(store.clone())
        .with_clock(clock.clone())
        .with_pass_issuer(Arc::new(SerialIssuer))
        .with_settings(settings);
    Harness {
        store,
        clock,
        workflow,
    }
}

fn harness() -> Harness {
    harness_with(WorkflowSettings::default())
}

fn monthly(from: &str, to: &str) -> Itinerary {
    Itinerary::new(from, to, TravelClass::Second, PassDuration::Monthly)
}

fn student() -> Actor {
    Actor::student("student-1")
}

fn college() -> Actor {
    Actor::college_admin("college-1")
}

fn railway() -> Actor {
    Actor::railway_admin("railway-1")
}

async fn stored(h: &Harness, application: &ConcessionApplication) -> ConcessionApplication {
    h.store
        .get_by_id(application.id())
        .await
        .unwrap()
        .expect("record should exist")
}

#[tokio::test]
async fn scenario_a_student_submits_monthly_pass() {
    let h = harness();
    let application = h.workflow.submit(monthly("CSMT", "BCT"), &student()).await.unwrap();

    assert_eq!(application.status(), ApplicationStatus::Submitted);
    assert_eq!(application.created_at(), start());
    assert_eq!(application.updated_at(), start());
    assert_eq!(application.validity().valid_from, start());
    assert_eq!(application.validity().valid_to, start() + Duration::days(30));
    assert_eq!(application.reason(), "Academic Travel");
    assert_eq!(stored(&h, &application).await, application);
}

#[tokio::test]
async fn scenario_b_college_approval_stamps_time_only() {
    let h = harness();
    let application = h.workflow.submit(monthly("CSMT", "BCT"), &student()).await.unwrap();

    h.clock.advance(Duration::hours(3));
    let approved = h
        .workflow
        .transition(
            application.id(),
            ApplicationStatus::CollegeApproved,
            &college(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(approved.status(), ApplicationStatus::CollegeApproved);
    assert_eq!(
        approved.state().college_approved_at(),
        Some(start() + Duration::hours(3))
    );
    assert_eq!(approved.state().railway_approved_at(), None);
    assert!(approved.state().pass_token().is_none());
    assert_eq!(approved.updated_at(), start() + Duration::hours(3));
    assert_eq!(approved.created_at(), start());
}

#[tokio::test]
async fn scenario_c_railway_approval_issues_pass() {
    let h = harness();
    let application = h.workflow.submit(monthly("CSMT", "BCT"), &student()).await.unwrap();
    h.workflow
        .approve(application.id(), &college(), Some("documents verified"))
        .await
        .unwrap();

    h.clock.advance(Duration::days(1));
    let approved = h
        .workflow
        .approve(application.id(), &railway(), None)
        .await
        .unwrap();

    assert_eq!(approved.status(), ApplicationStatus::RailwayApproved);
    let token = approved.state().pass_token().expect("pass issued");
    assert_eq!(token.as_str(), format!("PASS-{}", application.id()));
    assert_eq!(
        approved.state().railway_approved_at(),
        Some(start() + Duration::days(1))
    );
    assert!(approved.state().college_approved_at().is_some());
    assert_eq!(approved.college_remarks(), Some("documents verified"));
}

#[tokio::test]
async fn scenario_d_college_admin_cannot_skip_railway_stage() {
    let h = harness();
    let application = h.workflow.submit(monthly("CSMT", "BCT"), &student()).await.unwrap();

    let err = h
        .workflow
        .transition(
            application.id(),
            ApplicationStatus::RailwayApproved,
            &college(),
            None,
        )
        .await
        .unwrap_err();

    match err {
        WorkflowError::InvalidTransition { from, to, role } => {
            assert_eq!(from, ApplicationStatus::Submitted);
            assert_eq!(to, ApplicationStatus::RailwayApproved);
            assert_eq!(role, rail_concession::Role::CollegeAdmin);
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
    assert_eq!(stored(&h, &application).await, application);
}

#[tokio::test]
async fn scenario_e_railway_approved_is_terminal() {
    let h = harness();
    let application = h.workflow.submit(monthly("CSMT", "BCT"), &student()).await.unwrap();
    h.workflow.approve(application.id(), &college(), None).await.unwrap();
    let approved = h.workflow.approve(application.id(), &railway(), None).await.unwrap();

    let err = h
        .workflow
        .reject(application.id(), &railway(), Some("changed my mind"))
        .await
        .unwrap_err();

    assert!(err.is_invalid_transition());
    assert_eq!(stored(&h, &application).await, approved);
}

#[tokio::test]
async fn scenario_f_students_cannot_transition() {
    let h = harness();
    let application = h.workflow.submit(monthly("CSMT", "BCT"), &student()).await.unwrap();

    for target in ApplicationStatus::ALL {
        let err = h
            .workflow
            .transition(application.id(), target, &student(), Some("please"))
            .await
            .unwrap_err();
        assert!(err.is_invalid_transition(), "{target} should be refused");
    }
    let err = h
        .workflow
        .approve(application.id(), &student(), None)
        .await
        .unwrap_err();
    assert!(err.is_invalid_transition());

    assert_eq!(stored(&h, &application).await, application);
}

#[tokio::test]
async fn rejection_without_reason_uses_default() {
    let h = harness();
    let application = h.workflow.submit(monthly("TNA", "DR"), &student()).await.unwrap();

    let rejected = h
        .workflow
        .reject(application.id(), &college(), Some("   "))
        .await
        .unwrap();

    assert_eq!(rejected.status(), ApplicationStatus::Rejected);
    assert_eq!(rejected.state().rejection_reason(), Some("Application rejected"));
    let rejection = rejected.state().rejection().unwrap();
    assert_eq!(rejection.stage, ReviewStage::College);
    assert_eq!(rejection.rejected_at, start());
}

#[tokio::test]
async fn railway_rejection_keeps_college_approval() {
    let h = harness_with(WorkflowSettings {
        default_rejection_reason: "Not eligible".to_string(),
        ..WorkflowSettings::default()
    });
    let application = h.workflow.submit(monthly("TNA", "DR"), &student()).await.unwrap();
    h.workflow.approve(application.id(), &college(), None).await.unwrap();

    let rejected = h.workflow.reject(application.id(), &railway(), None).await.unwrap();

    assert_eq!(rejected.state().rejection_reason(), Some("Not eligible"));
    assert!(rejected.state().college_approved_at().is_some());
    assert!(rejected.state().railway_approved_at().is_none());

    let err = h
        .workflow
        .approve(application.id(), &railway(), None)
        .await
        .unwrap_err();
    assert!(err.is_invalid_transition());
}

#[tokio::test]
async fn self_transition_is_refused() {
    let h = harness();
    let application = h.workflow.submit(monthly("TNA", "DR"), &student()).await.unwrap();

    let err = h
        .workflow
        .transition(application.id(), ApplicationStatus::Submitted, &college(), None)
        .await
        .unwrap_err();
    assert!(err.is_invalid_transition());
}

#[tokio::test]
async fn unknown_application_is_not_found() {
    let h = harness();
    let err = h
        .workflow
        .approve(&ApplicationId::from("missing"), &college(), None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn submission_validation() {
    let h = harness();

    let err = h
        .workflow
        .submit(monthly("CSMT", "csmt "), &student())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = h.workflow.submit(monthly("  ", "BCT"), &student()).await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Validation(ValidationError::EmptyStation { field: "source" })
    ));

    let err = h.workflow.submit(monthly("CSMT", "BCT"), &college()).await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Validation(ValidationError::RoleNotPermitted { .. })
    ));

    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn submission_normalizes_codes_and_keeps_profile() {
    let h = harness();
    let profile = StudentProfile {
        student_name: "Asha Patil".to_string(),
        college_name: "VJTI".to_string(),
        department: "Computer".to_string(),
        year: "TE".to_string(),
        prn: "2021001".to_string(),
    };
    let request = NewApplication::new(Itinerary::new(
        " bvi ",
        "ccg",
        TravelClass::First,
        PassDuration::Quarterly,
    ))
    .with_profile(profile.clone())
    .with_reason("Internship")
    .with_college_id_uri("file:///ids/asha.png");

    let application = h.workflow.submit_application(request, &student()).await.unwrap();

    assert_eq!(application.itinerary().source_station, "BVI");
    assert_eq!(application.itinerary().destination_station, "CCG");
    assert_eq!(application.applicant(), &profile);
    assert_eq!(application.reason(), "Internship");
    assert_eq!(application.college_id_uri(), Some("file:///ids/asha.png"));
    assert_eq!(application.validity().length(), Duration::days(90));
}

#[tokio::test]
async fn known_stations_enforced_when_configured() {
    let h = harness_with(WorkflowSettings {
        require_known_stations: true,
        ..WorkflowSettings::default()
    });

    let err = h.workflow.submit(monthly("CSMT", "NOPE"), &student()).await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Validation(ValidationError::UnknownStation { ref code }) if code == "NOPE"
    ));
    assert!(h.workflow.submit(monthly("CSMT", "TNA"), &student()).await.is_ok());
}

#[tokio::test]
async fn queues_follow_reviewer_roles() {
    let h = harness();
    let first = h.workflow.submit(monthly("CSMT", "BCT"), &student()).await.unwrap();
    h.clock.advance(Duration::minutes(1));
    let second = h
        .workflow
        .submit(monthly("DDR", "TNA"), &Actor::student("student-2"))
        .await
        .unwrap();

    let college_queue = h.workflow.review_queue(&college()).await.unwrap();
    let ids: Vec<_> = college_queue.iter().map(|a| a.id().clone()).collect();
    assert_eq!(ids, vec![second.id().clone(), first.id().clone()]);
    assert!(h.workflow.review_queue(&railway()).await.unwrap().is_empty());
    assert!(h.workflow.review_queue(&student()).await.unwrap().is_empty());

    h.workflow.approve(first.id(), &college(), None).await.unwrap();

    let railway_queue = h.workflow.review_queue(&railway()).await.unwrap();
    assert_eq!(railway_queue.len(), 1);
    assert_eq!(railway_queue[0].id(), first.id());
    assert_eq!(h.workflow.review_queue(&college()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn owner_listing_is_most_recent_first() {
    let h = harness();
    let older = h.workflow.submit(monthly("CSMT", "BCT"), &student()).await.unwrap();
    h.clock.advance(Duration::days(2));
    let newer = h.workflow.submit(monthly("BCT", "CSMT"), &student()).await.unwrap();
    h.workflow
        .submit(monthly("DDR", "TNA"), &Actor::student("someone-else"))
        .await
        .unwrap();

    let mine = h.workflow.list_for_owner(&student().id).await.unwrap();
    let ids: Vec<_> = mine.iter().map(|a| a.id()).collect();
    assert_eq!(ids, vec![newer.id(), older.id()]);

    let submitted = h
        .workflow
        .list_by_status(ApplicationStatus::Submitted)
        .await
        .unwrap();
    assert_eq!(submitted.len(), 3);
}

#[tokio::test]
async fn summary_counts_and_active_pass() {
    let h = harness();
    let approved = h.workflow.submit(monthly("CSMT", "BCT"), &student()).await.unwrap();
    h.workflow.approve(approved.id(), &college(), None).await.unwrap();
    h.workflow.approve(approved.id(), &railway(), None).await.unwrap();

    let rejected = h.workflow.submit(monthly("DDR", "TNA"), &student()).await.unwrap();
    h.workflow.reject(rejected.id(), &college(), None).await.unwrap();

    h.workflow.submit(monthly("KYN", "TNA"), &student()).await.unwrap();

    let summary = h
        .workflow
        .summary_for_owner(&student().id, start() + Duration::days(5))
        .await
        .unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.approved, 1);
    assert_eq!(summary.rejected, 1);
    assert_eq!(
        summary.active_pass.as_ref().map(|a| a.id()),
        Some(approved.id())
    );

    let later = h
        .workflow
        .summary_for_owner(&student().id, start() + Duration::days(31))
        .await
        .unwrap();
    assert!(later.active_pass.is_none());
    assert_eq!(later.approved, 1);
}

#[tokio::test]
async fn draft_lifecycle() {
    let h = harness();
    let actor = student();

    h.workflow
        .save_draft(
            &actor,
            ApplicationDraft {
                source_station: Some("ADH".to_string()),
                duration: Some(PassDuration::Quarterly),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = h
        .workflow
        .submit_draft(&actor, StudentProfile::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Validation(ValidationError::MissingField { .. })
    ));
    assert!(h.workflow.load_draft(&actor).await.unwrap().is_some());

    let merged = h
        .workflow
        .save_draft(
            &actor,
            ApplicationDraft {
                destination_station: Some("CCG".to_string()),
                reason: Some("Exams".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(merged.source_station.as_deref(), Some("ADH"));

    let application = h
        .workflow
        .submit_draft(&actor, StudentProfile::default())
        .await
        .unwrap();
    assert_eq!(application.itinerary().duration, PassDuration::Quarterly);
    assert_eq!(application.reason(), "Exams");
    assert!(h.workflow.load_draft(&actor).await.unwrap().is_none());
}

#[tokio::test]
async fn failed_draft_submission_keeps_draft() {
    let h = harness();
    let actor = student();
    h.workflow
        .save_draft(
            &actor,
            ApplicationDraft {
                source_station: Some("DDR".to_string()),
                destination_station: Some("ddr".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = h
        .workflow
        .submit_draft(&actor, StudentProfile::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(h.workflow.load_draft(&actor).await.unwrap().is_some());

    h.workflow.discard_draft(&actor).await.unwrap();
    assert!(h.workflow.load_draft(&actor).await.unwrap().is_none());
}

#[tokio::test]
async fn college_scope_is_opt_in() {
    let profile = |college: &str| StudentProfile {
        college_name: college.to_string(),
        ..Default::default()
    };
    let vjti_admin = Actor::college_admin("admin-vjti").with_college("VJTI");

    // Without scoping any college admin can act
    let open = harness();
    let other = open
        .workflow
        .submit_application(
            NewApplication::new(monthly("CSMT", "BCT")).with_profile(profile("SPIT")),
            &student(),
        )
        .await
        .unwrap();
    assert_eq!(open.workflow.review_queue(&vjti_admin).await.unwrap().len(), 1);
    assert!(open.workflow.approve(other.id(), &vjti_admin, None).await.is_ok());

    let scoped = harness_with(WorkflowSettings {
        enforce_college_scope: true,
        ..WorkflowSettings::default()
    });
    let own = scoped
        .workflow
        .submit_application(
            NewApplication::new(monthly("CSMT", "BCT")).with_profile(profile("vjti")),
            &student(),
        )
        .await
        .unwrap();
    let foreign = scoped
        .workflow
        .submit_application(
            NewApplication::new(monthly("CSMT", "BCT")).with_profile(profile("SPIT")),
            &student(),
        )
        .await
        .unwrap();

    let queue = scoped.workflow.review_queue(&vjti_admin).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].id(), own.id());

    let err = scoped
        .workflow
        .approve(foreign.id(), &vjti_admin, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::OutOfScope { .. }));
    assert_eq!(stored(&scoped, &foreign).await, foreign);

    // Railway admins are never scoped
    assert!(scoped.workflow.approve(own.id(), &vjti_admin, None).await.is_ok());
    assert!(scoped.workflow.approve(own.id(), &railway(), None).await.is_ok());
}

#[tokio::test]
async fn remarks_are_kept_per_stage() {
    let h = harness();
    let application = h.workflow.submit(monthly("CSMT", "BCT"), &student()).await.unwrap();

    h.workflow
        .approve(application.id(), &college(), Some("id verified"))
        .await
        .unwrap();
    let done = h
        .workflow
        .approve(application.id(), &railway(), Some("collect at counter 3"))
        .await
        .unwrap();

    assert_eq!(done.college_remarks(), Some("id verified"));
    assert_eq!(done.railway_remarks(), Some("collect at counter 3"));
}
