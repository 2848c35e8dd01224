// JSON file store behaviour seen through the workflow
//
// Covers persistence across reopen, the flat on-disk layout and two handles
// sharing one data directory.

use rail_concession::storage::{ApplicationStore, JsonFileStore};
use chrono::{Duration, TimeZone, Utc};
use rail_concession::workflows::{
    Actor, ApplicationStatus, ApplicationWorkflow, FixedClock, Itinerary, PassDuration,
    TravelClass,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

fn itinerary() -> Itinerary {
    Itinerary::new("CSMT", "BCT", TravelClass::Second, PassDuration::Monthly)
}

#[tokio::test]
async fn full_approval_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let id = {
        let store = Arc::new(JsonFileStore::open(temp_dir.path()).await.unwrap());
        let workflow = ApplicationWorkflow::new(store);
        let application = workflow
            .submit(itinerary(), &Actor::student("s-1"))
            .await
            .unwrap();
        workflow
            .approve(application.id(), &Actor::college_admin("c-1"), None)
            .await
            .unwrap();
        workflow
            .approve(application.id(), &Actor::railway_admin("r-1"), None)
            .await
            .unwrap();
        application.id().clone()
    };

    let reopened = JsonFileStore::open(temp_dir.path()).await.unwrap();
    let record = reopened.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(record.status(), ApplicationStatus::RailwayApproved);
    let token = record.state().pass_token().unwrap();
    assert!(token.as_str().starts_with("RCP-"));
}

#[tokio::test]
async fn records_are_flat_camel_case_json() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::open(temp_dir.path()).await.unwrap());
    let workflow = ApplicationWorkflow::new(store.clone());
    let application = workflow
        .submit(itinerary(), &Actor::student("s-1"))
        .await
        .unwrap();
    workflow
        .reject(application.id(), &Actor::college_admin("c-1"), Some("Blurry id card"))
        .await
        .unwrap();

    let raw = std::fs::read_to_string(store.applications_path()).unwrap();
    let records: Value = serde_json::from_str(&raw).unwrap();
    let record = &records[0];

    assert_eq!(record["id"], application.id().as_str());
    assert_eq!(record["userId"], "s-1");
    assert_eq!(record["sourceStation"], "CSMT");
    assert_eq!(record["travelClass"], "second");
    assert_eq!(record["duration"], "monthly");
    assert_eq!(record["status"], "rejected");
    assert_eq!(record["rejectionReason"], "Blurry id card");
    assert!(record["rejectedAt"].is_string());
    assert!(record["railwayApprovedAt"].is_null());
}

#[tokio::test]
async fn legacy_class_spelling_is_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::open(temp_dir.path()).await.unwrap());
    let workflow = ApplicationWorkflow::new(store.clone());
    workflow
        .submit(itinerary(), &Actor::student("s-1"))
        .await
        .unwrap();

    let raw = std::fs::read_to_string(store.applications_path()).unwrap();
    let mut records: Value = serde_json::from_str(&raw).unwrap();
    records[0]["travelClass"] = Value::from("1st");
    std::fs::write(store.applications_path(), records.to_string()).unwrap();

    let all = store.list_all().await.unwrap();
    assert_eq!(all[0].itinerary().travel_class, TravelClass::First);
}

// Every operation re-reads the file under the lock, so sequential writers see
// each other. Interleaved read-decide-write across processes is still
// last-write-wins with no merge; that is a known limitation, not a guarantee.
#[tokio::test]
async fn separate_handles_see_each_others_writes() {
    let temp_dir = TempDir::new().unwrap();
    let first = ApplicationWorkflow::new(Arc::new(
        JsonFileStore::open(temp_dir.path()).await.unwrap(),
    ));
    let second = ApplicationWorkflow::new(Arc::new(
        JsonFileStore::open(temp_dir.path()).await.unwrap(),
    ));

    let application = first
        .submit(itinerary(), &Actor::student("s-1"))
        .await
        .unwrap();
    let college = Actor::college_admin("c-1");

    first
        .approve(application.id(), &college, None)
        .await
        .unwrap();
    let err = second
        .reject(application.id(), &college, None)
        .await
        .unwrap_err();
    assert!(err.is_invalid_transition());

    let record = second.get(application.id()).await.unwrap();
    assert_eq!(record.status(), ApplicationStatus::CollegeApproved);
}

#[tokio::test]
async fn clock_stepping_back_between_approvals_keeps_store_readable() {
    let temp_dir = TempDir::new().unwrap();
    let start = Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap();
    let clock = Arc::new(FixedClock::new(start));
    let store = Arc::new(JsonFileStore::open(temp_dir.path()).await.unwrap());
    let workflow = ApplicationWorkflow::new(store.clone()).with_clock(clock.clone());
    let student = Actor::student("s-1");

    let approved = workflow.submit(itinerary(), &student).await.unwrap();
    let bystander = workflow.submit(itinerary(), &student).await.unwrap();

    clock.set(start + Duration::hours(2));
    workflow
        .approve(approved.id(), &Actor::college_admin("c-1"), None)
        .await
        .unwrap();
    clock.set(start + Duration::hours(1));
    let issued = workflow
        .approve(approved.id(), &Actor::railway_admin("r-1"), None)
        .await
        .unwrap();

    let college_at = issued.state().college_approved_at().unwrap();
    assert_eq!(issued.state().railway_approved_at(), Some(college_at));

    assert_eq!(store.list_all().await.unwrap().len(), 2);
    let reopened = JsonFileStore::open(temp_dir.path()).await.unwrap();
    let record = reopened.get_by_id(approved.id()).await.unwrap().unwrap();
    assert_eq!(record.status(), ApplicationStatus::RailwayApproved);
    assert!(reopened.get_by_id(bystander.id()).await.unwrap().is_some());
}
