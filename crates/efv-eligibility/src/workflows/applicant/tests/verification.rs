use super::common::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::workflows::applicant::domain::{
    ApplicationStatus, DisabilityApplication, PackId, VerificationStatus,
};
use crate::workflows::applicant::fixtures::{
    demo_disability_application, demo_personal_info, DEMO_TOTAL_INCOME,
};
use crate::workflows::applicant::mock::MockLatency;
use crate::workflows::applicant::verification::{
    progress_message, MonotonicProgression, RandomProgression, StatusProgression, StatusSample,
    VerificationError, VerificationTask,
};

fn pack(id: &str) -> PackId {
    PackId(id.to_string())
}

#[tokio::test]
async fn poll_reports_progress_until_complete() {
    let service = verification_service(MockLatency::instant(), ScriptedProgression::completing());
    let mut seen = Vec::new();

    let result = service
        .poll_verification_status(&pack("PACK-1"), |status| seen.push(status.status), 60)
        .await
        .expect("verification completes");

    assert_eq!(
        seen,
        vec![
            ApplicationStatus::Pending,
            ApplicationStatus::Processing,
            ApplicationStatus::Complete
        ]
    );
    assert_eq!(result.total_income, DEMO_TOTAL_INCOME);
    assert_eq!(result.status, VerificationStatus::Verified);
    assert!(result.verified_at.is_some());
}

#[tokio::test]
async fn poll_stops_on_failed_status() {
    let progression = ScriptedProgression::new(vec![StatusSample::PENDING], StatusSample::FAILED);
    let service = verification_service(MockLatency::instant(), progression);
    let mut polls = 0;

    let outcome = service
        .poll_verification_status(&pack("PACK-2"), |_| polls += 1, 60)
        .await;

    assert_eq!(outcome, Err(VerificationError::Failed));
    assert_eq!(polls, 2);
}

#[tokio::test]
async fn poll_times_out_after_max_attempts() {
    let service = verification_service(MockLatency::instant(), ScriptedProgression::stalled());
    let mut polls = 0;

    let outcome = service
        .poll_verification_status(&pack("PACK-3"), |_| polls += 1, 7)
        .await;

    assert_eq!(outcome, Err(VerificationError::Timeout { attempts: 7 }));
    assert_eq!(polls, 7);
    assert_eq!(
        VerificationError::Timeout { attempts: 7 }.to_string(),
        "Verification timeout after 7 attempts - please try again later"
    );
}

#[tokio::test]
async fn submissions_issue_distinct_identifiers() {
    let service = verification_service(MockLatency::instant(), ScriptedProgression::completing());
    let info = demo_personal_info();
    let application: DisabilityApplication = demo_disability_application();
    let consent = consent_form().validate(chrono::Utc::now()).expect("signed");

    let first = service
        .submit_application(&info, &application, &consent)
        .await
        .expect("accepted");
    let second = service
        .submit_application(&info, &application, &consent)
        .await
        .expect("accepted");

    assert!(first.application_id.0.starts_with("APP-"));
    assert!(first.check_id.0.starts_with("CHK-"));
    assert!(first.pack_id.0.starts_with("PACK-"));
    assert_eq!(first.status, ApplicationStatus::Pending);
    assert_ne!(first.application_id, second.application_id);
    assert_ne!(first.pack_id, second.pack_id);
}

#[tokio::test]
async fn consent_registration_issues_backend_id() {
    let service = verification_service(MockLatency::instant(), ScriptedProgression::completing());
    let consent = consent_form().validate(chrono::Utc::now()).expect("signed");

    let registered = service.submit_consent(consent.clone()).await.expect("registered");
    assert!(registered.consent_id.starts_with("CONSENT-"));
    assert_eq!(registered.electronic_signature, consent.electronic_signature);
}

#[test]
fn seeded_random_progression_is_reproducible() {
    let left = RandomProgression::new(Some(42));
    let right = RandomProgression::new(Some(42));
    let id = pack("PACK-4");

    let a: Vec<_> = (0..50).map(|_| left.sample(&id)).collect();
    let b: Vec<_> = (0..50).map(|_| right.sample(&id)).collect();
    assert_eq!(a, b);
    assert!(a.iter().all(|sample| [
        StatusSample::PENDING,
        StatusSample::PROCESSING,
        StatusSample::COMPLETE
    ]
    .contains(sample)));
}

#[test]
fn random_progression_roughly_follows_weights() {
    let progression = RandomProgression::new(Some(7));
    let id = pack("PACK-5");
    let complete = (0..2_000)
        .filter(|_| progression.sample(&id) == StatusSample::COMPLETE)
        .count();
    assert!((650..=950).contains(&complete), "complete drawn {complete} times");
}

#[test]
fn monotonic_progression_advances_and_forgets_completed_packs() {
    let progression = MonotonicProgression::default();
    let first = pack("PACK-6");
    let second = pack("PACK-7");

    assert_eq!(progression.sample(&first), StatusSample::PENDING);
    assert_eq!(progression.sample(&first), StatusSample::PROCESSING);
    assert_eq!(progression.sample(&second), StatusSample::PENDING);
    assert_eq!(progression.in_flight(), 2);
    assert_eq!(progression.sample(&first), StatusSample::COMPLETE);
    assert_eq!(progression.in_flight(), 1);

    assert_eq!(progression.sample(&second), StatusSample::PROCESSING);
    assert_eq!(progression.sample(&second), StatusSample::COMPLETE);
    assert_eq!(progression.in_flight(), 0);
}

#[test]
fn progress_messages_follow_thresholds() {
    assert_eq!(progress_message(0, ""), "Initiating secure connection...");
    assert_eq!(progress_message(30, ""), "Authenticating with CRA...");
    assert_eq!(progress_message(60, ""), "Retrieving income data...");
    assert_eq!(progress_message(99, ""), "Processing verification...");
    assert_eq!(
        progress_message(100, "Income verification complete"),
        "Income verification complete"
    );
    assert_eq!(progress_message(100, ""), "Verification complete!");
}

#[tokio::test]
async fn cancelled_task_delivers_no_further_callbacks() {
    let service = verification_service(slow_polls(), ScriptedProgression::stalled());
    let polls = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicBool::new(false));

    let counter = polls.clone();
    let done = finished.clone();
    let task = VerificationTask::spawn(
        service,
        pack("PACK-8"),
        1_000,
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
        move |_| done.store(true, Ordering::SeqCst),
    );

    for _ in 0..200 {
        if polls.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(polls.load(Ordering::SeqCst) > 0, "at least one poll observed");

    task.cancel();
    let observed = polls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(polls.load(Ordering::SeqCst), observed);
    assert!(!finished.load(Ordering::SeqCst));
    assert!(task.is_finished());
}

#[tokio::test]
async fn dropping_the_task_stops_polling() {
    let service = verification_service(slow_polls(), ScriptedProgression::stalled());
    let polls = Arc::new(AtomicUsize::new(0));

    let counter = polls.clone();
    let task = VerificationTask::spawn(
        service,
        pack("PACK-9"),
        1_000,
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
        |_| {},
    );
    drop(task);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(polls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn completed_task_hands_result_to_completion_callback() {
    let service = verification_service(MockLatency::instant(), ScriptedProgression::completing());
    let (sender, receiver) = tokio::sync::oneshot::channel();

    let _task = VerificationTask::spawn(service, pack("PACK-10"), 60, |_| {}, move |outcome| {
        let _ = sender.send(outcome);
    });

    let outcome = tokio::time::timeout(Duration::from_secs(1), receiver)
        .await
        .expect("completes in time")
        .expect("sender kept");
    assert_eq!(outcome.map(|result| result.total_income), Ok(DEMO_TOTAL_INCOME));
}
