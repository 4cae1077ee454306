use super::common::*;
use chrono::Utc;

use crate::workflows::applicant::domain::{
    ApplicationId, ApplicationStatus, CheckId, PackId, WizardStep,
};
use crate::workflows::applicant::fixtures::{demo_cra_verification, demo_user};
use crate::workflows::applicant::state::{ApplicationState, ApplicationStore};
use crate::workflows::applicant::verification::SubmitApplicationResponse;
use crate::workflows::applicant::wizard::{
    self, guard, ConfirmationView, ResultsView, ReviewSummary, Route, RouteDecision,
};

fn submission() -> SubmitApplicationResponse {
    let now = Utc::now();
    SubmitApplicationResponse {
        application_id: ApplicationId("APP-2025-1730000000000".to_string()),
        check_id: CheckId("CHK-1730000000000".to_string()),
        pack_id: PackId("PACK-1730000000000".to_string()),
        status: ApplicationStatus::Pending,
        estimated_completion_time: now,
    }
}

/// Store walked through every step up to a completed verification.
fn verified_store() -> ApplicationStore {
    let mut store = ApplicationStore::new();
    wizard::complete_login(&mut store, demo_user());
    wizard::submit_personal_info(&mut store, &personal_info_form()).expect("valid");
    wizard::submit_disability_info(&mut store, &disability_info_form()).expect("valid");
    let consent = consent_form().validate(Utc::now()).expect("signed");
    wizard::record_consent(&mut store, consent);
    wizard::record_submission(&mut store, &submission(), Utc::now());
    wizard::record_verification(&mut store, demo_cra_verification(), Utc::now());
    store
}

#[test]
fn confirmation_without_tracking_redirects_to_personal_info() {
    let empty = ApplicationState::default();
    assert_eq!(
        guard(Route::Confirmation, &empty),
        RouteDecision::Redirect(Route::Login)
    );

    let mut store = ApplicationStore::new();
    wizard::complete_login(&mut store, demo_user());
    assert_eq!(
        guard(Route::Confirmation, store.state()),
        RouteDecision::Redirect(Route::PersonalInfo)
    );
    assert_eq!(
        ConfirmationView::build(store.state()),
        Err(Route::PersonalInfo)
    );
}

#[test]
fn signed_out_session_with_records_is_sent_to_login() {
    let mut store = verified_store();
    store.set_user(None);

    assert_eq!(
        guard(Route::Review, store.state()),
        RouteDecision::Redirect(Route::Login)
    );
    assert_eq!(
        guard(Route::Confirmation, store.state()),
        RouteDecision::Redirect(Route::Login)
    );
}

#[test]
fn signed_out_session_goes_to_login_before_missing_records() {
    let empty = ApplicationState::default();
    assert_eq!(
        guard(Route::Review, &empty),
        RouteDecision::Redirect(Route::Login)
    );
    assert_eq!(ConfirmationView::build(&empty), Err(Route::Login));

    let mut store = ApplicationStore::new();
    wizard::submit_personal_info(&mut store, &personal_info_form()).expect("valid");
    assert_eq!(
        guard(Route::Review, store.state()),
        RouteDecision::Redirect(Route::Login)
    );
}

#[test]
fn review_requires_every_record() {
    let mut store = ApplicationStore::new();
    wizard::complete_login(&mut store, demo_user());
    wizard::submit_personal_info(&mut store, &personal_info_form()).expect("valid");

    assert_eq!(
        guard(Route::Review, store.state()),
        RouteDecision::Redirect(Route::PersonalInfo)
    );
    assert_eq!(guard(Route::Review, verified_store().state()), RouteDecision::Allow);
}

#[test]
fn unguarded_routes_always_allow() {
    let empty = ApplicationState::default();
    for route in Route::ALL {
        if matches!(route, Route::Review | Route::Confirmation) {
            continue;
        }
        assert_eq!(guard(route, &empty), RouteDecision::Allow, "{route}");
    }
}

#[test]
fn rejected_step_writes_nothing() {
    let mut store = ApplicationStore::new();
    wizard::complete_login(&mut store, demo_user());
    let before = store.clone();

    let mut form = personal_info_form();
    form.email = "not-an-email".to_string();
    let errors = wizard::submit_personal_info(&mut store, &form).expect_err("invalid email");

    assert_eq!(errors.email, Some("Invalid email format"));
    assert_eq!(store, before);
}

#[test]
fn accepted_steps_write_and_advance() {
    let mut store = ApplicationStore::new();
    assert_eq!(wizard::start_application(&mut store), Route::Login);
    assert_eq!(wizard::complete_login(&mut store, demo_user()), Route::PersonalInfo);
    assert_eq!(
        wizard::submit_personal_info(&mut store, &personal_info_form()),
        Ok(Route::DisabilityInfo)
    );
    assert_eq!(store.state().current_step, WizardStep::DisabilityInfo);
    assert_eq!(
        wizard::submit_disability_info(&mut store, &disability_info_form()),
        Ok(Route::Consent)
    );
    assert!(store.state().disability_application.is_some());
}

#[test]
fn verification_completion_updates_tracking() {
    let store = verified_store();
    let tracking = store.state().tracking.as_ref().expect("tracking recorded");

    assert_eq!(tracking.status, ApplicationStatus::Complete);
    assert!(tracking.completed_at.is_some());
    assert_eq!(store.state().current_step, WizardStep::Results);
}

#[test]
fn results_view_formats_income_or_reports_missing_data() {
    match ResultsView::build(verified_store().state()) {
        ResultsView::Verified(results) => {
            assert_eq!(results.total_income, "$28,500.00");
            assert_eq!(results.employment_income, "$28,500.00");
            assert_eq!(results.income_eligibility, "Yes");
            assert_eq!(results.tax_year, 2024);
            assert_eq!(results.verification_date, "N/A");
            assert_eq!(results.next_route, Route::Review);
        }
        other => panic!("expected verified results, got {other:?}"),
    }

    match ResultsView::build(&ApplicationState::default()) {
        ResultsView::NoVerificationData {
            title, retry_route, ..
        } => {
            assert_eq!(title, "No Verification Data");
            assert_eq!(retry_route, Route::Verification);
        }
        other => panic!("expected missing data view, got {other:?}"),
    }
}

#[test]
fn review_summary_shows_verified_income() {
    let summary = ReviewSummary::build(verified_store().state()).expect("review allowed");

    assert_eq!(summary.personal.name, "Amina Ahmed");
    assert_eq!(
        summary.personal.address,
        "123 Government Street, Victoria, BC V8W 1X4"
    );
    assert_eq!(summary.income.total_income, 28_500);
    assert_eq!(summary.income.total_income_display, "$28,500");
    assert_eq!(summary.income.eligibility_status, "Eligible");
    assert_eq!(summary.disability.medical_documentation, "Available");
    assert_eq!(summary.consent.cra_data_access, "Authorized");
}

#[test]
fn confirm_review_moves_to_confirmation() {
    let mut store = verified_store();
    assert_eq!(wizard::confirm_review(&mut store), Ok(Route::Confirmation));

    let view = ConfirmationView::build(store.state()).expect("confirmation allowed");
    assert_eq!(view.application_id, "APP-2025-1730000000000");
    assert_eq!(view.check_id, "CHK-1730000000000");
    assert_eq!(view.first_name, "Amina");

    let mut incomplete = ApplicationStore::new();
    wizard::complete_login(&mut incomplete, demo_user());
    assert_eq!(
        wizard::confirm_review(&mut incomplete),
        Err(Route::PersonalInfo)
    );
}

#[test]
fn start_over_clears_everything_including_user() {
    let mut store = verified_store();
    assert_eq!(wizard::start_over(&mut store), Route::Index);
    assert_eq!(store, ApplicationStore::new());
}
