//! Navigation for the applicant wizard.
//!
//! Every page checks its own preconditions through [`guard`] before a view is built. Step
//! transitions take the session's [`ApplicationStore`] explicitly and return the route the
//! applicant lands on next.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationStatus, ApplicationTracking, Consent, CraVerification, UserProfile, WizardStep,
};
use super::state::{ApplicationState, ApplicationStore};
use super::validation::{
    DisabilityInfoErrors, DisabilityInfoForm, PersonalInfoErrors, PersonalInfoForm,
};
use super::verification::SubmitApplicationResponse;

/// Named application routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    #[serde(rename = "/")]
    Index,
    #[serde(rename = "/landing")]
    Landing,
    #[serde(rename = "/login")]
    Login,
    #[serde(rename = "/personal-info")]
    PersonalInfo,
    #[serde(rename = "/disability-info")]
    DisabilityInfo,
    #[serde(rename = "/consent")]
    Consent,
    #[serde(rename = "/verification")]
    Verification,
    #[serde(rename = "/results")]
    Results,
    #[serde(rename = "/review")]
    Review,
    #[serde(rename = "/confirmation")]
    Confirmation,
    #[serde(rename = "/applications")]
    Applications,
    #[serde(rename = "/caseworker")]
    CaseWorker,
}

impl Route {
    pub const ALL: [Route; 12] = [
        Route::Index,
        Route::Landing,
        Route::Login,
        Route::PersonalInfo,
        Route::DisabilityInfo,
        Route::Consent,
        Route::Verification,
        Route::Results,
        Route::Review,
        Route::Confirmation,
        Route::Applications,
        Route::CaseWorker,
    ];

    pub const fn path(self) -> &'static str {
        match self {
            Route::Index => "/",
            Route::Landing => "/landing",
            Route::Login => "/login",
            Route::PersonalInfo => "/personal-info",
            Route::DisabilityInfo => "/disability-info",
            Route::Consent => "/consent",
            Route::Verification => "/verification",
            Route::Results => "/results",
            Route::Review => "/review",
            Route::Confirmation => "/confirmation",
            Route::Applications => "/applications",
            Route::CaseWorker => "/caseworker",
        }
    }

    /// Accepts paths with or without the leading slash and with a trailing slash.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_matches('/');
        Self::ALL
            .into_iter()
            .find(|route| route.path().trim_start_matches('/') == trimmed)
    }

    pub const fn step(self) -> Option<WizardStep> {
        match self {
            Route::Landing => Some(WizardStep::Landing),
            Route::Login => Some(WizardStep::Login),
            Route::PersonalInfo => Some(WizardStep::PersonalInfo),
            Route::DisabilityInfo => Some(WizardStep::DisabilityInfo),
            Route::Consent => Some(WizardStep::Consent),
            Route::Verification => Some(WizardStep::Verification),
            Route::Results => Some(WizardStep::Results),
            Route::Review => Some(WizardStep::Review),
            Route::Confirmation => Some(WizardStep::Confirmation),
            Route::Index | Route::Applications | Route::CaseWorker => None,
        }
    }
}

impl From<WizardStep> for Route {
    fn from(step: WizardStep) -> Self {
        match step {
            WizardStep::Landing => Route::Landing,
            WizardStep::Login => Route::Login,
            WizardStep::PersonalInfo => Route::PersonalInfo,
            WizardStep::DisabilityInfo => Route::DisabilityInfo,
            WizardStep::Consent => Route::Consent,
            WizardStep::Verification => Route::Verification,
            WizardStep::Results => Route::Results,
            WizardStep::Review => Route::Review,
            WizardStep::Confirmation => Route::Confirmation,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route `{0}`")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s).ok_or_else(|| UnknownRoute(s.to_string()))
    }
}

/// Outcome of a page's entry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "route", rename_all = "kebab-case")]
pub enum RouteDecision {
    Allow,
    Redirect(Route),
}

/// Entry precondition for `route` against the current session state.
///
/// A signed-out session is sent to login first; a signed-in one missing the page's records
/// goes back to personal info.
pub fn guard(route: Route, state: &ApplicationState) -> RouteDecision {
    match route {
        Route::Review | Route::Confirmation if state.user.is_none() => {
            RouteDecision::Redirect(Route::Login)
        }
        Route::Review if !state.ready_for_review() => RouteDecision::Redirect(Route::PersonalInfo),
        Route::Confirmation if state.tracking.is_none() || state.personal_info.is_none() => {
            RouteDecision::Redirect(Route::PersonalInfo)
        }
        _ => RouteDecision::Allow,
    }
}

fn enter(store: &mut ApplicationStore, route: Route) -> Route {
    if let Some(step) = route.step() {
        store.set_current_step(step);
    }
    route
}

/// Landing "get started": the applicant moves on to sign-in.
pub fn start_application(store: &mut ApplicationStore) -> Route {
    enter(store, Route::Login)
}

pub fn complete_login(store: &mut ApplicationStore, profile: UserProfile) -> Route {
    store.set_user(Some(profile));
    enter(store, Route::PersonalInfo)
}

pub fn submit_personal_info(
    store: &mut ApplicationStore,
    form: &PersonalInfoForm,
) -> Result<Route, PersonalInfoErrors> {
    let info = form.validate()?;
    store.set_personal_info(info);
    Ok(enter(store, Route::DisabilityInfo))
}

pub fn submit_disability_info(
    store: &mut ApplicationStore,
    form: &DisabilityInfoForm,
) -> Result<Route, DisabilityInfoErrors> {
    let application = form.validate()?;
    store.set_disability_application(application);
    Ok(enter(store, Route::Consent))
}

/// Store a consent that has already passed validation.
pub fn record_consent(store: &mut ApplicationStore, consent: Consent) -> Route {
    store.set_consent(consent);
    enter(store, Route::Verification)
}

/// Tracking record for a freshly accepted application.
pub fn record_submission(
    store: &mut ApplicationStore,
    response: &SubmitApplicationResponse,
    submitted_at: DateTime<Utc>,
) -> ApplicationTracking {
    let tracking = ApplicationTracking {
        application_id: response.application_id.clone(),
        check_id: response.check_id.clone(),
        pack_id: response.pack_id.clone(),
        status: response.status,
        submitted_at,
        completed_at: None,
        estimated_completion_time: Some(response.estimated_completion_time),
    };
    store.set_tracking(tracking.clone());
    store.set_current_step(WizardStep::Verification);
    tracking
}

pub fn record_progress(store: &mut ApplicationStore, status: ApplicationStatus) {
    store.update_tracking_status(status);
}

pub fn record_verification(
    store: &mut ApplicationStore,
    verification: CraVerification,
    completed_at: DateTime<Utc>,
) -> Route {
    store.set_cra_verification(verification);
    store.update_tracking_status(ApplicationStatus::Complete);
    if let Some(mut tracking) = store.state().tracking.clone() {
        tracking.completed_at = Some(completed_at);
        store.set_tracking(tracking);
    }
    enter(store, Route::Results)
}

pub fn record_failure(store: &mut ApplicationStore) {
    store.update_tracking_status(ApplicationStatus::Failed);
}

/// Submit from the review page. Guarded like the review page itself.
pub fn confirm_review(store: &mut ApplicationStore) -> Result<Route, Route> {
    match guard(Route::Review, store.state()) {
        RouteDecision::Allow => Ok(enter(store, Route::Confirmation)),
        RouteDecision::Redirect(route) => Err(route),
    }
}

/// Step back one page. Never guarded and never clears data.
pub fn go_back(store: &mut ApplicationStore) -> Route {
    match store.state().current_step.previous() {
        Some(step) => enter(store, Route::from(step)),
        None => Route::Index,
    }
}

/// "Start a new application": everything is cleared, including the user.
pub fn start_over(store: &mut ApplicationStore) -> Route {
    store.reset();
    Route::Index
}

/// Whole dollars as Canadian currency, e.g. `$28,500.00`.
pub fn format_cad(amount: u64) -> String {
    format!("${}.00", group_thousands(amount))
}

pub fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn calendar_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// Results page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ResultsView {
    Verified(VerifiedResults),
    NoVerificationData {
        title: &'static str,
        message: &'static str,
        retry_route: Route,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedResults {
    pub tax_year: u16,
    pub verification_date: String,
    pub total_income: String,
    pub employment_income: String,
    pub income_eligibility: &'static str,
    pub threshold_met: &'static str,
    pub additional_factors: Vec<String>,
    pub next_route: Route,
}

impl ResultsView {
    pub fn build(state: &ApplicationState) -> Self {
        match &state.cra_verification {
            Some(verification) => ResultsView::Verified(VerifiedResults {
                tax_year: verification.tax_year,
                verification_date: verification
                    .verified_at
                    .map(calendar_date)
                    .unwrap_or_else(|| "N/A".to_string()),
                total_income: format_cad(verification.total_income),
                employment_income: format_cad(verification.employment_income),
                income_eligibility: yes_no(verification.factors.income_eligibility),
                threshold_met: yes_no(verification.factors.threshold_met),
                additional_factors: verification.factors.additional_factors.clone(),
                next_route: Route::Review,
            }),
            None => ResultsView::NoVerificationData {
                title: "No Verification Data",
                message: "No verification data is available. Please complete the verification process first.",
                retry_route: Route::Verification,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub personal: ReviewPersonal,
    pub disability: ReviewDisability,
    pub income: ReviewIncome,
    pub consent: ReviewConsent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewPersonal {
    pub name: String,
    pub date_of_birth: String,
    pub sin: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewDisability {
    pub physical_disability: &'static str,
    pub mental_health_condition: &'static str,
    pub requires_assistance: &'static str,
    pub medical_documentation: &'static str,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewIncome {
    pub tax_year: u16,
    pub total_income: u64,
    pub total_income_display: String,
    pub employment_income_display: String,
    pub eligibility_status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewConsent {
    pub cra_data_access: &'static str,
    pub electronic_signature: String,
    pub date: String,
}

impl ReviewSummary {
    /// Build the review page, or the redirect its guard demands.
    pub fn build(state: &ApplicationState) -> Result<Self, Route> {
        if let RouteDecision::Redirect(route) = guard(Route::Review, state) {
            return Err(route);
        }
        let (Some(info), Some(disability), Some(consent), Some(verification)) = (
            &state.personal_info,
            &state.disability_application,
            &state.consent,
            &state.cra_verification,
        ) else {
            return Err(Route::PersonalInfo);
        };

        Ok(Self {
            personal: ReviewPersonal {
                name: format!("{} {}", info.first_name, info.last_name),
                date_of_birth: info.date_of_birth.clone(),
                sin: info.sin.clone(),
                phone: info.phone_number.clone(),
                email: info.email.clone(),
                address: format!(
                    "{}, {}, {} {}",
                    info.address.street_address,
                    info.address.city,
                    info.address.province,
                    info.address.postal_code
                ),
            },
            disability: ReviewDisability {
                physical_disability: yes_no(disability.has_physical_disability),
                mental_health_condition: yes_no(disability.has_mental_health_condition),
                requires_assistance: yes_no(disability.requires_assistance),
                medical_documentation: if disability.medical_documentation {
                    "Available"
                } else {
                    "Not Available"
                },
                description: disability.disability_description.clone(),
            },
            income: ReviewIncome {
                tax_year: verification.tax_year,
                total_income: verification.total_income,
                total_income_display: format!("${}", group_thousands(verification.total_income)),
                employment_income_display: format!(
                    "${}",
                    group_thousands(verification.employment_income)
                ),
                eligibility_status: if verification.factors.income_eligibility {
                    "Eligible"
                } else {
                    "Review Required"
                },
            },
            consent: ReviewConsent {
                cra_data_access: if consent.cra_data_access {
                    "Authorized"
                } else {
                    "Not Authorized"
                },
                electronic_signature: consent.electronic_signature.clone(),
                date: calendar_date(consent.timestamp),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationView {
    pub first_name: String,
    pub email: String,
    pub application_id: String,
    pub check_id: String,
    pub submission_date: String,
    pub submission_time: String,
}

impl ConfirmationView {
    pub fn build(state: &ApplicationState) -> Result<Self, Route> {
        if let RouteDecision::Redirect(route) = guard(Route::Confirmation, state) {
            return Err(route);
        }
        let (Some(tracking), Some(info)) = (&state.tracking, &state.personal_info) else {
            return Err(Route::PersonalInfo);
        };

        Ok(Self {
            first_name: info.first_name.clone(),
            email: info.email.clone(),
            application_id: tracking.application_id.0.clone(),
            check_id: tracking.check_id.0.clone(),
            submission_date: calendar_date(tracking.submitted_at),
            submission_time: tracking.submitted_at.format("%H:%M:%S").to_string(),
        })
    }
}
