use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::auth::MockAuthService;
use super::domain::{ApplicationTracking, CraVerification, SessionId, UserProfile, UserSession};
use super::mock::{MockLatency, ServiceError};
use super::repository::{
    RepositoryError, SessionRecord, SessionRepository, VerificationPhase, VerificationProgress,
};
use super::state::ApplicationState;
use super::validation::{
    ConsentErrors, ConsentForm, DisabilityInfoErrors, DisabilityInfoForm, PersonalInfoErrors,
    PersonalInfoForm,
};
use super::verification::{
    MockVerificationService, VerificationError, VerificationStatusResponse, VerificationTask,
};
use super::wizard::{self, ConfirmationView, ResultsView, ReviewSummary, Route, RouteDecision};
use crate::config::MockConfig;

/// Full view of one session for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub state: ApplicationState,
    pub verification: VerificationProgress,
}

impl From<SessionRecord> for SessionSnapshot {
    fn from(record: SessionRecord) -> Self {
        Self {
            session_id: record.id,
            state: record.store.state().clone(),
            verification: record.verification,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub profile: UserProfile,
    pub session: UserSession,
    pub next: Route,
}

/// Verification page content: live progress plus where to go next.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationView {
    #[serde(flatten)]
    pub progress: VerificationProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<ApplicationTracking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_route: Option<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_route: Option<Route>,
}

/// Drives the applicant wizard for many independent sessions.
pub struct EligibilityWizardService<R> {
    sessions: Arc<R>,
    auth: MockAuthService,
    verification: Arc<MockVerificationService>,
    tasks: Mutex<HashMap<SessionId, VerificationTask>>,
    max_attempts: u32,
}

impl<R> EligibilityWizardService<R>
where
    R: SessionRepository + 'static,
{
    pub fn new(
        sessions: Arc<R>,
        auth: MockAuthService,
        verification: Arc<MockVerificationService>,
        max_attempts: u32,
    ) -> Self {
        Self {
            sessions,
            auth,
            verification,
            tasks: Mutex::new(HashMap::new()),
            max_attempts,
        }
    }

    pub fn from_config(sessions: Arc<R>, config: &MockConfig) -> Self {
        Self::new(
            sessions,
            MockAuthService::new(MockLatency::from(config.latency)),
            Arc::new(MockVerificationService::from_config(config)),
            config.poll_max_attempts,
        )
    }

    /// Task map with finished poll loops already dropped.
    fn tasks(&self) -> MutexGuard<'_, HashMap<SessionId, VerificationTask>> {
        let mut tasks = match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tasks.retain(|_, task| !task.is_finished());
        tasks
    }

    #[cfg(test)]
    pub(crate) fn running_verifications(&self) -> usize {
        self.tasks().len()
    }

    fn record(&self, id: &SessionId) -> Result<SessionRecord, WizardServiceError> {
        Ok(self.sessions.fetch(id)?.ok_or(RepositoryError::NotFound)?)
    }

    fn stop_task(&self, id: &SessionId) {
        if let Some(task) = self.tasks().remove(id) {
            task.cancel();
        }
    }

    /// New session on the landing page.
    pub fn open_session(&self) -> Result<SessionSnapshot, WizardServiceError> {
        let record = self.sessions.insert(SessionRecord::new(SessionId::generate()))?;
        info!(session_id = %record.id, "applicant session opened");
        Ok(record.into())
    }

    pub fn snapshot(&self, id: &SessionId) -> Result<SessionSnapshot, WizardServiceError> {
        Ok(self.record(id)?.into())
    }

    pub fn start_application(&self, id: &SessionId) -> Result<Route, WizardServiceError> {
        let mut next = Route::Login;
        self.sessions
            .modify(id, &mut |record| next = wizard::start_application(&mut record.store))?;
        Ok(next)
    }

    pub async fn login(&self, id: &SessionId) -> Result<LoginOutcome, WizardServiceError> {
        self.record(id)?;
        let sign_in = self.auth.login_with_bc_services_card(None).await?;

        let mut next = Route::PersonalInfo;
        self.sessions.modify(id, &mut |record| {
            record.session = Some(sign_in.session.clone());
            next = wizard::complete_login(&mut record.store, sign_in.profile.clone());
        })?;

        Ok(LoginOutcome {
            profile: sign_in.profile,
            session: sign_in.session,
            next,
        })
    }

    /// Entry check for a page; nothing is written.
    pub fn navigate(
        &self,
        id: &SessionId,
        route: Route,
    ) -> Result<RouteDecision, WizardServiceError> {
        let record = self.record(id)?;
        Ok(wizard::guard(route, record.store.state()))
    }

    pub fn personal_info_form(
        &self,
        id: &SessionId,
    ) -> Result<PersonalInfoForm, WizardServiceError> {
        let record = self.record(id)?;
        Ok(PersonalInfoForm::prefilled(record.store.user()))
    }

    pub fn submit_personal_info(
        &self,
        id: &SessionId,
        form: &PersonalInfoForm,
    ) -> Result<Route, WizardServiceError> {
        let mut outcome = Ok(Route::DisabilityInfo);
        self.sessions.modify(id, &mut |record| {
            outcome = wizard::submit_personal_info(&mut record.store, form);
        })?;
        outcome.map_err(WizardServiceError::PersonalInfo)
    }

    pub fn submit_disability_info(
        &self,
        id: &SessionId,
        form: &DisabilityInfoForm,
    ) -> Result<Route, WizardServiceError> {
        let mut outcome = Ok(Route::Consent);
        self.sessions.modify(id, &mut |record| {
            outcome = wizard::submit_disability_info(&mut record.store, form);
        })?;
        outcome.map_err(WizardServiceError::DisabilityInfo)
    }

    /// Validate the signature, register the consent with the backend and store it.
    pub async fn give_consent(
        &self,
        id: &SessionId,
        form: &ConsentForm,
    ) -> Result<Route, WizardServiceError> {
        self.record(id)?;
        let consent = form
            .validate(Utc::now())
            .map_err(WizardServiceError::Consent)?;
        let consent = self.verification.submit_consent(consent).await?;

        let mut next = Route::Verification;
        self.sessions.modify(id, &mut |record| {
            next = wizard::record_consent(&mut record.store, consent.clone());
        })?;
        Ok(next)
    }

    /// Submit the application and start polling in the background.
    ///
    /// Any earlier attempt for the session is cancelled first.
    pub async fn start_verification(
        &self,
        id: &SessionId,
    ) -> Result<ApplicationTracking, WizardServiceError> {
        let record = self.record(id)?;
        let state = record.store.state();
        let (Some(personal), Some(disability), Some(consent)) = (
            state.personal_info.clone(),
            state.disability_application.clone(),
            state.consent.clone(),
        ) else {
            return Err(WizardServiceError::MissingApplicationData);
        };

        self.stop_task(id);
        let attempt = self
            .sessions
            .modify(id, &mut |record| {
                record.verification =
                    VerificationProgress::starting(record.verification.attempt + 1);
            })?
            .verification
            .attempt;

        let response = match self
            .verification
            .submit_application(&personal, &disability, &consent)
            .await
        {
            Ok(response) => response,
            Err(error) => {
                self.sessions.modify(id, &mut |record| {
                    if record.verification.accepts(attempt) {
                        record.verification.fail("Failed to submit application");
                    }
                })?;
                return Err(error.into());
            }
        };

        let submitted_at = Utc::now();
        let mut tracking = None;
        self.sessions.modify(id, &mut |record| {
            if record.verification.accepts(attempt) {
                tracking = Some(wizard::record_submission(
                    &mut record.store,
                    &response,
                    submitted_at,
                ));
                record.verification.phase = VerificationPhase::Polling;
            }
        })?;
        let tracking = tracking.ok_or(WizardServiceError::Superseded)?;

        let task = VerificationTask::spawn(
            self.verification.clone(),
            response.pack_id.clone(),
            self.max_attempts,
            progress_writer(self.sessions.clone(), id.clone(), attempt),
            completion_writer(self.sessions.clone(), id.clone(), attempt),
        );
        if let Some(previous) = self.tasks().insert(id.clone(), task) {
            previous.cancel();
        }

        Ok(tracking)
    }

    pub fn verification_progress(
        &self,
        id: &SessionId,
    ) -> Result<VerificationView, WizardServiceError> {
        let record = self.record(id)?;
        if !record.verification.phase.is_active() {
            drop(self.tasks());
        }
        let (next_route, retry_route) = match record.verification.phase {
            VerificationPhase::Complete => (Some(Route::Results), None),
            VerificationPhase::Failed => (None, Some(Route::Consent)),
            _ => (None, None),
        };
        Ok(VerificationView {
            tracking: record.store.state().tracking.clone(),
            progress: record.verification,
            next_route,
            retry_route,
        })
    }

    /// Leave the verification page: polling stops and late results are dropped.
    pub fn cancel_verification(
        &self,
        id: &SessionId,
    ) -> Result<VerificationProgress, WizardServiceError> {
        self.stop_task(id);
        let record = self
            .sessions
            .modify(id, &mut |record| record.verification.cancel())?;
        Ok(record.verification)
    }

    pub fn results(&self, id: &SessionId) -> Result<ResultsView, WizardServiceError> {
        let record = self.record(id)?;
        Ok(ResultsView::build(record.store.state()))
    }

    pub fn review(&self, id: &SessionId) -> Result<ReviewSummary, WizardServiceError> {
        let record = self.record(id)?;
        ReviewSummary::build(record.store.state()).map_err(WizardServiceError::Redirect)
    }

    pub fn submit_review(&self, id: &SessionId) -> Result<Route, WizardServiceError> {
        let mut outcome = Err(Route::PersonalInfo);
        self.sessions.modify(id, &mut |record| {
            outcome = wizard::confirm_review(&mut record.store);
        })?;
        let route = outcome.map_err(WizardServiceError::Redirect)?;
        info!(session_id = %id, "application submitted from review");
        Ok(route)
    }

    pub fn confirmation(&self, id: &SessionId) -> Result<ConfirmationView, WizardServiceError> {
        let record = self.record(id)?;
        ConfirmationView::build(record.store.state()).map_err(WizardServiceError::Redirect)
    }

    pub fn go_back(&self, id: &SessionId) -> Result<Route, WizardServiceError> {
        let mut route = Route::Index;
        self.sessions
            .modify(id, &mut |record| route = wizard::go_back(&mut record.store))?;
        Ok(route)
    }

    /// Clear the application and the signed-in user, stopping any verification in flight.
    pub fn reset(&self, id: &SessionId) -> Result<Route, WizardServiceError> {
        self.stop_task(id);
        let mut route = Route::Index;
        self.sessions.modify(id, &mut |record| {
            route = wizard::start_over(&mut record.store);
            record.session = None;
            record.verification = VerificationProgress {
                attempt: record.verification.attempt + 1,
                ..VerificationProgress::default()
            };
        })?;
        info!(session_id = %id, "application reset");
        Ok(route)
    }

    /// Drop the session and anything it is running.
    pub fn close_session(&self, id: &SessionId) -> Result<(), WizardServiceError> {
        self.stop_task(id);
        self.sessions.remove(id)?;
        Ok(())
    }
}

fn progress_writer<R>(
    sessions: Arc<R>,
    id: SessionId,
    attempt: u64,
) -> impl FnMut(&VerificationStatusResponse) + Send + 'static
where
    R: SessionRepository + 'static,
{
    move |status: &VerificationStatusResponse| {
        let applied = sessions.modify(&id, &mut |record| {
            if record.verification.accepts(attempt) {
                record.verification.observe(status);
                wizard::record_progress(&mut record.store, status.status);
            }
        });
        if let Err(error) = applied {
            warn!(session_id = %id, %error, "dropping verification progress");
        }
    }
}

fn completion_writer<R>(
    sessions: Arc<R>,
    id: SessionId,
    attempt: u64,
) -> impl FnOnce(Result<CraVerification, VerificationError>) + Send + 'static
where
    R: SessionRepository + 'static,
{
    move |outcome: Result<CraVerification, VerificationError>| {
        let mut outcome = Some(outcome);
        let applied = sessions.modify(&id, &mut |record| {
            if !record.verification.accepts(attempt) {
                return;
            }
            match outcome.take() {
                Some(Ok(verification)) => {
                    wizard::record_verification(&mut record.store, verification, Utc::now());
                    record.verification.complete();
                }
                Some(Err(error)) => {
                    if error == VerificationError::Failed {
                        wizard::record_failure(&mut record.store);
                    }
                    record.verification.fail(error.to_string());
                }
                None => {}
            }
        });
        if let Err(error) = applied {
            warn!(session_id = %id, %error, "dropping verification outcome");
        }
    }
}

/// Error raised by the wizard service.
#[derive(Debug, thiserror::Error)]
pub enum WizardServiceError {
    #[error("personal information is incomplete or invalid")]
    PersonalInfo(PersonalInfoErrors),
    #[error("disability information is incomplete or invalid")]
    DisabilityInfo(DisabilityInfoErrors),
    #[error("consent is incomplete")]
    Consent(ConsentErrors),
    #[error("redirect to {0}")]
    Redirect(Route),
    #[error("Missing required application data")]
    MissingApplicationData,
    #[error("verification attempt was cancelled")]
    Superseded,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
