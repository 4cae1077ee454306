use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::applicant::auth::MockAuthService;
use crate::workflows::applicant::domain::{ApplicationType, PackId, SessionId};
use crate::workflows::applicant::mock::MockLatency;
use crate::workflows::applicant::repository::{
    RepositoryError, SessionRecord, SessionRepository, VerificationPhase, VerificationProgress,
};
use crate::workflows::applicant::service::EligibilityWizardService;
use crate::workflows::applicant::validation::{
    ConsentForm, DisabilityInfoForm, PersonalInfoForm,
};
use crate::workflows::applicant::verification::{
    MockVerificationService, StatusProgression, StatusSample,
};

pub(super) const TEST_MAX_ATTEMPTS: u32 = 10;

/// Plays back a fixed list of samples, then repeats `fallback` forever.
pub(super) struct ScriptedProgression {
    script: Mutex<VecDeque<StatusSample>>,
    fallback: StatusSample,
}

impl ScriptedProgression {
    pub(super) fn new(script: Vec<StatusSample>, fallback: StatusSample) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
        })
    }

    pub(super) fn completing() -> Arc<Self> {
        Self::new(
            vec![StatusSample::PENDING, StatusSample::PROCESSING],
            StatusSample::COMPLETE,
        )
    }

    pub(super) fn stalled() -> Arc<Self> {
        Self::new(Vec::new(), StatusSample::PENDING)
    }
}

impl StatusProgression for ScriptedProgression {
    fn sample(&self, _pack_id: &PackId) -> StatusSample {
        self.script
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

pub(super) fn slow_polls() -> MockLatency {
    MockLatency {
        status_check: Duration::from_millis(20),
        poll_interval: Duration::from_millis(20),
        ..MockLatency::instant()
    }
}

pub(super) fn verification_service(
    latency: MockLatency,
    progression: Arc<dyn StatusProgression>,
) -> Arc<MockVerificationService> {
    Arc::new(MockVerificationService::new(latency, progression))
}

pub(super) fn build_service_with(
    latency: MockLatency,
    progression: Arc<dyn StatusProgression>,
) -> (
    EligibilityWizardService<MemorySessions>,
    Arc<MemorySessions>,
) {
    let sessions = Arc::new(MemorySessions::default());
    let service = EligibilityWizardService::new(
        sessions.clone(),
        MockAuthService::new(MockLatency::instant()),
        verification_service(latency, progression),
        TEST_MAX_ATTEMPTS,
    );
    (service, sessions)
}

pub(super) fn build_service() -> (
    EligibilityWizardService<MemorySessions>,
    Arc<MemorySessions>,
) {
    build_service_with(MockLatency::instant(), ScriptedProgression::completing())
}

#[derive(Default, Clone)]
pub(super) struct MemorySessions {
    pub(super) records: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
}

impl SessionRepository for MemorySessions {
    fn insert(&self, record: SessionRecord) -> Result<SessionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn modify(
        &self,
        id: &SessionId,
        change: &mut dyn FnMut(&mut SessionRecord),
    ) -> Result<SessionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        change(record);
        Ok(record.clone())
    }

    fn remove(&self, id: &SessionId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableSessions;

impl SessionRepository for UnavailableSessions {
    fn insert(&self, _record: SessionRecord) -> Result<SessionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }

    fn modify(
        &self,
        _id: &SessionId,
        _change: &mut dyn FnMut(&mut SessionRecord),
    ) -> Result<SessionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }
}

pub(super) fn personal_info_form() -> PersonalInfoForm {
    PersonalInfoForm {
        first_name: "Amina".to_string(),
        last_name: "Ahmed".to_string(),
        date_of_birth: "1985-03-15".to_string(),
        sin: "123-456-789".to_string(),
        street_address: "123 Government Street".to_string(),
        city: "Victoria".to_string(),
        province: "BC".to_string(),
        postal_code: "V8W 1X4".to_string(),
        phone: "250-555-0123".to_string(),
        email: "amina.ahmed@example.com".to_string(),
    }
}

pub(super) fn disability_info_form() -> DisabilityInfoForm {
    DisabilityInfoForm {
        application_type: Some(ApplicationType::Disability),
        disability_description: "Chronic back condition limiting mobility".to_string(),
        diagnosis_date: "2019-06-01".to_string(),
        limitations: "Cannot stand for more than 20 minutes".to_string(),
        has_physical_disability: true,
        has_mental_health_condition: false,
        requires_assistance: Some(false),
        has_physician: Some(true),
        physician_name: "Dr. Sarah Chen".to_string(),
        physician_phone: "250-555-0199".to_string(),
    }
}

pub(super) fn consent_form() -> ConsentForm {
    ConsentForm {
        agreed: true,
        full_name: "Amina Ahmed".to_string(),
        ip_address: None,
    }
}

/// Session signed in with personal, disability and consent records in place.
pub(super) async fn ready_session(service: &EligibilityWizardService<MemorySessions>) -> SessionId {
    let id = service.open_session().expect("session opens").session_id;
    service.login(&id).await.expect("mock login");
    service
        .submit_personal_info(&id, &personal_info_form())
        .expect("personal info accepted");
    service
        .submit_disability_info(&id, &disability_info_form())
        .expect("disability info accepted");
    service
        .give_consent(&id, &consent_form())
        .await
        .expect("consent accepted");
    id
}

pub(super) async fn wait_for_phase(
    service: &EligibilityWizardService<MemorySessions>,
    id: &SessionId,
    phase: VerificationPhase,
) -> VerificationProgress {
    for _ in 0..500 {
        let view = service.verification_progress(id).expect("session exists");
        if view.progress.phase == phase {
            return view.progress;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("verification never reached {phase:?}");
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
