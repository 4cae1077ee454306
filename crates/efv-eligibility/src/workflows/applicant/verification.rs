//! Simulated CRA income verification.
//!
//! Submitting an application issues identifiers; the verification pack is then polled until
//! a status check reports `complete` or `failed`, or the attempt cap runs out. How each status
//! check answers is decided by a [`StatusProgression`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::domain::{
    ApplicationId, ApplicationStatus, CheckId, Consent, CraVerification, DisabilityApplication,
    PackId, PersonalInfo,
};
use super::fixtures::demo_cra_verification;
use super::mock::{next_stamp, simulate, MockLatency, ServiceError};
use crate::config::{MockConfig, StatusMode};

const ESTIMATED_COMPLETION_SECS: i64 = 5;

/// Identifiers issued when an application is accepted for verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitApplicationResponse {
    pub application_id: ApplicationId,
    pub check_id: CheckId,
    pub pack_id: PackId,
    pub status: ApplicationStatus,
    pub estimated_completion_time: DateTime<Utc>,
}

/// One answer from the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationStatusResponse {
    pub pack_id: PackId,
    pub status: ApplicationStatus,
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CraVerification>,
}

/// Status reported by a single check, before the fixture result is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSample {
    pub status: ApplicationStatus,
    pub progress: u8,
    pub message: &'static str,
}

impl StatusSample {
    pub const PENDING: StatusSample = StatusSample {
        status: ApplicationStatus::Pending,
        progress: 30,
        message: "Contacting CRA for income verification...",
    };
    pub const PROCESSING: StatusSample = StatusSample {
        status: ApplicationStatus::Processing,
        progress: 60,
        message: "Receiving data from CRA...",
    };
    pub const COMPLETE: StatusSample = StatusSample {
        status: ApplicationStatus::Complete,
        progress: 100,
        message: "Income verification complete",
    };
    pub const FAILED: StatusSample = StatusSample {
        status: ApplicationStatus::Failed,
        progress: 100,
        message: "Verification failed",
    };
}

/// Decides what each status check reports for a pack.
pub trait StatusProgression: Send + Sync {
    fn sample(&self, pack_id: &PackId) -> StatusSample;
}

/// Independent weighted draw per check: 30% pending, 30% processing, 40% complete.
///
/// Successive checks of the same pack can regress or jump straight to completion.
pub struct RandomProgression {
    rng: Mutex<StdRng>,
}

const RANDOM_TABLE: [(f64, StatusSample); 3] = [
    (0.3, StatusSample::PENDING),
    (0.6, StatusSample::PROCESSING),
    (1.0, StatusSample::COMPLETE),
];

impl RandomProgression {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn pick(roll: f64) -> StatusSample {
        RANDOM_TABLE
            .iter()
            .find(|(threshold, _)| roll < *threshold)
            .map(|(_, sample)| *sample)
            .unwrap_or(StatusSample::COMPLETE)
    }
}

impl StatusProgression for RandomProgression {
    fn sample(&self, _pack_id: &PackId) -> StatusSample {
        let roll: f64 = match self.rng.lock() {
            Ok(mut rng) => rng.gen(),
            Err(poisoned) => poisoned.into_inner().gen(),
        };
        Self::pick(roll)
    }
}

/// Per-pack counter: pending, then processing, then complete.
///
/// A pack's counter is dropped once it reports complete, so the map only holds packs
/// still in flight.
#[derive(Default)]
pub struct MonotonicProgression {
    checks: Mutex<HashMap<PackId, usize>>,
}

const MONOTONIC_STAGES: [StatusSample; 3] = [
    StatusSample::PENDING,
    StatusSample::PROCESSING,
    StatusSample::COMPLETE,
];

impl MonotonicProgression {
    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        match self.checks.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl StatusProgression for MonotonicProgression {
    fn sample(&self, pack_id: &PackId) -> StatusSample {
        let mut checks = match self.checks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let stage = checks.get(pack_id).copied().unwrap_or(0);
        let sample = MONOTONIC_STAGES[stage.min(MONOTONIC_STAGES.len() - 1)];
        if sample.status == ApplicationStatus::Complete {
            checks.remove(pack_id);
        } else {
            checks.insert(pack_id.clone(), stage + 1);
        }
        sample
    }
}

/// Applicant-facing message for a progress value.
pub fn progress_message(progress: u8, fallback: &str) -> String {
    match progress {
        0..=25 => "Initiating secure connection...".to_string(),
        26..=50 => "Authenticating with CRA...".to_string(),
        51..=75 => "Retrieving income data...".to_string(),
        76..=99 => "Processing verification...".to_string(),
        _ if fallback.is_empty() => "Verification complete!".to_string(),
        _ => fallback.to_string(),
    }
}

/// Why a poll loop ended without a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("Verification failed")]
    Failed,
    #[error("Verification timeout after {attempts} attempts - please try again later")]
    Timeout { attempts: u32 },
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Simulated EFV backend fronting the CRA lookup.
pub struct MockVerificationService {
    latency: MockLatency,
    progression: Arc<dyn StatusProgression>,
}

impl MockVerificationService {
    pub fn new(latency: MockLatency, progression: Arc<dyn StatusProgression>) -> Self {
        Self {
            latency,
            progression,
        }
    }

    pub fn from_config(config: &MockConfig) -> Self {
        let progression: Arc<dyn StatusProgression> = match config.status_mode {
            StatusMode::Random => Arc::new(RandomProgression::new(config.status_seed)),
            StatusMode::Monotonic => Arc::new(MonotonicProgression::default()),
        };
        Self::new(MockLatency::from(config.latency), progression)
    }

    pub fn latency(&self) -> MockLatency {
        self.latency
    }

    /// Register a signed consent, issuing its backend identifier and timestamp.
    pub async fn submit_consent(&self, consent: Consent) -> Result<Consent, ServiceError> {
        simulate(self.latency.consent).await;
        let stamp = next_stamp();
        Ok(Consent {
            consent_id: format!("CONSENT-{stamp}"),
            timestamp: DateTime::from_timestamp_millis(stamp).unwrap_or_else(Utc::now),
            ..consent
        })
    }

    /// Accept an application for verification. The record contents are not inspected.
    pub async fn submit_application(
        &self,
        _personal_info: &PersonalInfo,
        _disability_application: &DisabilityApplication,
        _consent: &Consent,
    ) -> Result<SubmitApplicationResponse, ServiceError> {
        simulate(self.latency.submit).await;

        let stamp = next_stamp();
        let submitted = DateTime::from_timestamp_millis(stamp).unwrap_or_else(Utc::now);
        let response = SubmitApplicationResponse {
            application_id: ApplicationId(format!("APP-{}-{stamp}", submitted.year())),
            check_id: CheckId(format!("CHK-{stamp}")),
            pack_id: PackId(format!("PACK-{stamp}")),
            status: ApplicationStatus::Pending,
            estimated_completion_time: submitted
                + ChronoDuration::seconds(ESTIMATED_COMPLETION_SECS),
        };
        info!(
            application_id = %response.application_id.0,
            pack_id = %response.pack_id,
            "application submitted; income verification in progress"
        );
        Ok(response)
    }

    /// One status check. Not idempotent under the random progression.
    pub async fn check_verification_status(
        &self,
        pack_id: &PackId,
    ) -> Result<VerificationStatusResponse, ServiceError> {
        simulate(self.latency.status_check).await;

        let sample = self.progression.sample(pack_id);
        let result = (sample.status == ApplicationStatus::Complete).then(|| CraVerification {
            verified_at: Some(Utc::now()),
            ..demo_cra_verification()
        });
        debug!(%pack_id, status = sample.status.label(), progress = sample.progress, "status check");

        Ok(VerificationStatusResponse {
            pack_id: pack_id.clone(),
            status: sample.status,
            progress: sample.progress,
            message: sample.message.to_string(),
            result,
        })
    }

    pub async fn get_verification_results(
        &self,
        _pack_id: &PackId,
    ) -> Result<CraVerification, ServiceError> {
        simulate(self.latency.results).await;
        Ok(CraVerification {
            verified_at: Some(Utc::now()),
            ..demo_cra_verification()
        })
    }

    /// Poll until the pack completes or fails, calling `on_progress` after every check.
    ///
    /// Each check finishes, including its delay, before the next one starts.
    pub async fn poll_verification_status<F>(
        &self,
        pack_id: &PackId,
        mut on_progress: F,
        max_attempts: u32,
    ) -> Result<CraVerification, VerificationError>
    where
        F: FnMut(&VerificationStatusResponse),
    {
        for attempt in 1..=max_attempts {
            let status = self.check_verification_status(pack_id).await?;
            on_progress(&status);

            match status.status {
                ApplicationStatus::Complete => {
                    if let Some(result) = status.result {
                        info!(%pack_id, attempt, "verification completed");
                        return Ok(result);
                    }
                }
                ApplicationStatus::Failed => {
                    warn!(%pack_id, attempt, "verification failed");
                    return Err(VerificationError::Failed);
                }
                _ => {}
            }

            if attempt < max_attempts {
                simulate(self.latency.poll_interval).await;
            }
        }

        warn!(%pack_id, attempts = max_attempts, "verification timed out");
        Err(VerificationError::Timeout {
            attempts: max_attempts,
        })
    }
}

/// Poll loop running in the background on behalf of one page visit.
///
/// Cancelling, or dropping the handle, stops further polls; no progress or completion
/// callback runs after that.
pub struct VerificationTask {
    handle: JoinHandle<()>,
    cancelled: Arc<AtomicBool>,
}

impl VerificationTask {
    pub fn spawn<P, D>(
        service: Arc<MockVerificationService>,
        pack_id: PackId,
        max_attempts: u32,
        mut on_progress: P,
        on_complete: D,
    ) -> Self
    where
        P: FnMut(&VerificationStatusResponse) + Send + 'static,
        D: FnOnce(Result<CraVerification, VerificationError>) + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let handle = tokio::spawn(async move {
            let progress_flag = flag.clone();
            let outcome = service
                .poll_verification_status(
                    &pack_id,
                    |status| {
                        if !progress_flag.load(Ordering::Acquire) {
                            on_progress(status);
                        }
                    },
                    max_attempts,
                )
                .await;

            if !flag.load(Ordering::Acquire) {
                on_complete(outcome);
            } else {
                debug!(%pack_id, "discarding verification outcome after cancellation");
            }
        });

        Self { handle, cancelled }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for VerificationTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
