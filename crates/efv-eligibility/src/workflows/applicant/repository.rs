use serde::{Deserialize, Serialize};

use super::domain::{SessionId, UserSession};
use super::state::ApplicationStore;
use super::verification::VerificationStatusResponse;

/// Where a session's verification attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Complete,
    Failed,
    Cancelled,
}

impl VerificationPhase {
    pub const fn is_active(self) -> bool {
        matches!(self, VerificationPhase::Submitting | VerificationPhase::Polling)
    }
}

/// Progress shown on the verification page. `attempt` increases with every start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationProgress {
    pub attempt: u64,
    pub phase: VerificationPhase,
    pub progress: u8,
    pub message: String,
    pub polls: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for VerificationProgress {
    fn default() -> Self {
        Self {
            attempt: 0,
            phase: VerificationPhase::Idle,
            progress: 0,
            message: "Initializing verification...".to_string(),
            polls: 0,
            error: None,
        }
    }
}

impl VerificationProgress {
    pub fn starting(attempt: u64) -> Self {
        Self {
            attempt,
            phase: VerificationPhase::Submitting,
            ..Self::default()
        }
    }

    /// Whether a write on behalf of `attempt` may still land.
    pub fn accepts(&self, attempt: u64) -> bool {
        self.attempt == attempt && self.phase.is_active()
    }

    pub fn observe(&mut self, status: &VerificationStatusResponse) {
        self.polls += 1;
        self.progress = status.progress;
        self.message = super::verification::progress_message(status.progress, &status.message);
    }

    pub fn complete(&mut self) {
        self.phase = VerificationPhase::Complete;
        self.progress = 100;
        self.message = "Verification complete!".to_string();
        self.error = None;
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.phase = VerificationPhase::Failed;
        self.error = Some(error.into());
    }

    pub fn cancel(&mut self) {
        if self.phase.is_active() {
            self.phase = VerificationPhase::Cancelled;
        }
    }
}

/// Repository record for one applicant session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub store: ApplicationStore,
    pub verification: VerificationProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<UserSession>,
}

impl SessionRecord {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            store: ApplicationStore::new(),
            verification: VerificationProgress::default(),
            session: None,
        }
    }
}

/// Storage abstraction so the wizard service can be exercised in isolation.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, record: SessionRecord) -> Result<SessionRecord, RepositoryError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError>;
    /// Apply `change` to the stored record atomically and return the updated copy.
    fn modify(
        &self,
        id: &SessionId,
        change: &mut dyn FnMut(&mut SessionRecord),
    ) -> Result<SessionRecord, RepositoryError>;
    fn remove(&self, id: &SessionId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
