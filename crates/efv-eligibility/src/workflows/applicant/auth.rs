use chrono::{Duration as ChronoDuration, Utc};
use tracing::{debug, info};

use super::domain::{UserProfile, UserSession};
use super::fixtures::demo_user;
use super::mock::{simulate, MockLatency, ServiceError};

const SESSION_LIFETIME_MINUTES: i64 = 30;

/// Successful sign-in: the card profile plus a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    pub profile: UserProfile,
    pub session: UserSession,
}

/// Stand-in for BC Services Card authentication.
#[derive(Debug, Clone)]
pub struct MockAuthService {
    latency: MockLatency,
}

impl MockAuthService {
    pub fn new(latency: MockLatency) -> Self {
        Self { latency }
    }

    /// Always resolves to the demo profile after the sign-in delay; the id is ignored.
    pub async fn login_with_bc_services_card(
        &self,
        demo_user_id: Option<&str>,
    ) -> Result<SignIn, ServiceError> {
        simulate(self.latency.sign_in).await;

        let profile = demo_user();
        debug!(requested = ?demo_user_id, user_id = %profile.user_id, "mock card sign-in");
        let session = UserSession {
            session_token: uuid::Uuid::new_v4().simple().to_string(),
            user_id: profile.user_id.clone(),
            expires_at: Utc::now() + ChronoDuration::minutes(SESSION_LIFETIME_MINUTES),
        };
        info!(user_id = %profile.user_id, "authenticated with BC Services Card");

        Ok(SignIn { profile, session })
    }

    /// Interface stub; every token is reported valid.
    pub async fn validate_session(&self, _session_token: &str) -> Result<bool, ServiceError> {
        simulate(self.latency.session_check).await;
        Ok(true)
    }
}

impl Default for MockAuthService {
    fn default() -> Self {
        Self::new(MockLatency::realistic())
    }
}
