//! Plumbing shared by the simulated backends: latency table, response envelope and
//! timestamp-derived identifiers.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::config::LatencyProfile;

/// Artificial delays applied by the mock services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLatency {
    pub sign_in: Duration,
    pub session_check: Duration,
    pub consent: Duration,
    pub submit: Duration,
    pub status_check: Duration,
    pub results: Duration,
    pub poll_interval: Duration,
}

impl MockLatency {
    pub const fn realistic() -> Self {
        Self {
            sign_in: Duration::from_millis(1500),
            session_check: Duration::from_millis(300),
            consent: Duration::from_millis(800),
            submit: Duration::from_millis(1200),
            status_check: Duration::from_millis(500),
            results: Duration::from_millis(600),
            poll_interval: Duration::from_millis(500),
        }
    }

    pub const fn instant() -> Self {
        Self {
            sign_in: Duration::ZERO,
            session_check: Duration::ZERO,
            consent: Duration::ZERO,
            submit: Duration::ZERO,
            status_check: Duration::ZERO,
            results: Duration::ZERO,
            poll_interval: Duration::ZERO,
        }
    }
}

impl From<LatencyProfile> for MockLatency {
    fn from(profile: LatencyProfile) -> Self {
        match profile {
            LatencyProfile::Realistic => Self::realistic(),
            LatencyProfile::Instant => Self::instant(),
        }
    }
}

pub(crate) async fn simulate(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}

/// Failure reported by a mock backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("failed to submit application: {0}")]
    Submission(String),
    #[error("failed to check verification status")]
    StatusUnavailable,
}

/// `success`/`data`/`error`/`message` envelope the applicant pages consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: Some(message.into()),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>, message: &str) -> Self {
        match result {
            Ok(data) => Self::ok(data, message),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Current epoch milliseconds, bumped when needed so successive calls never repeat.
pub(crate) fn next_stamp() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut previous = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(previous + 1);
        match LAST_STAMP.compare_exchange_weak(
            previous,
            candidate,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ) {
            Ok(_) => return candidate,
            Err(actual) => previous = actual,
        }
    }
}
