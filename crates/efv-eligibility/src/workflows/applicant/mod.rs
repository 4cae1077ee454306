//! Applicant wizard: BC Services Card sign-in, personal and disability details, consent,
//! simulated CRA income verification, review and confirmation.
//!
//! Session state lives in an explicit [`ApplicationStore`] per session; the mock services in
//! [`auth`] and [`verification`] stand in for the real backends.

pub mod auth;
pub mod domain;
pub mod fixtures;
pub mod mock;
pub mod repository;
pub mod router;
pub mod service;
pub mod state;
pub mod validation;
pub mod verification;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use auth::{MockAuthService, SignIn};
pub use domain::{
    Address, ApplicationId, ApplicationStatus, ApplicationTracking, ApplicationType, CheckId,
    Consent, ConsentRefused, CraVerification, DisabilityApplication, EligibilityFactors, PackId,
    PersonalInfo, SessionId, UserProfile, UserSession, VerificationSource, VerificationStatus,
    WizardStep,
};
pub use mock::{ApiResponse, MockLatency, ServiceError};
pub use repository::{
    RepositoryError, SessionRecord, SessionRepository, VerificationPhase, VerificationProgress,
};
pub use router::wizard_router;
pub use service::{
    EligibilityWizardService, LoginOutcome, SessionSnapshot, VerificationView, WizardServiceError,
};
pub use state::{ApplicationAction, ApplicationState, ApplicationStore};
pub use validation::{
    ConsentErrors, ConsentForm, DisabilityInfoErrors, DisabilityInfoForm, PersonalInfoErrors,
    PersonalInfoForm,
};
pub use verification::{
    progress_message, MockVerificationService, MonotonicProgression, RandomProgression,
    StatusProgression, StatusSample, SubmitApplicationResponse, VerificationError,
    VerificationStatusResponse, VerificationTask,
};
pub use wizard::{
    guard, ConfirmationView, ResultsView, ReviewSummary, Route, RouteDecision, VerifiedResults,
};
