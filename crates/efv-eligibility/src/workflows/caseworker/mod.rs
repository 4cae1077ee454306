//! Case-worker side of the demo: the verification dashboard for one applicant and the
//! queue of submitted applications. Both are static fixtures.

pub mod dashboard;
pub mod queue;
pub mod router;

pub use dashboard::{
    ApplicantCard, AuditEntryType, AuditLogEntry, AuthorityLevel, CaseWorkerDashboard,
    DashboardTab, DashboardView, FactorDetail, FactorStatus, FactorView, IdentityCheck,
    ResidencySource, UnknownTab, VerificationFactor, VerificationSummary,
};
pub use queue::{ApplicationsQueue, QueueStats, QueueStatus, QueuedApplication};
pub use router::caseworker_router;
