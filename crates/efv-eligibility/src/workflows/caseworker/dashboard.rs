//! Case-worker decision-support dashboard over fixed verification fixtures.
//!
//! Nothing here talks to the applicant wizard or the mock services; expand/collapse and the
//! active tab are local view state.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FactorStatus {
    Verified,
    Failed,
    Pending,
    ManualReview,
}

impl FactorStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FactorStatus::Verified => "verified",
            FactorStatus::Failed => "failed",
            FactorStatus::Pending => "pending",
            FactorStatus::ManualReview => "manual review",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthorityLevel {
    High,
    Medium,
    Low,
}

/// One source's view of the applicant's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidencySource {
    pub source: &'static str,
    pub address: &'static str,
    pub last_updated: &'static str,
    pub authority_level: AuthorityLevel,
    pub matches: bool,
    pub note: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityCheck {
    pub title: &'static str,
    pub status: FactorStatus,
    pub detail: &'static str,
    pub source: &'static str,
}

/// Sub-criteria shown when a factor is expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FactorDetail {
    Residency {
        summary: &'static str,
        sources: Vec<ResidencySource>,
        note: &'static str,
    },
    Identity {
        checks: Vec<IdentityCheck>,
        limitations: Vec<&'static str>,
    },
    Placeholder {
        message: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationFactor {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub status: FactorStatus,
    pub data_source: &'static str,
    pub authority_level: AuthorityLevel,
    pub sub_criteria_count: u8,
    pub expanded: bool,
    #[serde(skip)]
    detail: FactorDetail,
}

impl VerificationFactor {
    pub fn detail(&self) -> &FactorDetail {
        &self.detail
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditEntryType {
    Verification,
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditLogEntry {
    pub id: &'static str,
    pub timestamp: &'static str,
    pub action: &'static str,
    pub factor: &'static str,
    pub details: &'static str,
    #[serde(rename = "type")]
    pub entry_type: AuditEntryType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantCard {
    pub full_name: &'static str,
    pub date_of_birth: &'static str,
    pub location: &'static str,
    pub program_context: &'static str,
    pub identity_confidence: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerificationSummary {
    pub verified: usize,
    pub failed: usize,
    pub pending: usize,
    pub manual_review: usize,
    pub completion_progress: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DashboardTab {
    #[default]
    Verification,
    Audit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dashboard tab `{0}`")]
pub struct UnknownTab(pub String);

impl FromStr for DashboardTab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verification" => Ok(DashboardTab::Verification),
            "audit" => Ok(DashboardTab::Audit),
            other => Err(UnknownTab(other.to_string())),
        }
    }
}

/// Factor card as rendered, with sub-criteria only when expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorView {
    #[serde(flatten)]
    pub factor: VerificationFactor,
    pub status_label: &'static str,
    pub expand_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<FactorDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub applicant: ApplicantCard,
    pub summary: VerificationSummary,
    pub active_tab: DashboardTab,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub factors: Vec<FactorView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub audit_log: Vec<AuditLogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseWorkerDashboard {
    applicant: ApplicantCard,
    factors: Vec<VerificationFactor>,
    audit_log: Vec<AuditLogEntry>,
    active_tab: DashboardTab,
}

impl Default for CaseWorkerDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseWorkerDashboard {
    pub fn new() -> Self {
        Self {
            applicant: applicant_card(),
            factors: verification_factors(),
            audit_log: audit_log(),
            active_tab: DashboardTab::Verification,
        }
    }

    pub fn factors(&self) -> &[VerificationFactor] {
        &self.factors
    }

    pub fn audit_log(&self) -> &[AuditLogEntry] {
        &self.audit_log
    }

    pub fn active_tab(&self) -> DashboardTab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: DashboardTab) {
        self.active_tab = tab;
    }

    /// Flip one factor's expanded flag. Returns `false` for an unknown id.
    pub fn toggle_expanded(&mut self, id: &str) -> bool {
        match self.factors.iter_mut().find(|factor| factor.id == id) {
            Some(factor) => {
                factor.expanded = !factor.expanded;
                true
            }
            None => false,
        }
    }

    pub fn summary(&self) -> VerificationSummary {
        let count = |status: FactorStatus| {
            self.factors
                .iter()
                .filter(|factor| factor.status == status)
                .count()
        };
        let verified = count(FactorStatus::Verified);
        let completion_progress = if self.factors.is_empty() {
            0
        } else {
            ((verified as f64 / self.factors.len() as f64) * 100.0).round() as u8
        };

        VerificationSummary {
            verified,
            failed: count(FactorStatus::Failed),
            pending: count(FactorStatus::Pending),
            manual_review: count(FactorStatus::ManualReview),
            completion_progress,
        }
    }

    pub fn view(&self) -> DashboardView {
        let (factors, audit_log) = match self.active_tab {
            DashboardTab::Verification => (
                self.factors
                    .iter()
                    .map(|factor| FactorView {
                        factor: factor.clone(),
                        status_label: factor.status.label(),
                        expand_label: format!(
                            "{} Detailed Sub-Criteria ({})",
                            if factor.expanded { "Hide" } else { "Show" },
                            factor.sub_criteria_count
                        ),
                        detail: factor.expanded.then(|| factor.detail.clone()),
                    })
                    .collect(),
                Vec::new(),
            ),
            DashboardTab::Audit => (Vec::new(), self.audit_log.clone()),
        };

        DashboardView {
            applicant: self.applicant.clone(),
            summary: self.summary(),
            active_tab: self.active_tab,
            factors,
            audit_log,
        }
    }
}

fn applicant_card() -> ApplicantCard {
    ApplicantCard {
        full_name: "Amina Ahmed",
        date_of_birth: "January 01, 1999",
        location: "British Columbia, Canada",
        program_context: "Disability Assistance Program",
        identity_confidence: "medium identity confidence",
    }
}

fn residency_sources() -> Vec<ResidencySource> {
    vec![
        ResidencySource {
            source: "ICBC Driver Licensing",
            address: "Vancouver, BC (Postal: V6B)",
            last_updated: "December 15, 2025",
            authority_level: AuthorityLevel::High,
            matches: true,
            note: "Current driver's license on file with Vancouver address. Address updated 2 months ago.",
        },
        ResidencySource {
            source: "Medical Services Plan (MSP)",
            address: "Vancouver, BC (Postal: V6B)",
            last_updated: "November 3, 2025",
            authority_level: AuthorityLevel::High,
            matches: true,
            note: "MSP registration shows Vancouver address. Premium billing address matches.",
        },
        ResidencySource {
            source: "Canada Revenue Agency",
            address: "Tax filing address - British Columbia",
            last_updated: "April 30, 2025",
            authority_level: AuthorityLevel::Medium,
            matches: true,
            note: "Tax filing address for most recent completed tax year.",
        },
        ResidencySource {
            source: "BC Hydro",
            address: "Vancouver, BC (Postal: V6B)",
            last_updated: "January 5, 2026",
            authority_level: AuthorityLevel::Medium,
            matches: true,
            note: "Active utility service account holder address.",
        },
    ]
}

fn identity_checks() -> Vec<IdentityCheck> {
    vec![
        IdentityCheck {
            title: "Legal Name Match Across Systems",
            status: FactorStatus::Verified,
            detail: "Full legal name matches across Provincial Identity Registry, BC Services Card, and driver's license. No aliases or alternate spellings found.",
            source: "Provincial Identity Registry, ICBC",
        },
        IdentityCheck {
            title: "Date of Birth Consistency",
            status: FactorStatus::Verified,
            detail: "Date of birth consistent across all checked systems including birth registry, health records, and driver's license.",
            source: "Birth Registry, MSP, ICBC",
        },
        IdentityCheck {
            title: "Photo Identification Verification",
            status: FactorStatus::Verified,
            detail: "Government-issued photo ID verified in person at Service BC office. BC driver's license presented and validated.",
            source: "In-person verification at Service BC - Downtown Vancouver",
        },
        IdentityCheck {
            title: "Address History Verification",
            status: FactorStatus::Verified,
            detail: "5-year address history confirmed through driver's license updates and MSP records. No gaps in residency.",
            source: "ICBC, MSP",
        },
        IdentityCheck {
            title: "Unique Identity Confirmation",
            status: FactorStatus::Verified,
            detail: "No duplicate records found across systems. Identity is unique within provincial databases.",
            source: "Provincial Identity Registry",
        },
    ]
}

const PLACEHOLDER_DETAIL: FactorDetail = FactorDetail::Placeholder {
    message: "Detailed sub-criteria would be displayed here...",
};

fn verification_factors() -> Vec<VerificationFactor> {
    vec![
        VerificationFactor {
            id: "income",
            title: "Income Within Defined Range",
            description: "Verify that applicant annual income falls within the program eligibility range",
            status: FactorStatus::Verified,
            data_source: "Canada Revenue Agency (CRA) - T1 General",
            authority_level: AuthorityLevel::High,
            sub_criteria_count: 3,
            expanded: false,
            detail: PLACEHOLDER_DETAIL,
        },
        VerificationFactor {
            id: "identity",
            title: "Identity Confirmation",
            description: "Identity must be verified before other eligibility factors can be assessed",
            status: FactorStatus::Verified,
            data_source: "BC Services Card (digital) with in-person document verification",
            authority_level: AuthorityLevel::High,
            sub_criteria_count: 5,
            expanded: false,
            detail: FactorDetail::Identity {
                checks: identity_checks(),
                limitations: vec![
                    "Does not confirm current residency",
                    "Does not confirm legal status for program",
                    "Does not detect informal name usage",
                ],
            },
        },
        VerificationFactor {
            id: "residency",
            title: "BC Residency Verification",
            description: "Verify British Columbia residency through multiple authoritative sources",
            status: FactorStatus::ManualReview,
            data_source: "Multiple sources (ICBC, MSP, BC Hydro, CRA)",
            authority_level: AuthorityLevel::Medium,
            sub_criteria_count: 5,
            expanded: false,
            detail: FactorDetail::Residency {
                summary: "Multiple authoritative sources provide signals about residency. All sources aligned with Vancouver, BC address.",
                sources: residency_sources(),
                note: "ICBC address is self-reported by licensee and updated voluntarily. MSP address determines service eligibility region.",
            },
        },
        VerificationFactor {
            id: "ei-status",
            title: "Active EI Claim Status",
            description: "Verify if applicant has an active Employment Insurance claim",
            status: FactorStatus::Verified,
            data_source: "Employment and Social Development Canada (ESDC)",
            authority_level: AuthorityLevel::High,
            sub_criteria_count: 2,
            expanded: false,
            detail: PLACEHOLDER_DETAIL,
        },
        VerificationFactor {
            id: "education",
            title: "Educational Enrollment Status",
            description: "Verify active enrollment in an approved educational institution",
            status: FactorStatus::Failed,
            data_source: "Ministry of Education - Student Records",
            authority_level: AuthorityLevel::Medium,
            sub_criteria_count: 2,
            expanded: false,
            detail: PLACEHOLDER_DETAIL,
        },
    ]
}

fn audit_log() -> Vec<AuditLogEntry> {
    vec![
        AuditLogEntry {
            id: "1",
            timestamp: "January 12, 2026 10:21 AM",
            action: "Manual Review Requested",
            factor: "Identity Confirmation",
            details: "A. System (Automated)",
            entry_type: AuditEntryType::Review,
        },
        AuditLogEntry {
            id: "2",
            timestamp: "January 12, 2026 10:26 AM",
            action: "Verification Completed",
            factor: "Income Within Defined Range",
            details: "Income verified below threshold. One sub-criteria flagged for manual review. A. System (Automated)",
            entry_type: AuditEntryType::Verification,
        },
        AuditLogEntry {
            id: "3",
            timestamp: "January 12, 2026 10:26 AM",
            action: "Address Triangulation Completed",
            factor: "BC Residency Verification",
            details: "4 of 5 sources match Vancouver address. BC Hydro account shows Victoria address. Flagged for manual review to verify recent move or multiple residences. A. System (Automated)",
            entry_type: AuditEntryType::Review,
        },
        AuditLogEntry {
            id: "4",
            timestamp: "January 12, 2026 10:26 AM",
            action: "Verification Completed",
            factor: "Active EI Claim Status",
            details: "Active EI claim confirmed via ESDC data sharing agreement. A. System (Automated)",
            entry_type: AuditEntryType::Verification,
        },
        AuditLogEntry {
            id: "5",
            timestamp: "January 12, 2026 10:28 AM",
            action: "Verification Failed",
            factor: "Educational Enrollment Status",
            details: "No current term enrollment found. Factor marked for manual review. A. System (Automated)",
            entry_type: AuditEntryType::Verification,
        },
    ]
}
