use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for one applicant's browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier issued to a submitted application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier for the eligibility check run against an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckId(pub String);

/// Identifier used to poll the CRA verification pack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackId(pub String);

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mailing address shared by the card profile and the personal information step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
}

/// Verified identity returned by the BC Services Card sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub verified: bool,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub sin: String,
    pub phone_number: String,
    pub email: String,
    pub address: Address,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Token pair handed out next to the profile at sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub session_token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Applicant details captured by the personal information step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub sin: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub email: String,
    pub address: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationType {
    Disability,
    IncomeAssistance,
}

/// Answers captured by the disability information step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabilityApplication {
    pub application_type: ApplicationType,
    pub has_physical_disability: bool,
    pub has_mental_health_condition: bool,
    pub requires_assistance: bool,
    pub disability_description: String,
    pub medical_documentation: bool,
}

pub const CONSENT_TEXT: &str = "I have read and understand the above information, and I consent to the collection, use, and disclosure of my personal information as described";

/// Signed authorization for the ministry to pull CRA income data.
///
/// Only [`Consent::grant`] builds one, so a stored consent always carries agreement and a
/// non-blank signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consent {
    pub consent_id: String,
    pub cra_data_access: bool,
    pub electronic_signature: String,
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
    pub consent_text: String,
}

/// Reasons a consent record cannot be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConsentRefused {
    #[error("the applicant has not agreed to the authorization")]
    NotAgreed,
    #[error("an electronic signature is required")]
    MissingSignature,
}

impl Consent {
    pub fn grant(
        agreed: bool,
        signature: &str,
        ip_address: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ConsentRefused> {
        if !agreed {
            return Err(ConsentRefused::NotAgreed);
        }
        if signature.trim().is_empty() {
            return Err(ConsentRefused::MissingSignature);
        }

        Ok(Self {
            consent_id: format!("consent-{}", now.timestamp_millis()),
            cra_data_access: true,
            electronic_signature: signature.to_string(),
            timestamp: now,
            ip_address: ip_address.unwrap_or("0.0.0.0").to_string(),
            consent_text: CONSENT_TEXT.to_string(),
        })
    }
}

/// Lifecycle of a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Draft,
    Pending,
    Processing,
    Complete,
    Failed,
    RequiresAction,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Processing => "processing",
            ApplicationStatus::Complete => "complete",
            ApplicationStatus::Failed => "failed",
            ApplicationStatus::RequiresAction => "requires-action",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Complete | ApplicationStatus::Failed)
    }

    /// Forward-only transitions for a tracking record.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Draft, Pending)
                | (Pending, Processing)
                | (Pending, Complete)
                | (Pending, Failed)
                | (Processing, Complete)
                | (Processing, Failed)
        )
    }
}

/// Identifiers and status for an application after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationTracking {
    pub application_id: ApplicationId,
    pub check_id: CheckId,
    pub pack_id: PackId,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationSource {
    #[serde(rename = "CRA")]
    Cra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Failed,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityFactors {
    pub income_eligibility: bool,
    pub threshold_met: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disability_eligibility: Option<bool>,
    #[serde(default)]
    pub additional_factors: Vec<String>,
}

/// Income figures returned by the CRA lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraVerification {
    pub source: VerificationSource,
    pub status: VerificationStatus,
    pub tax_year: u16,
    pub total_income: u64,
    pub employment_income: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    pub factors: EligibilityFactors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Cursor over the applicant wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    #[default]
    Landing,
    Login,
    PersonalInfo,
    DisabilityInfo,
    Consent,
    Verification,
    Results,
    Review,
    Confirmation,
}

impl WizardStep {
    pub const ORDER: [WizardStep; 9] = [
        WizardStep::Landing,
        WizardStep::Login,
        WizardStep::PersonalInfo,
        WizardStep::DisabilityInfo,
        WizardStep::Consent,
        WizardStep::Verification,
        WizardStep::Results,
        WizardStep::Review,
        WizardStep::Confirmation,
    ];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|step| *step == self)
            .unwrap_or_default()
    }

    pub fn next(self) -> Option<WizardStep> {
        Self::ORDER.get(self.position() + 1).copied()
    }

    pub fn previous(self) -> Option<WizardStep> {
        self.position()
            .checked_sub(1)
            .and_then(|index| Self::ORDER.get(index).copied())
    }

    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::Landing => "landing",
            WizardStep::Login => "login",
            WizardStep::PersonalInfo => "personal-info",
            WizardStep::DisabilityInfo => "disability-info",
            WizardStep::Consent => "consent",
            WizardStep::Verification => "verification",
            WizardStep::Results => "results",
            WizardStep::Review => "review",
            WizardStep::Confirmation => "confirmation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 3, 17, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn consent_requires_agreement_and_signature() {
        assert_eq!(
            Consent::grant(false, "Amina Ahmed", None, now()),
            Err(ConsentRefused::NotAgreed)
        );
        assert_eq!(
            Consent::grant(true, "   ", None, now()),
            Err(ConsentRefused::MissingSignature)
        );

        let consent = Consent::grant(true, " Amina Ahmed ", None, now()).expect("granted");
        assert!(consent.cra_data_access);
        assert_eq!(consent.electronic_signature, " Amina Ahmed ");
        assert_eq!(consent.ip_address, "0.0.0.0");
        assert_eq!(consent.consent_text, CONSENT_TEXT);
        assert!(consent.consent_id.starts_with("consent-"));
    }

    #[test]
    fn tracking_status_only_moves_forward() {
        use ApplicationStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Complete));
        assert!(Pending.can_transition_to(Failed));
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Complete.can_transition_to(Processing));
        assert!(!Failed.can_transition_to(Complete));
    }

    #[test]
    fn wizard_steps_walk_in_order() {
        assert_eq!(WizardStep::Landing.previous(), None);
        assert_eq!(WizardStep::Landing.next(), Some(WizardStep::Login));
        assert_eq!(WizardStep::Consent.next(), Some(WizardStep::Verification));
        assert_eq!(WizardStep::Review.previous(), Some(WizardStep::Results));
        assert_eq!(WizardStep::Confirmation.next(), None);
    }

    #[test]
    fn statuses_serialize_in_kebab_case() {
        let json = serde_json::to_string(&ApplicationStatus::RequiresAction).expect("serializes");
        assert_eq!(json, "\"requires-action\"");
        let json = serde_json::to_string(&VerificationSource::Cra).expect("serializes");
        assert_eq!(json, "\"CRA\"");
    }
}
