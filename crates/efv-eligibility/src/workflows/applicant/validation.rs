//! Field checks run by each wizard step before anything is written to the store.
//!
//! Every step owns a closed error record with one slot per field it knows about; an empty
//! record means the step may advance.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::domain::{
    Address, ApplicationType, Consent, ConsentRefused, DisabilityApplication, PersonalInfo,
    UserProfile,
};

static SIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}-?[0-9]{3}-?[0-9]{3}$").expect("valid SIN regex"));
static POSTAL_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][0-9][A-Za-z][ -]?[0-9][A-Za-z][0-9]$")
        .expect("valid postal code regex")
});
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_valid_sin(value: &str) -> bool {
    SIN_RE.is_match(value)
}

pub fn is_valid_postal_code(value: &str) -> bool {
    POSTAL_CODE_RE.is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn required(value: &str, message: &'static str) -> Option<&'static str> {
    blank(value).then_some(message)
}

fn required_matching(
    value: &str,
    missing: &'static str,
    invalid: &'static str,
    check: fn(&str) -> bool,
) -> Option<&'static str> {
    if blank(value) {
        Some(missing)
    } else if !check(value) {
        Some(invalid)
    } else {
        None
    }
}

/// Raw input for the personal information step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfoForm {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub sin: String,
    pub street_address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
}

impl PersonalInfoForm {
    /// Start from the card profile when one exists; province defaults to BC.
    pub fn prefilled(user: Option<&UserProfile>) -> Self {
        match user {
            Some(user) => Self {
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                date_of_birth: user.date_of_birth.clone(),
                sin: user.sin.clone(),
                street_address: user.address.street_address.clone(),
                city: user.address.city.clone(),
                province: if blank(&user.address.province) {
                    "BC".to_string()
                } else {
                    user.address.province.clone()
                },
                postal_code: user.address.postal_code.clone(),
                phone: user.phone_number.clone(),
                email: user.email.clone(),
            },
            None => Self {
                province: "BC".to_string(),
                ..Self::default()
            },
        }
    }

    pub fn validate(&self) -> Result<PersonalInfo, PersonalInfoErrors> {
        let errors = PersonalInfoErrors {
            first_name: required(&self.first_name, "First name is required"),
            last_name: required(&self.last_name, "Last name is required"),
            date_of_birth: required(&self.date_of_birth, "Date of birth is required"),
            sin: required_matching(&self.sin, "SIN is required", "Invalid SIN format", is_valid_sin),
            street_address: required(&self.street_address, "Address is required"),
            city: required(&self.city, "City is required"),
            province: required(&self.province, "Province is required"),
            postal_code: required_matching(
                &self.postal_code,
                "Postal code is required",
                "Invalid postal code format",
                is_valid_postal_code,
            ),
            phone: required(&self.phone, "Phone is required"),
            email: required_matching(
                &self.email,
                "Email is required",
                "Invalid email format",
                is_valid_email,
            ),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(PersonalInfo {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            sin: self.sin.clone(),
            date_of_birth: self.date_of_birth.clone(),
            phone_number: self.phone.clone(),
            email: self.email.clone(),
            address: Address {
                street_address: self.street_address.clone(),
                city: self.city.clone(),
                province: self.province.clone(),
                postal_code: self.postal_code.clone(),
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonalInfoErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sin: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'static str>,
}

impl PersonalInfoErrors {
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, message)| message.is_none())
    }

    pub fn fields(&self) -> [(&'static str, Option<&'static str>); 10] {
        [
            ("first_name", self.first_name),
            ("last_name", self.last_name),
            ("date_of_birth", self.date_of_birth),
            ("sin", self.sin),
            ("street_address", self.street_address),
            ("city", self.city),
            ("province", self.province),
            ("postal_code", self.postal_code),
            ("phone", self.phone),
            ("email", self.email),
        ]
    }
}

/// Raw input for the disability information step. Yes/no answers stay `None` until chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisabilityInfoForm {
    pub application_type: Option<ApplicationType>,
    pub disability_description: String,
    pub diagnosis_date: String,
    pub limitations: String,
    pub has_physical_disability: bool,
    pub has_mental_health_condition: bool,
    pub requires_assistance: Option<bool>,
    pub has_physician: Option<bool>,
    pub physician_name: String,
    pub physician_phone: String,
}

impl DisabilityInfoForm {
    pub fn validate(&self) -> Result<DisabilityApplication, DisabilityInfoErrors> {
        let has_physician = self.has_physician.unwrap_or(false);
        let errors = DisabilityInfoErrors {
            disability_description: required(
                &self.disability_description,
                "Disability description is required",
            ),
            diagnosis_date: required(&self.diagnosis_date, "Diagnosis date is required"),
            limitations: required(&self.limitations, "Please describe your limitations"),
            requires_assistance: self
                .requires_assistance
                .is_none()
                .then_some("Please indicate if you require assistance"),
            has_physician: self
                .has_physician
                .is_none()
                .then_some("Please indicate if you have a physician"),
            physician_name: if has_physician {
                required(&self.physician_name, "Physician name is required")
            } else {
                None
            },
            physician_phone: if has_physician {
                required(&self.physician_phone, "Physician phone is required")
            } else {
                None
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(DisabilityApplication {
            application_type: self.application_type.unwrap_or(ApplicationType::Disability),
            has_physical_disability: self.has_physical_disability,
            has_mental_health_condition: self.has_mental_health_condition,
            requires_assistance: self.requires_assistance.unwrap_or(false),
            disability_description: self.disability_description.clone(),
            medical_documentation: has_physician,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisabilityInfoErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disability_description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis_date: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limitations: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_assistance: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_physician: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physician_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physician_phone: Option<&'static str>,
}

impl DisabilityInfoErrors {
    pub fn is_empty(&self) -> bool {
        [
            self.disability_description,
            self.diagnosis_date,
            self.limitations,
            self.requires_assistance,
            self.has_physician,
            self.physician_name,
            self.physician_phone,
        ]
        .iter()
        .all(Option::is_none)
    }
}

/// Raw input for the consent step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentForm {
    pub agreed: bool,
    pub full_name: String,
    pub ip_address: Option<String>,
}

impl ConsentForm {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<Consent, ConsentErrors> {
        let errors = ConsentErrors {
            agreement: (!self.agreed).then_some("You must agree to the authorization to continue"),
            signature: required(&self.full_name, "Please type your full name as your signature"),
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Consent::grant(self.agreed, &self.full_name, self.ip_address.as_deref(), now).map_err(
            |refused| match refused {
                ConsentRefused::NotAgreed => ConsentErrors {
                    agreement: Some("You must agree to the authorization to continue"),
                    signature: None,
                },
                ConsentRefused::MissingSignature => ConsentErrors {
                    agreement: None,
                    signature: Some("Please type your full name as your signature"),
                },
            },
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsentErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<&'static str>,
}

impl ConsentErrors {
    pub fn is_empty(&self) -> bool {
        self.agreement.is_none() && self.signature.is_none()
    }
}
