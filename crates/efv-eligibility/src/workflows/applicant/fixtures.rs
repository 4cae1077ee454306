//! Canned data returned by the mock sign-in and CRA lookup.

use super::domain::{
    Address, ApplicationType, CraVerification, DisabilityApplication, EligibilityFactors,
    PersonalInfo, UserProfile, VerificationSource, VerificationStatus,
};

pub const DEMO_USER_ID: &str = "BCSC-AMI-2025-001";

fn demo_address() -> Address {
    Address {
        street_address: "123 Government Street".to_string(),
        city: "Victoria".to_string(),
        province: "BC".to_string(),
        postal_code: "V8W 1X4".to_string(),
    }
}

/// Profile every mock sign-in resolves to.
pub fn demo_user() -> UserProfile {
    UserProfile {
        user_id: DEMO_USER_ID.to_string(),
        verified: true,
        first_name: "Amina".to_string(),
        last_name: "Ahmed".to_string(),
        date_of_birth: "1985-03-15".to_string(),
        sin: "123-456-789".to_string(),
        phone_number: "250-555-0123".to_string(),
        email: "amina.ahmed@example.com".to_string(),
        address: demo_address(),
    }
}

pub fn demo_personal_info() -> PersonalInfo {
    let user = demo_user();
    PersonalInfo {
        first_name: user.first_name,
        last_name: user.last_name,
        sin: user.sin,
        date_of_birth: user.date_of_birth,
        phone_number: user.phone_number,
        email: user.email,
        address: user.address,
    }
}

pub fn demo_disability_application() -> DisabilityApplication {
    DisabilityApplication {
        application_type: ApplicationType::Disability,
        has_physical_disability: false,
        has_mental_health_condition: true,
        requires_assistance: true,
        disability_description: "Living with chronic anxiety and depression that affects daily functioning and ability to maintain consistent employment.".to_string(),
        medical_documentation: true,
    }
}

/// Income figure reported by the CRA fixture; below the provincial threshold.
pub const DEMO_TOTAL_INCOME: u64 = 28_500;

/// Result carried by every completed verification. `verified_at` is stamped by the caller.
pub fn demo_cra_verification() -> CraVerification {
    CraVerification {
        source: VerificationSource::Cra,
        status: VerificationStatus::Verified,
        tax_year: 2024,
        total_income: DEMO_TOTAL_INCOME,
        employment_income: DEMO_TOTAL_INCOME,
        verified_at: None,
        factors: EligibilityFactors {
            income_eligibility: true,
            threshold_met: true,
            disability_eligibility: Some(true),
            additional_factors: vec![
                "Income below provincial threshold".to_string(),
                "No other government benefits currently received".to_string(),
                "Medical documentation provided".to_string(),
            ],
        },
        error_message: None,
    }
}
