use super::common::*;
use chrono::Utc;

use crate::workflows::applicant::fixtures::demo_user;
use crate::workflows::applicant::validation::{
    is_valid_email, is_valid_postal_code, is_valid_sin, ConsentForm, DisabilityInfoForm,
    PersonalInfoErrors, PersonalInfoForm,
};

#[test]
fn blank_personal_form_blocks_on_every_required_field() {
    let errors = PersonalInfoForm::default()
        .validate()
        .expect_err("blank form is rejected");

    assert_eq!(
        errors,
        PersonalInfoErrors {
            first_name: Some("First name is required"),
            last_name: Some("Last name is required"),
            date_of_birth: Some("Date of birth is required"),
            sin: Some("SIN is required"),
            street_address: Some("Address is required"),
            city: Some("City is required"),
            province: Some("Province is required"),
            postal_code: Some("Postal code is required"),
            phone: Some("Phone is required"),
            email: Some("Email is required"),
        }
    );
}

#[test]
fn filling_a_field_clears_only_its_error() {
    let mut form = personal_info_form();
    form.last_name = "  ".to_string();
    form.city.clear();

    let errors = form.validate().expect_err("missing fields are rejected");
    let flagged: Vec<_> = errors
        .fields()
        .into_iter()
        .filter_map(|(field, message)| message.map(|_| field))
        .collect();
    assert_eq!(flagged, vec!["last_name", "city"]);

    form.last_name = "Ahmed".to_string();
    let errors = form.validate().expect_err("city still missing");
    assert!(errors.last_name.is_none());
    assert_eq!(errors.city, Some("City is required"));

    form.city = "Victoria".to_string();
    let info = form.validate().expect("complete form passes");
    assert_eq!(info.address.city, "Victoria");
    assert_eq!(info.phone_number, "250-555-0123");
}

#[test]
fn sin_accepts_nine_digits_with_optional_dashes() {
    assert!(is_valid_sin("123456789"));
    assert!(is_valid_sin("123-456-789"));
    assert!(is_valid_sin("123-456789"));
    assert!(!is_valid_sin("12-34-567"));
    assert!(!is_valid_sin("12345678"));
    assert!(!is_valid_sin("123 456 789"));

    let mut form = personal_info_form();
    form.sin = "12-34-567".to_string();
    let errors = form.validate().expect_err("malformed SIN");
    assert_eq!(errors.sin, Some("Invalid SIN format"));
}

#[test]
fn identifiers_reject_non_ascii_digits() {
    assert!(!is_valid_sin("١٢٣-٤٥٦-٧٨٩"));
    assert!(!is_valid_sin("１２３４５６７８９"));
    assert!(!is_valid_postal_code("V८W १X४"));

    let mut form = personal_info_form();
    form.sin = "１２３４５６７８９".to_string();
    form.postal_code = "V८W १X४".to_string();
    let errors = form.validate().expect_err("non-ASCII digits");
    assert_eq!(errors.sin, Some("Invalid SIN format"));
    assert_eq!(errors.postal_code, Some("Invalid postal code format"));
}

#[test]
fn postal_codes_follow_canadian_pattern() {
    assert!(is_valid_postal_code("V8W 1X4"));
    assert!(is_valid_postal_code("V8W1X4"));
    assert!(is_valid_postal_code("v8w-1x4"));
    assert!(!is_valid_postal_code("12345"));
    assert!(!is_valid_postal_code("V8W  1X4"));

    let mut form = personal_info_form();
    form.postal_code = "12345".to_string();
    assert_eq!(
        form.validate().expect_err("malformed postal code").postal_code,
        Some("Invalid postal code format")
    );
}

#[test]
fn email_needs_local_part_domain_and_suffix() {
    assert!(is_valid_email("amina.ahmed@example.com"));
    assert!(!is_valid_email("amina.ahmed@example"));
    assert!(!is_valid_email("amina ahmed@example.com"));
    assert!(!is_valid_email("@example.com"));
}

#[test]
fn prefill_copies_card_profile() {
    let form = PersonalInfoForm::prefilled(Some(&demo_user()));
    assert_eq!(form.first_name, "Amina");
    assert_eq!(form.postal_code, "V8W 1X4");
    assert_eq!(form.province, "BC");
    assert!(form.validate().is_ok());

    let empty = PersonalInfoForm::prefilled(None);
    assert_eq!(empty.province, "BC");
    assert!(empty.first_name.is_empty());
}

#[test]
fn physician_details_only_required_when_declared() {
    let mut form = disability_info_form();
    form.physician_name.clear();
    form.physician_phone.clear();

    let errors = form.validate().expect_err("physician declared without details");
    assert_eq!(errors.physician_name, Some("Physician name is required"));
    assert_eq!(errors.physician_phone, Some("Physician phone is required"));

    form.has_physician = Some(false);
    let application = form.validate().expect("no physician declared");
    assert!(!application.medical_documentation);
    assert!(application.has_physical_disability);
}

#[test]
fn unanswered_questions_block_disability_step() {
    let errors = DisabilityInfoForm::default()
        .validate()
        .expect_err("blank form is rejected");
    assert_eq!(
        errors.requires_assistance,
        Some("Please indicate if you require assistance")
    );
    assert_eq!(
        errors.has_physician,
        Some("Please indicate if you have a physician")
    );
    assert!(errors.physician_name.is_none());
}

#[test]
fn consent_requires_agreement_and_signature() {
    let refused = ConsentForm {
        agreed: false,
        full_name: String::new(),
        ip_address: None,
    }
    .validate(Utc::now())
    .expect_err("nothing agreed");
    assert_eq!(
        refused.agreement,
        Some("You must agree to the authorization to continue")
    );
    assert_eq!(
        refused.signature,
        Some("Please type your full name as your signature")
    );

    let consent = consent_form().validate(Utc::now()).expect("signed");
    assert!(consent.cra_data_access);
    assert_eq!(consent.electronic_signature, "Amina Ahmed");
}
