pub mod applicant;
pub mod caseworker;
