//! Applicant wizard and case-worker workflows for the Electronic Factor Verification demo.
//!
//! Everything behind the HTTP surface is simulated in memory: authentication, CRA income
//! verification and application storage are mocks with fixed fixtures and artificial latency.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
