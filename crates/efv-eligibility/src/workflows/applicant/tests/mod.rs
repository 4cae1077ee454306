mod common;
mod validation;
mod verification;
mod wizard;
