//! Data types shared across the crate

pub mod login;
pub mod response;

pub use login::{LoginCredentials, LoginOutcome, LoginStatus};
pub use response::HttpResponse;
