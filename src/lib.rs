//! # relogin
//!
//! Persistent HTTP login sessions. A [`Session`] caches its cookies and
//! headers in a file between process runs, detects whether it is still
//! logged in against a target site, logs in again when it is not, and
//! re-persists its state according to a configurable trigger policy.
//!
//! ## Example
//!
//! ```no_run
//! use relogin::{LoginCredentials, Session, Settings};
//!
//! # async fn run() -> relogin::Result<()> {
//! let settings = Settings::default();
//! let mut session = Session::connect("https://example.com", settings).await?;
//!
//! let credentials = LoginCredentials::new("https://example.com/login")
//!     .with_field("user", "alice")
//!     .with_field("password", "secret")
//!     .with_probe_url("https://example.com/account");
//!
//! let outcome = session.login(&credentials, false).await?;
//! if outcome.is_logged_in() {
//!     let page = session.get("https://example.com/account").await?;
//!     println!("{}", page.body);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Cache problems never fail construction: an absent, expired or corrupt
//! cache file just means the session starts fresh. The cache file holds
//! plaintext session secrets; protect it with filesystem permissions if
//! that matters in your deployment.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use cache::{CacheStore, CacheTrigger, Operation, should_persist};
pub use config::{ConfigLoader, Settings};
pub use error::{Error, Result};
pub use session::{
    HttpCapability, LoginProbe, ProbeStrategy, ReqwestCapability, Session, SessionGeneric,
    SessionSnapshot, SessionState,
};
pub use types::{HttpResponse, LoginCredentials, LoginOutcome, LoginStatus};
