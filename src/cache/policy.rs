//! Cache trigger policy
//!
//! Decides which completed operations persist the session snapshot. This is
//! the single source of truth for when [`crate::cache::CacheStore::write`]
//! is invoked; the only write path it does not govern is the explicit
//! `cache_now` call, which is always allowed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When the session snapshot is written back to disk.
///
/// Exactly one trigger is active per session instance, fixed at
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheTrigger {
    /// Never persist automatically; only `cache_now` writes.
    Manual,
    /// Persist after every completed request, whatever its kind.
    AfterEachRequest,
    /// Persist after every completed POST (including the login POST path,
    /// which reports as a login operation, not a plain POST).
    AfterEachPost,
    /// Persist after each *successful* login only.
    #[default]
    AfterEachLogin,
}

impl FromStr for CacheTrigger {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "after-each-request" => Ok(Self::AfterEachRequest),
            "after-each-post" => Ok(Self::AfterEachPost),
            "after-each-login" => Ok(Self::AfterEachLogin),
            other => Err(crate::Error::config(
                "cache.trigger",
                format!(
                    "unknown trigger '{other}' (expected manual, after-each-request, \
                     after-each-post or after-each-login)"
                ),
            )),
        }
    }
}

impl fmt::Display for CacheTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Manual => "manual",
            Self::AfterEachRequest => "after-each-request",
            Self::AfterEachPost => "after-each-post",
            Self::AfterEachLogin => "after-each-login",
        };
        f.write_str(name)
    }
}

/// Kind of operation that just completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// A plain request (GET or anything that is not a POST)
    Request,
    /// A POST request
    Post,
    /// A login that ended in success. Failed logins and already-logged-in
    /// short circuits never reach the policy.
    Login,
}

/// Decide whether a completed operation must persist the session snapshot.
pub fn should_persist(trigger: CacheTrigger, operation: Operation) -> bool {
    match trigger {
        CacheTrigger::Manual => false,
        CacheTrigger::AfterEachRequest => true,
        CacheTrigger::AfterEachPost => operation == Operation::Post,
        CacheTrigger::AfterEachLogin => operation == Operation::Login,
    }
}
