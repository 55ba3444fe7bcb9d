//! Error types for the persistent session library
//!
//! The taxonomy separates failures that can safely be downgraded to
//! "start with a fresh session" (cache read problems) from failures that
//! must surface to the caller (transport errors, configuration mistakes,
//! cache write failures).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library
#[derive(Debug, Error)]
pub enum Error {
    /// Transport errors from the HTTP client. Never retried, never swallowed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors. Fatal on cache writes, downgraded to a miss on reads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Cache file absent when its age was queried
    #[error("Cache file not found: {path}")]
    CacheMissing {
        /// Path that was queried
        path: PathBuf,
    },

    /// Cache blob could not be interpreted as a session snapshot.
    ///
    /// Covers both malformed content and a mismatched type tag (a file not
    /// produced by this library). Callers treat this as a cache miss.
    #[error("Corrupt session cache: {reason}")]
    CorruptCache {
        /// Why the blob was rejected
        reason: String,
    },

    /// Cache write failure. Surfaced so silent data loss is observable,
    /// but it must not invalidate the in-memory session state.
    #[error("Failed to persist session cache to {path}: {details}")]
    CachePersist {
        /// Destination cache path
        path: PathBuf,
        /// Underlying failure description
        details: String,
    },

    /// Marker-based login probe invoked without a probe URL or marker.
    /// Signals a caller bug, so it propagates instead of reporting
    /// "not logged in".
    #[error("Login probe misconfigured: missing {missing}")]
    ProbeMisconfigured {
        /// Which probe field was absent
        missing: &'static str,
    },

    /// Configuration errors
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal issue
        message: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a corrupt-cache error
    pub fn corrupt_cache(reason: impl Into<String>) -> Self {
        Self::CorruptCache {
            reason: reason.into(),
        }
    }

    /// Create a cache persistence error
    pub fn cache_persist(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        Self::CachePersist {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create a probe misconfiguration error
    pub fn probe_misconfigured(missing: &'static str) -> Self {
        Self::ProbeMisconfigured { missing }
    }

    /// Create a configuration error
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error may be treated as an ordinary cache miss.
    ///
    /// True for everything the session controller downgrades to "start
    /// fresh" during cache restore: absent, unreadable, or corrupt cache
    /// content. Write failures and transport errors are never misses.
    pub fn is_cache_miss(&self) -> bool {
        matches!(
            self,
            Error::CacheMissing { .. } | Error::CorruptCache { .. } | Error::Io(..)
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(..) => "http",
            Error::Io(..) => "io",
            Error::Url(..) => "url",
            Error::CacheMissing { .. } => "cache_missing",
            Error::CorruptCache { .. } => "corrupt_cache",
            Error::CachePersist { .. } => "cache_persist",
            Error::ProbeMisconfigured { .. } => "probe",
            Error::Config { .. } => "config",
            Error::Internal { .. } => "internal",
        }
    }
}
