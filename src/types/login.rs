//! Login credentials and login results

use crate::types::HttpResponse;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Everything needed to log in to a site and to probe the resulting state.
///
/// Owned by the caller; the session controller only borrows it for the
/// duration of a login call.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    /// URL the login form POSTs to
    pub login_url: String,
    /// Form payload for the login POST
    payload: HashMap<String, String>,
    /// URL probed to infer login state. Optional: without it, redirect-mode
    /// detection always reports "not logged in".
    pub probe_url: Option<String>,
    /// Marker searched for in the probe response body (marker-mode
    /// detection only)
    pub probe_marker: Option<String>,
}

impl LoginCredentials {
    /// Create credentials for the given login URL.
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            payload: HashMap::new(),
            probe_url: None,
            probe_marker: None,
        }
    }

    /// Set the full form payload.
    pub fn with_payload(mut self, payload: HashMap<String, String>) -> Self {
        self.payload = payload;
        self
    }

    /// Add a single form field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Set the probe URL.
    pub fn with_probe_url(mut self, probe_url: impl Into<String>) -> Self {
        self.probe_url = Some(probe_url.into());
        self
    }

    /// Set the probe marker for marker-based detection.
    pub fn with_probe_marker(mut self, marker: impl Into<String>) -> Self {
        self.probe_marker = Some(marker.into());
        self
    }

    /// The current form payload.
    pub fn payload(&self) -> &HashMap<String, String> {
        &self.payload
    }

    /// Merge additional fields into the payload, overwriting on key
    /// collision. Useful for per-attempt values such as CSRF tokens
    /// scraped just before the POST.
    pub fn update_payload(&mut self, extra: HashMap<String, String>) {
        self.payload.extend(extra);
    }
}

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStatus {
    /// Login POST was issued and the probe confirmed the session
    Success,
    /// Login POST was issued but the probe still reports logged out
    Failure,
    /// The probe confirmed an existing session; no POST was issued
    AlreadyLoggedIn,
}

impl fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Success => "login successful",
            Self::Failure => "login failed",
            Self::AlreadyLoggedIn => "already logged in",
        };
        f.write_str(text)
    }
}

/// Outcome of a login call: the status plus the underlying HTTP response
/// of the login POST, when one was issued.
#[derive(Debug)]
pub struct LoginOutcome {
    /// How the attempt ended
    pub status: LoginStatus,
    /// Response of the login POST. Absent for `AlreadyLoggedIn`, which
    /// short-circuits before any POST.
    pub response: Option<HttpResponse>,
}

impl LoginOutcome {
    /// Outcome for a confirmed fresh login.
    pub fn success(response: HttpResponse) -> Self {
        Self {
            status: LoginStatus::Success,
            response: Some(response),
        }
    }

    /// Outcome for a failed login attempt.
    pub fn failure(response: HttpResponse) -> Self {
        Self {
            status: LoginStatus::Failure,
            response: Some(response),
        }
    }

    /// Outcome for a session that was already authenticated.
    pub fn already_logged_in() -> Self {
        Self {
            status: LoginStatus::AlreadyLoggedIn,
            response: None,
        }
    }

    /// Whether the session is authenticated after this outcome.
    pub fn is_logged_in(&self) -> bool {
        matches!(
            self.status,
            LoginStatus::Success | LoginStatus::AlreadyLoggedIn
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_builder() {
        let creds = LoginCredentials::new("https://e.com/login")
            .with_field("user", "alice")
            .with_field("password", "secret")
            .with_probe_url("https://e.com/home")
            .with_probe_marker("log out");

        assert_eq!(creds.login_url, "https://e.com/login");
        assert_eq!(creds.payload().get("user"), Some(&"alice".to_string()));
        assert_eq!(creds.probe_url.as_deref(), Some("https://e.com/home"));
        assert_eq!(creds.probe_marker.as_deref(), Some("log out"));
    }

    #[test]
    fn test_update_payload_overwrites_on_collision() {
        let mut creds = LoginCredentials::new("https://e.com/login")
            .with_field("user", "alice")
            .with_field("remember_me", "1");

        let mut extra = HashMap::new();
        extra.insert("user".to_string(), "bob".to_string());
        extra.insert("csrf_token".to_string(), "abc123".to_string());
        creds.update_payload(extra);

        assert_eq!(creds.payload().get("user"), Some(&"bob".to_string()));
        assert_eq!(creds.payload().get("remember_me"), Some(&"1".to_string()));
        assert_eq!(
            creds.payload().get("csrf_token"),
            Some(&"abc123".to_string())
        );
    }

    #[test]
    fn test_already_logged_in_carries_no_response() {
        let outcome = LoginOutcome::already_logged_in();
        assert!(outcome.response.is_none());
        assert!(outcome.is_logged_in());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&LoginStatus::AlreadyLoggedIn).unwrap(),
            "\"already_logged_in\""
        );
        assert_eq!(LoginStatus::Failure.to_string(), "login failed");
    }
}
