//! Login state detection
//!
//! A probe infers whether the current session is authenticated by issuing
//! a GET against a known URL and inspecting the response. Detection is a
//! heuristic either way, so the strategy is pluggable rather than
//! hard-coded to one site convention.

use crate::{Error, Result, session::http::HttpCapability, types::LoginCredentials};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// How login state is inferred from the probe response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeStrategy {
    /// Logged in iff the probe URL answers exactly 302 with redirects
    /// disabled (the "already authenticated, redirecting away from the
    /// login page" convention). Site-dependent, not an authentication
    /// proof. With no probe URL configured, detection is opted out and
    /// always reports logged out.
    #[default]
    Redirect,
    /// Logged in iff the probe response body contains the configured
    /// marker, case-insensitively (e.g. a "log out" link). Requires both
    /// probe URL and marker; a missing one is a caller bug and errors.
    BodyMarker,
}

/// Probes a site to infer the current login state.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginProbe {
    strategy: ProbeStrategy,
}

impl LoginProbe {
    /// Create a probe with the given strategy.
    pub fn new(strategy: ProbeStrategy) -> Self {
        Self { strategy }
    }

    /// Redirect-based probe (the default).
    pub fn redirect() -> Self {
        Self::new(ProbeStrategy::Redirect)
    }

    /// Marker-based probe.
    pub fn body_marker() -> Self {
        Self::new(ProbeStrategy::BodyMarker)
    }

    /// The active strategy.
    pub fn strategy(&self) -> ProbeStrategy {
        self.strategy
    }

    /// Infer whether the session behind `http` is logged in.
    ///
    /// Issues at most one GET. Transport errors propagate.
    pub async fn is_logged_in(
        &self,
        http: &dyn HttpCapability,
        headers: &HashMap<String, String>,
        credentials: &LoginCredentials,
    ) -> Result<bool> {
        match self.strategy {
            ProbeStrategy::Redirect => self.check_redirect(http, headers, credentials).await,
            ProbeStrategy::BodyMarker => self.check_marker(http, headers, credentials).await,
        }
    }

    async fn check_redirect(
        &self,
        http: &dyn HttpCapability,
        headers: &HashMap<String, String>,
        credentials: &LoginCredentials,
    ) -> Result<bool> {
        let Some(probe_url) = credentials.probe_url.as_deref().filter(|u| !u.is_empty()) else {
            // Detection is opt-in for this strategy
            debug!("No probe URL configured, reporting logged out");
            return Ok(false);
        };

        let response = http.get(probe_url, headers, false).await?;
        let logged_in = response.status == 302;
        debug!(
            "Redirect probe against {} returned {} -> logged_in={}",
            probe_url, response.status, logged_in
        );
        Ok(logged_in)
    }

    async fn check_marker(
        &self,
        http: &dyn HttpCapability,
        headers: &HashMap<String, String>,
        credentials: &LoginCredentials,
    ) -> Result<bool> {
        let probe_url = credentials
            .probe_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::probe_misconfigured("probe URL"))?;
        let marker = credentials
            .probe_marker
            .as_deref()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| Error::probe_misconfigured("probe marker"))?;

        let response = http.get(probe_url, headers, true).await?;
        let logged_in = response.body_contains_ignore_case(marker);
        debug!(
            "Marker probe against {} -> logged_in={}",
            probe_url, logged_in
        );
        Ok(logged_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Capability stub returning a fixed response and counting GETs.
    #[derive(Debug)]
    struct FixedResponse {
        status: u16,
        body: String,
        gets: AtomicUsize,
    }

    impl FixedResponse {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                gets: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HttpCapability for FixedResponse {
        async fn get(
            &self,
            _url: &str,
            _headers: &HashMap<String, String>,
            _allow_redirects: bool,
        ) -> Result<HttpResponse> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse::new(
                self.status,
                HashMap::new(),
                self.body.clone(),
            ))
        }

        async fn post_form(
            &self,
            _url: &str,
            _form: &HashMap<String, String>,
            _headers: &HashMap<String, String>,
        ) -> Result<HttpResponse> {
            unreachable!("probe must never POST")
        }

        fn export_cookies(&self) -> Result<serde_json::Value> {
            Ok(serde_json::json!([]))
        }

        fn import_cookies(&self, _cookies: &serde_json::Value) -> Result<()> {
            Ok(())
        }
    }

    fn probe_creds() -> LoginCredentials {
        LoginCredentials::new("https://e.com/login").with_probe_url("https://e.com/home")
    }

    #[tokio::test]
    async fn test_redirect_probe_logged_in_on_302() {
        let http = FixedResponse::new(302, "");
        let probe = LoginProbe::redirect();

        let logged_in = probe
            .is_logged_in(&http, &HashMap::new(), &probe_creds())
            .await
            .unwrap();
        assert!(logged_in);
        assert_eq!(http.gets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_redirect_probe_logged_out_on_200() {
        let http = FixedResponse::new(200, "please sign in");
        let probe = LoginProbe::redirect();

        let logged_in = probe
            .is_logged_in(&http, &HashMap::new(), &probe_creds())
            .await
            .unwrap();
        assert!(!logged_in);
    }

    #[tokio::test]
    async fn test_redirect_probe_only_exact_302_counts() {
        // Other redirect codes are not the site convention
        let http = FixedResponse::new(301, "");
        let probe = LoginProbe::redirect();

        let logged_in = probe
            .is_logged_in(&http, &HashMap::new(), &probe_creds())
            .await
            .unwrap();
        assert!(!logged_in);
    }

    #[tokio::test]
    async fn test_redirect_probe_without_url_reports_logged_out() {
        let http = FixedResponse::new(302, "");
        let probe = LoginProbe::redirect();
        let creds = LoginCredentials::new("https://e.com/login");

        let logged_in = probe
            .is_logged_in(&http, &HashMap::new(), &creds)
            .await
            .unwrap();
        assert!(!logged_in);
        // No network traffic without a probe URL
        assert_eq!(http.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_marker_probe_finds_marker_case_insensitive() {
        let http = FixedResponse::new(200, "<a href=\"/logout\">Log Out</a>");
        let probe = LoginProbe::body_marker();
        let creds = probe_creds().with_probe_marker("log out");

        let logged_in = probe
            .is_logged_in(&http, &HashMap::new(), &creds)
            .await
            .unwrap();
        assert!(logged_in);
    }

    #[tokio::test]
    async fn test_marker_probe_missing_marker_errors() {
        let http = FixedResponse::new(200, "");
        let probe = LoginProbe::body_marker();

        let err = probe
            .is_logged_in(&http, &HashMap::new(), &probe_creds())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProbeMisconfigured { missing } if missing == "probe marker"));
    }

    #[tokio::test]
    async fn test_marker_probe_missing_url_errors() {
        let http = FixedResponse::new(200, "");
        let probe = LoginProbe::body_marker();
        let creds = LoginCredentials::new("https://e.com/login").with_probe_marker("log out");

        let err = probe
            .is_logged_in(&http, &HashMap::new(), &creds)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProbeMisconfigured { missing } if missing == "probe URL"));
    }

    #[tokio::test]
    async fn test_empty_probe_url_treated_as_absent() {
        let http = FixedResponse::new(302, "");
        let probe = LoginProbe::redirect();
        let creds = LoginCredentials::new("https://e.com/login").with_probe_url("");

        let logged_in = probe
            .is_logged_in(&http, &HashMap::new(), &creds)
            .await
            .unwrap();
        assert!(!logged_in);
    }
}
