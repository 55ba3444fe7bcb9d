//! Command-line interface logic
//!
//! The binary is a thin driver over the library: `status` reports the
//! cache/login state for a site, `login` performs a login. Results go to
//! stdout as JSON, logs to stderr.

pub mod login;
pub mod status;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{ConfigLoader, LoginCredentials, LoginProbe, ProbeStrategy, Settings};
use std::collections::HashMap;
use std::path::PathBuf;

pub use login::{LoginArgs, run_login_mode};
pub use status::{StatusArgs, run_status_mode};

/// Initialize logging to stderr, keeping stdout clean for JSON output.
pub(crate) fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load settings honoring an explicit config file path, falling back to
/// the discovered default location.
pub(crate) fn load_settings(config: Option<&PathBuf>) -> Result<Settings> {
    let discovered;
    let path = match config {
        Some(path) => Some(path.as_path()),
        None => {
            discovered = ConfigLoader::get_config_path();
            discovered.as_deref()
        }
    };
    let settings = ConfigLoader::new().load(path)?;
    Ok(settings)
}

/// Parse repeated `key=value` form fields.
pub(crate) fn parse_form_fields(fields: &[String]) -> Result<HashMap<String, String>> {
    let mut payload = HashMap::new();
    for field in fields {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid form field '{field}', expected key=value"))?;
        payload.insert(key.to_string(), value.to_string());
    }
    Ok(payload)
}

/// Build credentials from CLI options. A marker switches detection to
/// marker mode.
pub(crate) fn build_credentials(
    login_url: &str,
    payload: HashMap<String, String>,
    probe_url: Option<&String>,
    marker: Option<&String>,
) -> LoginCredentials {
    let mut credentials = LoginCredentials::new(login_url).with_payload(payload);
    if let Some(url) = probe_url {
        credentials = credentials.with_probe_url(url);
    }
    if let Some(marker) = marker {
        credentials = credentials.with_probe_marker(marker);
    }
    credentials
}

/// Probe implied by the CLI options.
pub(crate) fn probe_for(marker: Option<&String>) -> LoginProbe {
    if marker.is_some() {
        LoginProbe::new(ProbeStrategy::BodyMarker)
    } else {
        LoginProbe::new(ProbeStrategy::Redirect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_fields() {
        let fields = vec![
            "user=alice".to_string(),
            "password=s=cr=t".to_string(),
        ];
        let payload = parse_form_fields(&fields).unwrap();
        assert_eq!(payload.get("user"), Some(&"alice".to_string()));
        // Only the first '=' splits
        assert_eq!(payload.get("password"), Some(&"s=cr=t".to_string()));
    }

    #[test]
    fn test_parse_form_fields_rejects_bare_key() {
        let fields = vec!["no-equals-sign".to_string()];
        assert!(parse_form_fields(&fields).is_err());
    }

    #[test]
    fn test_marker_selects_body_marker_probe() {
        let marker = "log out".to_string();
        assert_eq!(
            probe_for(Some(&marker)).strategy(),
            ProbeStrategy::BodyMarker
        );
        assert_eq!(probe_for(None).strategy(), ProbeStrategy::Redirect);
    }

    #[test]
    fn test_build_credentials_with_probe() {
        let probe_url = "https://e.com/home".to_string();
        let credentials = build_credentials(
            "https://e.com/login",
            HashMap::new(),
            Some(&probe_url),
            None,
        );
        assert_eq!(credentials.probe_url.as_deref(), Some("https://e.com/home"));
        assert!(credentials.probe_marker.is_none());
    }
}
