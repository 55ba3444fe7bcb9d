//! Login mode CLI logic
//!
//! Performs a login against a site and reports the outcome as JSON. The
//! session cache is restored before and re-persisted after according to
//! the configured trigger policy.

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::{Error, LoginOutcome, LoginStatus, Session, cli};

/// Arguments for login mode
#[derive(Debug)]
pub struct LoginArgs {
    pub site: String,
    pub login_url: String,
    pub data: Vec<String>,
    pub probe_url: Option<String>,
    pub marker: Option<String>,
    pub force: bool,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

/// JSON document printed by login mode
#[derive(Debug, Serialize)]
struct LoginReport {
    status: LoginStatus,
    logged_in: bool,
    http_status: Option<u16>,
    cache_path: PathBuf,
}

/// Map the login result to report fields.
///
/// A cache write can only fail after the login itself succeeded, and it
/// leaves the in-memory session fully valid, so it is logged and the
/// report still says success. Everything else propagates.
fn login_report_fields(
    result: crate::Result<LoginOutcome>,
) -> Result<(LoginStatus, Option<u16>)> {
    match result {
        Ok(outcome) => {
            info!("Login finished: {}", outcome.status);
            Ok((outcome.status, outcome.response.map(|r| r.status)))
        }
        Err(Error::CachePersist { path, details }) => {
            warn!(
                "Failed to save session cache to {}: {}",
                path.display(),
                details
            );
            Ok((LoginStatus::Success, None))
        }
        Err(e) => Err(e.into()),
    }
}

/// Run login mode with the given arguments.
pub async fn run_login_mode(args: LoginArgs) -> Result<()> {
    cli::init_logging(args.verbose);

    let payload = cli::parse_form_fields(&args.data)?;
    let credentials = cli::build_credentials(
        &args.login_url,
        payload,
        args.probe_url.as_ref(),
        args.marker.as_ref(),
    );

    let settings = cli::load_settings(args.config.as_ref())?;
    let mut session = Session::connect(&args.site, settings)
        .await?
        .with_probe(cli::probe_for(args.marker.as_ref()));

    debug!(
        "Session constructed (state {:?}), attempting login",
        session.state()
    );
    let (status, http_status) =
        login_report_fields(session.login(&credentials, args.force).await)?;

    let logged_in = matches!(status, LoginStatus::Success | LoginStatus::AlreadyLoggedIn);
    let report = LoginReport {
        status,
        logged_in,
        http_status,
        cache_path: session.cache_path().to_path_buf(),
    };
    println!("{}", serde_json::to_string(&report)?);

    if !logged_in {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpResponse;
    use std::collections::HashMap;

    #[test]
    fn test_report_fields_from_success() {
        let outcome = LoginOutcome::success(HttpResponse::new(200, HashMap::new(), ""));
        let (status, http_status) = login_report_fields(Ok(outcome)).unwrap();
        assert_eq!(status, LoginStatus::Success);
        assert_eq!(http_status, Some(200));
    }

    #[test]
    fn test_cache_write_failure_still_reports_success() {
        // Persisting runs only after a confirmed login, so a failed write
        // must not turn the report into a failure
        let result = Err(Error::cache_persist("/tmp/site.session.json", "disk full"));
        let (status, http_status) = login_report_fields(result).unwrap();
        assert_eq!(status, LoginStatus::Success);
        assert_eq!(http_status, None);
    }

    #[test]
    fn test_transport_error_propagates() {
        let result = Err(Error::internal("connection refused"));
        assert!(login_report_fields(result).is_err());
    }
}
