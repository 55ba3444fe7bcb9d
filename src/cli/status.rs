//! Status mode CLI logic
//!
//! Reports the cache and login state for a site without changing anything
//! (beyond the probe GET, when a probe URL is given).

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use crate::{CacheStore, Session, SessionState, cli};

/// Arguments for status mode
#[derive(Debug)]
pub struct StatusArgs {
    pub site: String,
    pub probe_url: Option<String>,
    pub marker: Option<String>,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

/// JSON document printed by status mode
#[derive(Debug, Serialize)]
struct StatusReport {
    site: String,
    state: &'static str,
    cache_path: PathBuf,
    cache_exists: bool,
    cache_age_seconds: Option<i64>,
    logged_in: Option<bool>,
}

/// Run status mode with the given arguments.
pub async fn run_status_mode(args: StatusArgs) -> Result<()> {
    cli::init_logging(args.verbose);

    let settings = cli::load_settings(args.config.as_ref())?;
    let session = Session::connect(&args.site, settings)
        .await?
        .with_probe(cli::probe_for(args.marker.as_ref()));

    debug!("Session constructed, state {:?}", session.state());

    // Only probe when asked to; a bare status stays offline
    let logged_in = match &args.probe_url {
        Some(probe_url) => {
            let credentials = cli::build_credentials(
                probe_url,
                Default::default(),
                Some(probe_url),
                args.marker.as_ref(),
            );
            Some(session.is_logged_in(&credentials).await?)
        }
        None => None,
    };

    let store = CacheStore::new(session.cache_path().to_path_buf());
    let report = StatusReport {
        site: args.site,
        state: match session.state() {
            SessionState::Fresh => "fresh",
            SessionState::Restored => "restored",
            SessionState::LoggedIn => "logged_in",
        },
        cache_path: session.cache_path().to_path_buf(),
        cache_exists: store.exists(),
        cache_age_seconds: store.age_seconds().ok(),
        logged_in,
    };

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
