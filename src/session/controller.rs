//! Session controller
//!
//! Ties the pieces together: on construction it tries to restore state from
//! the cache file, afterwards it routes requests through the HTTP capability
//! and re-persists the session according to the configured trigger policy.
//!
//! One controller instance is one logical session. No internal locking
//! beyond the cookie store mutex inside the capability; callers issue at
//! most one request at a time.

use crate::{
    Error, Result,
    cache::{CacheStore, CacheTrigger, Operation, default_cache_path, should_persist},
    config::Settings,
    session::{
        SessionSnapshot,
        http::{HttpCapability, ReqwestCapability},
        probe::LoginProbe,
    },
    types::{HttpResponse, LoginCredentials, LoginOutcome},
};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

/// Where the session state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Started empty, nothing restored from disk
    Fresh,
    /// State adopted from a valid, fresh cache file
    Restored,
    /// A login probe or login attempt confirmed authentication
    LoggedIn,
}

/// Persistent HTTP session over a pluggable transport.
///
/// Use the [`Session`] alias for the reqwest-backed default;
/// `SessionGeneric` exists so tests and embedders can substitute their own
/// [`HttpCapability`].
#[derive(Debug)]
pub struct SessionGeneric<C: HttpCapability = ReqwestCapability> {
    http: C,
    store: CacheStore,
    trigger: CacheTrigger,
    timeout_secs: u64,
    /// Client-level headers sent with every request and persisted in the
    /// snapshot
    headers: HashMap<String, String>,
    /// Proxy map recorded in the snapshot (applied to the transport at
    /// construction time)
    proxies: HashMap<String, String>,
    probe: LoginProbe,
    state: SessionState,
}

/// Reqwest-backed persistent session.
pub type Session = SessionGeneric<ReqwestCapability>;

impl Session {
    /// Connect to a site: build the transport from `settings` and attempt a
    /// cache restore.
    ///
    /// Cache problems never fail construction; only invalid settings or an
    /// unusable site URL do.
    pub async fn connect(site_url: &str, settings: Settings) -> Result<Self> {
        settings.validate()?;
        let http = ReqwestCapability::new(&settings.network)?;
        Self::with_capability(site_url, settings, http).await
    }
}

impl<C: HttpCapability> SessionGeneric<C> {
    /// Build a session over a caller-supplied transport.
    pub async fn with_capability(site_url: &str, settings: Settings, http: C) -> Result<Self> {
        let url = Url::parse(site_url)?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::config("site_url", format!("no host in '{site_url}'")))?;

        let cache_path = settings
            .cache
            .file_path
            .clone()
            .unwrap_or_else(|| default_cache_path(host));

        let mut headers = HashMap::new();
        if !settings.network.user_agent.is_empty() {
            headers.insert(
                "user-agent".to_string(),
                settings.network.user_agent.clone(),
            );
        }

        let mut session = Self {
            http,
            store: CacheStore::new(cache_path),
            trigger: settings.cache.trigger,
            timeout_secs: settings.cache.timeout_secs,
            headers,
            proxies: settings.network.proxies.clone(),
            probe: LoginProbe::default(),
            state: SessionState::Fresh,
        };
        session.try_restore().await;
        Ok(session)
    }

    /// Replace the login probe (the default is redirect-based detection).
    pub fn with_probe(mut self, probe: LoginProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Restore state from the cache file if it is present and fresh.
    ///
    /// Every failure mode (absent, expired, corrupt, foreign blob, I/O,
    /// unusable cookie data) degrades to the fresh state. Negative age means
    /// the clock moved backwards past the file's mtime and counts as fresh.
    async fn try_restore(&mut self) {
        if !self.store.exists() {
            debug!("No session cache at {:?}, starting fresh", self.store.path());
            return;
        }

        let age = match self.store.age_seconds() {
            Ok(age) => age,
            Err(e) => {
                warn!("Could not read cache age, starting fresh: {e}");
                return;
            }
        };
        if age >= self.timeout_secs as i64 {
            info!(
                "Session cache expired ({age}s >= {}s), starting fresh",
                self.timeout_secs
            );
            return;
        }

        let snapshot = match self.store.read().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Unusable session cache, starting fresh: {e}");
                return;
            }
        };
        if let Err(e) = self.http.import_cookies(&snapshot.cookies) {
            warn!("Cached cookies rejected, starting fresh: {e}");
            return;
        }

        self.headers = snapshot.headers;
        self.state = SessionState::Restored;
        info!("Session restored from {:?} (age {age}s)", self.store.path());
    }

    /// Log in, or confirm an existing login.
    ///
    /// Without `force`, the probe runs first and an authenticated session
    /// short-circuits to `AlreadyLoggedIn` with no POST. Otherwise the
    /// payload is POSTed to the login URL and the probe decides between
    /// `Success` and `Failure`. Only `Success` consults the persistence
    /// policy; `Failure` never writes.
    pub async fn login(
        &mut self,
        credentials: &LoginCredentials,
        force: bool,
    ) -> Result<LoginOutcome> {
        if !force && self.is_logged_in(credentials).await? {
            debug!("Probe confirmed existing session, skipping login POST");
            self.state = SessionState::LoggedIn;
            return Ok(LoginOutcome::already_logged_in());
        }

        info!("Logging in via {}", credentials.login_url);
        let response = self
            .http
            .post_form(&credentials.login_url, credentials.payload(), &self.headers)
            .await?;

        if self.is_logged_in(credentials).await? {
            self.state = SessionState::LoggedIn;
            self.persist_after(Operation::Login).await?;
            Ok(LoginOutcome::success(response))
        } else {
            warn!("Login POST did not establish a session");
            Ok(LoginOutcome::failure(response))
        }
    }

    /// Probe the current login state without changing it.
    pub async fn is_logged_in(&self, credentials: &LoginCredentials) -> Result<bool> {
        self.probe
            .is_logged_in(&self.http, &self.headers, credentials)
            .await
    }

    /// GET through the session. The request completes before any cache
    /// write; transport errors propagate without touching the cache.
    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.http.get(url, &self.headers, true).await?;
        self.persist_after(Operation::Request).await?;
        Ok(response)
    }

    /// Form-encoded POST through the session. Same ordering guarantees as
    /// [`get`](Self::get).
    pub async fn post(&self, url: &str, form: &HashMap<String, String>) -> Result<HttpResponse> {
        let response = self.http.post_form(url, form, &self.headers).await?;
        self.persist_after(Operation::Post).await?;
        Ok(response)
    }

    /// Write the snapshot now, regardless of the trigger policy. The only
    /// write path under `Manual`.
    pub async fn cache_now(&self) -> Result<()> {
        let cookies = self.http.export_cookies()?;
        let snapshot = SessionSnapshot::new(self.headers.clone(), self.proxies.clone(), cookies);
        self.store.write(&snapshot).await
    }

    /// Persist if the policy says this completed operation should. A failed
    /// write surfaces as `CachePersist` but leaves the in-memory session
    /// fully usable.
    async fn persist_after(&self, operation: Operation) -> Result<()> {
        if should_persist(self.trigger, operation) {
            self.cache_now().await?;
        }
        Ok(())
    }

    /// Set a client-level header for subsequent requests (persisted with
    /// the snapshot).
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    /// Current client-level headers.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Where the session state came from.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Path of the cache file backing this session.
    pub fn cache_path(&self) -> &Path {
        self.store.path()
    }
}
