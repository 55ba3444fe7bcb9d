//! HTTP client capability boundary
//!
//! The session controller talks to the network through [`HttpCapability`],
//! a small trait covering exactly what the session lifecycle needs: GET
//! with controllable redirect behavior, form POST, and moving the cookie
//! jar in and out as an opaque blob. [`ReqwestCapability`] is the
//! production implementation; tests substitute their own.

use crate::{Error, Result, config::NetworkSettings, types::HttpResponse};
use async_trait::async_trait;
use cookie_store::CookieStore;
use reqwest::{Client, Proxy, redirect};
use reqwest_cookie_store::CookieStoreMutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Transport capability required by the session controller.
///
/// Implementations apply their own connect/read timeouts; the session core
/// neither imposes nor overrides them. Transport errors must be returned
/// as-is, never retried.
#[async_trait]
pub trait HttpCapability: Send + Sync {
    /// Issue a GET request with the given client-level headers.
    /// `allow_redirects` controls whether 3xx responses are followed.
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        allow_redirects: bool,
    ) -> Result<HttpResponse>;

    /// Issue a form-encoded POST request (redirects followed).
    async fn post_form(
        &self,
        url: &str,
        form: &HashMap<String, String>,
        headers: &HashMap<String, String>,
    ) -> Result<HttpResponse>;

    /// Export the cookie jar as an opaque JSON blob for snapshotting.
    fn export_cookies(&self) -> Result<serde_json::Value>;

    /// Replace the cookie jar from a previously exported blob.
    /// `null` is accepted and resets to an empty jar.
    fn import_cookies(&self, cookies: &serde_json::Value) -> Result<()>;
}

/// Production capability backed by reqwest.
///
/// reqwest fixes the redirect policy per client, so two clients are built
/// over one shared cookie store: the default one follows redirects, the
/// probe one does not.
#[derive(Debug, Clone)]
pub struct ReqwestCapability {
    /// Client with the default redirect policy
    client: Client,
    /// Client with redirects disabled, used by the login probe
    no_redirect_client: Client,
    /// Cookie store shared by both clients
    jar: Arc<CookieStoreMutex>,
}

impl ReqwestCapability {
    /// Build the capability from network settings.
    pub fn new(network: &NetworkSettings) -> Result<Self> {
        let jar = Arc::new(CookieStoreMutex::new(CookieStore::default()));

        let client = build_client(network, Arc::clone(&jar), true)?;
        let no_redirect_client = build_client(network, Arc::clone(&jar), false)?;

        Ok(Self {
            client,
            no_redirect_client,
            jar,
        })
    }

    /// Convert a reqwest response into the capability's plain data form.
    async fn into_http_response(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(text) = value.to_str() {
                headers.insert(name.as_str().to_string(), text.to_string());
            }
        }

        let body = response.text().await?;
        Ok(HttpResponse::new(status, headers, body))
    }
}

/// Build a reqwest client over the shared cookie store.
fn build_client(
    network: &NetworkSettings,
    jar: Arc<CookieStoreMutex>,
    follow_redirects: bool,
) -> Result<Client> {
    let mut builder = Client::builder()
        .cookie_provider(jar)
        .connect_timeout(Duration::from_secs(network.connect_timeout))
        .timeout(Duration::from_secs(network.request_timeout))
        .redirect(if follow_redirects {
            redirect::Policy::default()
        } else {
            redirect::Policy::none()
        });

    if !network.user_agent.is_empty() {
        builder = builder.user_agent(&network.user_agent);
    }

    for (scheme, proxy_url) in &network.proxies {
        let proxy = match scheme.as_str() {
            "http" => Proxy::http(proxy_url),
            "https" => Proxy::https(proxy_url),
            _ => Proxy::all(proxy_url),
        }
        .map_err(|e| {
            Error::config(
                format!("network.proxies.{scheme}"),
                format!("invalid proxy URL '{proxy_url}': {e}"),
            )
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| Error::config("network", format!("failed to build HTTP client: {e}")))
}

#[async_trait]
impl HttpCapability for ReqwestCapability {
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        allow_redirects: bool,
    ) -> Result<HttpResponse> {
        let client = if allow_redirects {
            &self.client
        } else {
            &self.no_redirect_client
        };

        let mut request = client.get(url);
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        Self::into_http_response(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &HashMap<String, String>,
        headers: &HashMap<String, String>,
    ) -> Result<HttpResponse> {
        let mut request = self.client.post(url).form(form);
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        Self::into_http_response(response).await
    }

    fn export_cookies(&self) -> Result<serde_json::Value> {
        let store = self
            .jar
            .lock()
            .map_err(|_| Error::internal("cookie store lock poisoned"))?;

        let mut buffer = Vec::new();
        // Session cookies carry the login, so non-persistent entries are
        // included deliberately.
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut buffer)
            .map_err(|e| Error::internal(format!("cookie export failed: {e}")))?;

        serde_json::from_slice(&buffer)
            .map_err(|e| Error::internal(format!("cookie export produced invalid JSON: {e}")))
    }

    fn import_cookies(&self, cookies: &serde_json::Value) -> Result<()> {
        let store = if cookies.is_null() {
            CookieStore::default()
        } else {
            let raw = serde_json::to_vec(cookies)
                .map_err(|e| Error::corrupt_cache(format!("cookie blob unreadable: {e}")))?;
            cookie_store::serde::json::load_all(raw.as_slice())
                .map_err(|e| Error::corrupt_cache(format!("cookie blob rejected: {e}")))?
        };

        let mut guard = self
            .jar
            .lock()
            .map_err(|_| Error::internal("cookie store lock poisoned"))?;
        *guard = store;
        Ok(())
    }
}
