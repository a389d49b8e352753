//! Authenticated VCS API client exposed to scripts as `ctx.vcs`.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use rhai::{Dynamic, Engine, EvalAltResult};
use tracing::debug;

/// Default API endpoint when the host does not override it.
const DEFAULT_API_URL: &str = "https://api.github.com";

/// Environment override for the API endpoint.
pub const API_URL_VAR: &str = "ACTION_API_URL";

/// Token-authenticated REST client.
///
/// The script bridge is synchronous, so requests go through a blocking
/// HTTP client. The client is built lazily on first use: construction
/// stays free of I/O, and the first request happens on the invocation's
/// dedicated blocking thread.
#[derive(Clone)]
pub struct VcsClient {
    inner: Arc<Inner>,
}

struct Inner {
    base_url: String,
    token: String,
    verbose: bool,
    http: OnceCell<reqwest::blocking::Client>,
}

impl VcsClient {
    /// Build a client from the validated token. `verbose` mirrors the
    /// run's debug flag and logs each request and response status.
    pub fn new(token: impl Into<String>, verbose: bool) -> Self {
        let base_url = std::env::var(API_URL_VAR)
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            inner: Arc::new(Inner {
                base_url,
                token: token.into(),
                verbose,
                http: OnceCell::new(),
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn http(&self) -> Result<&reqwest::blocking::Client, String> {
        self.inner.http.get_or_try_init(|| {
            reqwest::blocking::Client::builder()
                .user_agent(concat!("scriptact/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| format!("failed to build http client: {e}"))
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.inner.base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        }
    }

    fn get_json(&self, path: &str) -> Result<serde_json::Value, String> {
        let url = self.url(path);
        if self.inner.verbose {
            debug!(%url, "vcs GET");
        }
        let response = self
            .http()?
            .get(&url)
            .bearer_auth(&self.inner.token)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| format!("request to {url} failed: {e}"))?;
        self.decode(url, response)
    }

    fn post_json(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value, String> {
        let url = self.url(path);
        if self.inner.verbose {
            debug!(%url, "vcs POST");
        }
        let response = self
            .http()?
            .post(&url)
            .bearer_auth(&self.inner.token)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .map_err(|e| format!("request to {url} failed: {e}"))?;
        self.decode(url, response)
    }

    fn decode(
        &self,
        url: String,
        response: reqwest::blocking::Response,
    ) -> Result<serde_json::Value, String> {
        let status = response.status();
        if self.inner.verbose {
            debug!(%url, %status, "vcs response");
        }
        if !status.is_success() {
            return Err(format!("{url} returned {status}"));
        }
        response
            .json()
            .map_err(|e| format!("invalid JSON from {url}: {e}"))
    }
}

/// Register the client type and its script-facing methods.
pub(crate) fn register(engine: &mut Engine) {
    engine.register_type_with_name::<VcsClient>("VcsClient");

    engine.register_fn(
        "get",
        |client: &mut VcsClient, path: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            let value = client
                .get_json(path)
                .map_err(|e| -> Box<EvalAltResult> { e.into() })?;
            rhai::serde::to_dynamic(value)
        },
    );

    engine.register_fn(
        "post",
        |client: &mut VcsClient, path: &str, body: Dynamic| -> Result<Dynamic, Box<EvalAltResult>> {
            let body = serde_json::to_value(&body).map_err(|e| -> Box<EvalAltResult> {
                format!("request body is not serializable: {e}").into()
            })?;
            let value = client
                .post_json(path, body)
                .map_err(|e| -> Box<EvalAltResult> { e.into() })?;
            rhai::serde::to_dynamic(value)
        },
    );
}
