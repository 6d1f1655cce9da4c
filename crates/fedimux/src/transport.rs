// Shared transport configuration for building reqwest::Client instances.
//
// Both dialect clients share base URL, credential, TLS, and timeout settings
// through this module. There is no process-wide default server: every client
// is constructed from an explicit config.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = concat!("fedimux/", env!("CARGO_PKG_VERSION"));

/// Connection settings for one backend server.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Server root, e.g. `https://mastodon.example` or `https://misskey.example`.
    pub base_url: Url,
    /// Access token attached to every request. `None` for the few endpoints
    /// that work unauthenticated.
    pub token: Option<SecretString>,
    /// Per-request timeout. Default: 30s.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Accept self-signed certificates (for private test instances).
    pub accept_invalid_certs: bool,
}

impl TransportConfig {
    /// Config for `base_url` with an access token and default settings.
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self {
            base_url,
            token: Some(SecretString::from(token.into())),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
        }
    }

    /// Config for `base_url` without credentials.
    pub fn unauthenticated(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
        }
    }

    /// The raw token value, if configured.
    pub(crate) fn expose_token(&self) -> Option<&str> {
        self.token.as_ref().map(ExposeSecret::expose_secret)
    }

    /// Build a plain `reqwest::Client` from this config.
    ///
    /// Used by the Misskey-dialect client, which carries the token in every
    /// request body rather than in a header.
    pub(crate) fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.builder().build().map_err(Error::Transport)
    }

    /// Build a `reqwest::Client` with an `Authorization: Bearer` default
    /// header. Used by the Mastodon-dialect client.
    pub(crate) fn build_bearer_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = self.expose_token() {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::Argument {
                    message: format!("access token is not a valid header value: {e}"),
                })?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        self.builder()
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }

    fn builder(&self) -> reqwest::ClientBuilder {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone());
        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder
    }

    /// The streaming root: `base_url` with its scheme switched to `ws`/`wss`.
    pub(crate) fn ws_base(&self) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            other => {
                return Err(Error::StreamConnect(format!(
                    "cannot derive a WebSocket URL from scheme {other:?}"
                )));
            }
        };
        url.set_scheme(scheme)
            .map_err(|()| Error::StreamConnect("base URL cannot carry a scheme".into()))?;
        Ok(url)
    }
}
