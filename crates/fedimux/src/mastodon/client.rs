// Mastodon-dialect HTTP client
//
// Wraps `reqwest::Client` with bearer auth, the `{"error": ..}` error
// envelope, and façade-level cancellation. The unified operations are
// implemented as inherent methods in sibling files (accounts, statuses,
// timelines, lists, media, moderation) to keep this module focused on
// transport mechanics.

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use super::entities::ApiError;
use crate::capability::{self, Operation};
use crate::error::Error;
use crate::paging::Pagination;
use crate::streaming::{ReconnectConfig, StreamingHandle, Subscription};
use crate::transport::TransportConfig;

/// Operations with no equivalent on this dialect: none — the unified
/// operation set descends from it. Declared anyway so the capability gate
/// stays data-driven on both backends.
pub(crate) const UNSUPPORTED: &[Operation] = &[];

/// Client façade for a Mastodon-dialect server.
///
/// One instance per server+credential. Holds a cancellation handle shared by
/// every request issued through this instance; independent instances never
/// affect each other.
pub struct Client {
    http: reqwest::Client,
    config: TransportConfig,
    cancel: CancellationToken,
}

impl Client {
    /// Build a client from explicit transport configuration.
    pub fn new(config: TransportConfig) -> Result<Self, Error> {
        let http = config.build_bearer_client()?;
        Ok(Self {
            http,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Abort every request currently in flight on this instance.
    ///
    /// In-flight calls fail with [`Error::Cancelled`], as do any calls issued
    /// afterwards — a cancelled client is spent. Streaming subscriptions are
    /// unaffected; close those through their own handles.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Open a streaming subscription.
    ///
    /// The returned handle owns its own connection and its own cancellation,
    /// independent of this client's request cancellation.
    pub fn stream(
        &self,
        subscription: Subscription,
        reconnect: ReconnectConfig,
    ) -> Result<StreamingHandle, Error> {
        let codec = super::streaming::Codec::new(&self.config, &subscription)?;
        Ok(StreamingHandle::spawn(codec, reconnect))
    }

    pub(crate) fn gate(&self, op: Operation) -> Result<(), Error> {
        capability::gate(UNSUPPORTED, op)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        self.config.base_url.join(path).map_err(Error::InvalidUrl)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");
        self.send(self.http.get(url).query(query)).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");
        self.send(self.http.post(url).json(body)).await
    }

    pub(crate) async fn post_unit(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");
        self.send_unit(self.http.post(url).json(body)).await
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url} (multipart)");
        self.send(self.http.post(url).multipart(form)).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");
        self.send(self.http.put(url).json(body)).await
    }

    pub(crate) async fn delete_unit(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");
        let mut request = self.http.delete(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send_unit(request).await
    }

    /// Run one request under this façade's cancellation handle and decode
    /// the JSON response body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = async {
                let resp = request.send().await.map_err(Error::Transport)?;
                let status = resp.status();
                let body = resp.text().await.map_err(Error::Transport)?;
                if !status.is_success() {
                    return Err(decode_error(status.as_u16(), &body));
                }
                serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body,
                })
            } => result,
        }
    }

    /// Like [`send`](Self::send) but discards the response body.
    async fn send_unit(&self, request: reqwest::RequestBuilder) -> Result<(), Error> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = async {
                let resp = request.send().await.map_err(Error::Transport)?;
                let status = resp.status();
                if status.is_success() {
                    return Ok(());
                }
                let body = resp.text().await.map_err(Error::Transport)?;
                Err(decode_error(status.as_u16(), &body))
            } => result,
        }
    }
}

/// Decode the `{"error": ..}` envelope, falling back to the raw body.
fn decode_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ApiError>(body)
        .map_or_else(|_| body.to_string(), |e| e.error);
    Error::Api { status, message }
}

/// Append caller-supplied pagination parameters to a query. Omitted
/// parameters are never encoded.
pub(crate) fn page_query(page: &Pagination, query: &mut Vec<(&'static str, String)>) {
    if let Some(limit) = page.limit {
        query.push(("limit", limit.to_string()));
    }
    if let Some(ref max_id) = page.max_id {
        query.push(("max_id", max_id.clone()));
    }
    if let Some(ref since_id) = page.since_id {
        query.push(("since_id", since_id.clone()));
    }
    if let Some(ref min_id) = page.min_id {
        query.push(("min_id", min_id.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_encodes_only_supplied_parameters() {
        let mut query = Vec::new();
        page_query(&Pagination::default(), &mut query);
        assert!(query.is_empty());

        let mut query = Vec::new();
        page_query(
            &Pagination {
                limit: Some(20),
                max_id: Some("123".into()),
                ..Pagination::default()
            },
            &mut query,
        );
        assert_eq!(
            query,
            vec![("limit", "20".to_string()), ("max_id", "123".to_string())]
        );
    }

    #[test]
    fn error_envelope_is_decoded() {
        let err = decode_error(422, r#"{"error":"Validation failed"}"#);
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Validation failed");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn opaque_error_body_is_passed_through() {
        let err = decode_error(502, "Bad Gateway");
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
