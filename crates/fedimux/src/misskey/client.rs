// Misskey-dialect RPC client
//
// Every call is `POST /api/{endpoint}` with a JSON body carrying the access
// token as `"i"`. This module owns the transport mechanics (token injection,
// the nested error envelope, façade-level cancellation); the unified
// operations live in sibling files.

use serde::de::DeserializeOwned;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use super::entities::ApiError;
use crate::capability::{self, Operation};
use crate::error::Error;
use crate::paging::Pagination;
use crate::streaming::{ReconnectConfig, StreamingHandle, Subscription};
use crate::transport::TransportConfig;

/// Operations with no equivalent concept on this dialect. Declared ahead of
/// time: calling any of these rejects before any network I/O.
pub(crate) const UNSUPPORTED: &[Operation] = &[
    Operation::BookmarkStatus,
    Operation::UnbookmarkStatus,
    Operation::GetBookmarks,
    Operation::GetScheduledStatuses,
    Operation::GetDomainBlocks,
    Operation::BlockDomain,
    Operation::GetFilters,
    Operation::GetMarkers,
    Operation::SaveMarkers,
    Operation::GetConversationTimeline,
];

/// Client façade for a Misskey-dialect server.
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
        let http = config.build_client()?;
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

    /// The rejection path for operations in [`UNSUPPORTED`]. Kept separate
    /// from [`gate`](Self::gate) so stub methods read as one line and the
    /// table stays the single source of truth.
    pub(crate) fn unsupported<T>(op: Operation) -> Result<T, Error> {
        debug_assert!(
            UNSUPPORTED.contains(&op),
            "{op} is not in the unsupported table"
        );
        Err(Error::NotSupported(op))
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, Error> {
        self.config
            .base_url
            .join(&format!("/api/{endpoint}"))
            .map_err(Error::InvalidUrl)
    }

    /// Issue one RPC call and decode the JSON response.
    ///
    /// `body` must be a JSON object; the access token is injected as `"i"`.
    pub(crate) async fn api<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T, Error> {
        let url = self.endpoint_url(endpoint)?;
        debug!("POST {url}");
        let body = self.with_token(body)?;

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = async {
                let resp = self
                    .http
                    .post(url)
                    .json(&body)
                    .send()
                    .await
                    .map_err(Error::Transport)?;
                let status = resp.status();
                let text = resp.text().await.map_err(Error::Transport)?;
                if !status.is_success() {
                    return Err(decode_error(status.as_u16(), &text));
                }
                serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body: text,
                })
            } => result,
        }
    }

    /// Like [`api`](Self::api) but for endpoints that respond `204 No
    /// Content` (or whose body the operation discards).
    pub(crate) async fn api_unit(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<(), Error> {
        let url = self.endpoint_url(endpoint)?;
        debug!("POST {url}");
        let body = self.with_token(body)?;

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = async {
                let resp = self
                    .http
                    .post(url)
                    .json(&body)
                    .send()
                    .await
                    .map_err(Error::Transport)?;
                let status = resp.status();
                if status.is_success() {
                    return Ok(());
                }
                let text = resp.text().await.map_err(Error::Transport)?;
                Err(decode_error(status.as_u16(), &text))
            } => result,
        }
    }

    /// Issue one multipart RPC call (drive uploads).
    pub(crate) async fn api_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        mut form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        let url = self.endpoint_url(endpoint)?;
        debug!("POST {url} (multipart)");
        if let Some(token) = self.config.expose_token() {
            form = form.text("i", token.to_string());
        }

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = async {
                let resp = self
                    .http
                    .post(url)
                    .multipart(form)
                    .send()
                    .await
                    .map_err(Error::Transport)?;
                let status = resp.status();
                let text = resp.text().await.map_err(Error::Transport)?;
                if !status.is_success() {
                    return Err(decode_error(status.as_u16(), &text));
                }
                serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body: text,
                })
            } => result,
        }
    }

    fn with_token(&self, mut body: serde_json::Value) -> Result<serde_json::Value, Error> {
        let obj = body.as_object_mut().ok_or_else(|| Error::Argument {
            message: "RPC body must be a JSON object".into(),
        })?;
        if let Some(token) = self.config.expose_token() {
            obj.insert("i".into(), json!(token));
        }
        Ok(body)
    }
}

/// Decode the `{"error": {"message", "code"}}` envelope, falling back to the
/// raw body.
fn decode_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ApiError>(body).map_or_else(
        |_| body.to_string(),
        |e| match e.error.code {
            Some(code) => format!("{} ({code})", e.error.message),
            None => e.error.message,
        },
    );
    Error::Api { status, message }
}

/// Insert caller-supplied pagination parameters into an RPC body. `max_id`
/// maps to `untilId`; `since_id` and `min_id` both map to `sinceId`, the
/// closest cursor this dialect has, so supplying both is a contradiction and
/// rejects with [`Error::Argument`]. Omitted parameters are never encoded.
pub(crate) fn page_body(page: &Pagination, body: &mut serde_json::Value) -> Result<(), Error> {
    if page.since_id.is_some() && page.min_id.is_some() {
        return Err(Error::Argument {
            message: "since_id and min_id both map to sinceId on this dialect; supply one".into(),
        });
    }
    let Some(obj) = body.as_object_mut() else {
        return Ok(());
    };
    if let Some(limit) = page.limit {
        obj.insert("limit".into(), json!(limit));
    }
    if let Some(ref max_id) = page.max_id {
        obj.insert("untilId".into(), json!(max_id));
    }
    if let Some(ref since_id) = page.since_id {
        obj.insert("sinceId".into(), json!(since_id));
    }
    if let Some(ref min_id) = page.min_id {
        obj.insert("sinceId".into(), json!(min_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_body_encodes_only_supplied_parameters() {
        let mut body = json!({});
        page_body(&Pagination::default(), &mut body).expect("empty window");
        assert_eq!(body, json!({}));

        let mut body = json!({});
        page_body(
            &Pagination {
                limit: Some(40),
                max_id: Some("9abc".into()),
                ..Pagination::default()
            },
            &mut body,
        )
        .expect("supported window");
        assert_eq!(body, json!({ "limit": 40, "untilId": "9abc" }));
    }

    #[test]
    fn page_body_rejects_both_forward_cursors() {
        let mut body = json!({});
        let err = page_body(
            &Pagination {
                since_id: Some("9a".into()),
                min_id: Some("9b".into()),
                ..Pagination::default()
            },
            &mut body,
        )
        .expect_err("both forward cursors collapse onto sinceId");
        assert!(matches!(err, Error::Argument { .. }));
        // Nothing was encoded before the rejection.
        assert_eq!(body, json!({}));
    }

    #[test]
    fn error_envelope_includes_the_code() {
        let err = decode_error(
            400,
            r#"{"error":{"message":"No such note.","code":"NO_SUCH_NOTE","id":"x"}}"#,
        );
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "No such note. (NO_SUCH_NOTE)");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
