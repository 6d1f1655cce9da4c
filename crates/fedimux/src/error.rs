use thiserror::Error;

use crate::capability::Operation;

/// Top-level error type for the `fedimux` crate.
///
/// Covers every failure mode across both dialect clients and the streaming
/// subsystem. Streaming *parse* failures are deliberately absent: a bad frame
/// is isolated as a [`StreamingEvent::ParseError`](crate::streaming::StreamingEvent)
/// and never surfaces through this type.
#[derive(Debug, Error)]
pub enum Error {
    // ── Capability ──────────────────────────────────────────────────
    /// The backend has no equivalent of the requested operation.
    ///
    /// Known per backend ahead of time; raised before any network I/O.
    #[error("operation not supported by this backend: {0}")]
    NotSupported(Operation),

    /// Caller supplied insufficient or contradictory parameters for an
    /// operation the backend otherwise supports.
    #[error("invalid argument: {message}")]
    Argument { message: String },

    // ── Conversion ──────────────────────────────────────────────────
    /// A backend response carried data outside the converter's known value
    /// space (e.g. an unmapped visibility). Indicates a protocol or version
    /// mismatch, not a user error.
    #[error("unexpected value in `{field}`: {value:?}")]
    UnexpectedValue { field: &'static str, value: String },

    // ── Cancellation ────────────────────────────────────────────────
    /// The caller withdrew the request via the client's cancellation handle
    /// before it completed.
    #[error("request cancelled")]
    Cancelled,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response, message decoded from the dialect's error body
    /// (Mastodon `{"error": ..}`, Misskey `{"error": {"message", "code"}}`).
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Streaming ───────────────────────────────────────────────────
    /// WebSocket connection or handshake failed. Terminal subscription
    /// shutdown is not an error: it surfaces as the `Close` streaming event.
    #[error("stream connection failed: {0}")]
    StreamConnect(String),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            Self::StreamConnect(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the failure was caused by the capability gate,
    /// i.e. the backend genuinely lacks the concept.
    pub fn is_capability_gap(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }
}
