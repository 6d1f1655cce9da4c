//! Resilient streaming subscriptions.
//!
//! Owns one persistent WebSocket per subscription and streams typed
//! [`StreamingEvent`]s through a [`tokio::sync::broadcast`] channel. The
//! connection lifecycle is an explicit state machine
//! (`Idle → Connecting → Connected ⇄ Reconnecting → Closed`) driven by a
//! bounded retry policy with jittered exponential backoff.
//!
//! Frame decoding is delegated to a per-dialect [`FrameCodec`]. A malformed
//! or unrecognized frame never terminates the connection: it is surfaced as
//! [`StreamingEvent::ParseError`] and processing continues with the next
//! frame. Frames are dispatched in arrival order, without batching.
//!
//! # Example
//!
//! ```rust,ignore
//! use fedimux::streaming::{ReconnectConfig, Subscription};
//!
//! let handle = client.stream(Subscription::User, ReconnectConfig::default())?;
//! let mut rx = handle.subscribe();
//!
//! while let Ok(event) = rx.recv().await {
//!     println!("{event:?}");
//! }
//!
//! handle.close();
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::entities::{Conversation, Notification, Status};
use crate::error::Error;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 1024;

// ── Events ───────────────────────────────────────────────────────────

/// One typed event delivered by a streaming subscription.
#[derive(Debug, Clone)]
pub enum StreamingEvent {
    /// Emitted once per successful (re)connection handshake.
    Connect,
    /// A new status appeared on the subscribed feed.
    Update(Status),
    /// An existing status was edited.
    StatusUpdate(Status),
    /// A notification addressed to the authenticated account.
    Notification(Notification),
    /// A direct-message conversation changed.
    Conversation(Conversation),
    /// A status was deleted; carries the status id.
    Delete(String),
    /// Liveness confirmation from the server.
    Heartbeat,
    /// One inbound frame could not be decoded. The connection stays up and
    /// later frames are unaffected.
    ParseError { reason: String, raw: String },
    /// Terminal. Emitted exactly once, on caller shutdown or after the
    /// retry budget is exhausted.
    Close,
}

// ── Subscription ─────────────────────────────────────────────────────

/// Which feed to subscribe to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// Home timeline plus notifications for the authenticated account.
    User,
    /// The public firehose; `local` restricts it to the home server.
    Public { local: bool },
    /// All public posts carrying a hashtag.
    Hashtag(String),
    /// Posts from the accounts in a list, by list id.
    List(String),
    /// Direct-message conversations.
    Direct,
}

// ── Connection state ─────────────────────────────────────────────────

/// Lifecycle state of a streaming subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Created but the background task has not attempted a connection yet.
    Idle,
    /// First connection attempt in progress.
    Connecting,
    /// Live; frames are flowing.
    Connected,
    /// Link lost; backoff/retry in progress.
    Reconnecting,
    /// Terminal.
    Closed,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Retry policy for a streaming subscription.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before the subscription closes.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,

    /// No frame (including liveness probes) within this window is treated
    /// as link loss and triggers a reconnect. Default: 60s.
    pub idle_timeout: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
            idle_timeout: Duration::from_secs(60),
        }
    }
}

// ── Dialect codec ────────────────────────────────────────────────────

/// Per-dialect wire protocol: where to connect, what to send on connect,
/// and how to decode inbound text frames.
///
/// `decode` is total: it never fails, it emits
/// [`StreamingEvent::ParseError`] for anything it cannot understand.
/// `Sync` is required because the connection loop holds the codec by
/// reference across await points inside a spawned task.
pub(crate) trait FrameCodec: Send + Sync + 'static {
    /// The WebSocket URL for this subscription.
    fn url(&self) -> &Url;

    /// Frames to send immediately after the handshake (e.g. channel-connect
    /// messages). Empty for dialects that encode the feed in the URL.
    fn connect_frames(&self) -> Vec<String> {
        Vec::new()
    }

    /// Decode one inbound text frame into zero or more events.
    fn decode(&self, text: &str) -> Vec<StreamingEvent>;
}

// ── StreamingHandle ──────────────────────────────────────────────────

/// Handle to one live feed subscription.
///
/// Closing the handle only affects this subscription; it never touches the
/// request cancellation of the client it came from.
pub struct StreamingHandle {
    event_rx: broadcast::Receiver<Arc<StreamingEvent>>,
    state_rx: watch::Receiver<StreamState>,
    cancel: CancellationToken,
}

impl StreamingHandle {
    /// Spawn the background connection loop and return its handle.
    pub(crate) fn spawn<C: FrameCodec>(codec: C, reconnect: ReconnectConfig) -> Self {
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(StreamState::Idle);
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            stream_loop(codec, event_tx, state_tx, reconnect, task_cancel).await;
        });

        Self {
            event_rx,
            state_rx,
            cancel,
        }
    }

    /// Get a new broadcast receiver for the event stream.
    ///
    /// Multiple consumers can subscribe concurrently. A consumer that falls
    /// behind receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<StreamingEvent>> {
        self.event_rx.resubscribe()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        *self.state_rx.borrow()
    }

    /// Close the subscription. The background task tears down the socket
    /// and emits [`StreamingEvent::Close`] exactly once.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

// ── Background connection loop ───────────────────────────────────────

/// Main loop: connect → read → on link loss, backoff → reconnect.
async fn stream_loop<C: FrameCodec>(
    codec: C,
    event_tx: broadcast::Sender<Arc<StreamingEvent>>,
    state_tx: watch::Sender<StreamState>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;
    let mut ever_connected = false;

    loop {
        let _ = state_tx.send(if ever_connected {
            StreamState::Reconnecting
        } else {
            StreamState::Connecting
        });

        let ended = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = run_connection(&codec, &event_tx, &state_tx, &reconnect, &cancel) => result,
        };

        match ended {
            // Clean disconnect (server close frame or stream end).
            // Reset the attempt counter and reconnect immediately.
            Ok(()) => {
                if cancel.is_cancelled() {
                    break;
                }
                tracing::info!("stream disconnected cleanly, reconnecting");
                ever_connected = true;
                attempt = 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "stream connection error");
                ever_connected = true;

                if let Some(max) = reconnect.max_retries {
                    if attempt >= max {
                        tracing::error!(max_retries = max, "stream retry budget exhausted");
                        break;
                    }
                }

                let delay = calculate_backoff(attempt, &reconnect);
                tracing::info!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    attempt,
                    "waiting before reconnect"
                );
                let _ = state_tx.send(StreamState::Reconnecting);

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }

                attempt += 1;
            }
        }
    }

    let _ = state_tx.send(StreamState::Closed);
    let _ = event_tx.send(Arc::new(StreamingEvent::Close));
    tracing::debug!("stream loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one WebSocket connection and pump frames until it drops.
async fn run_connection<C: FrameCodec>(
    codec: &C,
    event_tx: &broadcast::Sender<Arc<StreamingEvent>>,
    state_tx: &watch::Sender<StreamState>,
    reconnect: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    let url = codec.url();
    tracing::info!(url = %url, "connecting stream");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::StreamConnect(e.to_string()))?;

    tracing::info!("stream connected");
    let _ = state_tx.send(StreamState::Connected);
    let _ = event_tx.send(Arc::new(StreamingEvent::Connect));

    let (mut write, mut read) = ws_stream.split();

    for frame in codec.connect_frames() {
        write
            .send(tungstenite::Message::Text(frame.into()))
            .await
            .map_err(|e| Error::StreamConnect(e.to_string()))?;
    }

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            next = tokio::time::timeout(reconnect.idle_timeout, read.next()) => next,
        };

        let Ok(frame) = next else {
            // No frame, no liveness probe: link loss, not a fatal error.
            return Err(Error::StreamConnect(format!(
                "no frame within {}s idle window",
                reconnect.idle_timeout.as_secs()
            )));
        };

        match frame {
            Some(Ok(tungstenite::Message::Text(text))) => {
                for event in codec.decode(text.as_str()) {
                    // Send errors just mean no active subscribers right now.
                    let _ = event_tx.send(Arc::new(event));
                }
            }
            Some(Ok(tungstenite::Message::Ping(payload))) => {
                // Echo the probe and confirm liveness to the caller.
                if let Err(e) = write.send(tungstenite::Message::Pong(payload)).await {
                    return Err(Error::StreamConnect(e.to_string()));
                }
                let _ = event_tx.send(Arc::new(StreamingEvent::Heartbeat));
            }
            Some(Ok(tungstenite::Message::Pong(_))) => {
                let _ = event_tx.send(Arc::new(StreamingEvent::Heartbeat));
            }
            Some(Ok(tungstenite::Message::Close(frame))) => {
                if let Some(ref cf) = frame {
                    tracing::info!(code = %cf.code, reason = %cf.reason, "stream close frame");
                } else {
                    tracing::info!("stream close frame (no payload)");
                }
                return Ok(());
            }
            Some(Err(e)) => {
                return Err(Error::StreamConnect(e.to_string()));
            }
            None => {
                tracing::info!("stream ended without close frame");
                return Ok(());
            }
            _ => {
                // Binary, raw frames: nothing either dialect sends.
            }
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * jitter`
///
/// Jitter is +-25%, deterministically seeded from the attempt number, to
/// spread out reconnection storms from multiple clients.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powf(f64::from(attempt));
    let capped = base.min(config.max_delay.as_secs_f64());

    let jitter_factor = 1.0 + 0.25 * ((f64::from(attempt) * 7.3).sin());
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct StubCodec {
        url: Url,
    }

    impl FrameCodec for StubCodec {
        fn url(&self) -> &Url {
            &self.url
        }

        fn decode(&self, _text: &str) -> Vec<StreamingEvent> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn spawned_subscription_closes_after_retry_budget() {
        // Nothing listens on this port, so every attempt fails to connect.
        let codec = StubCodec {
            url: Url::parse("ws://127.0.0.1:1").expect("static url"),
        };
        let handle = StreamingHandle::spawn(
            codec,
            ReconnectConfig {
                max_retries: Some(0),
                ..ReconnectConfig::default()
            },
        );

        let mut rx = handle.subscribe();
        let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("loop should give up within the timeout")
            .expect("channel should deliver the terminal event");
        assert!(matches!(*event, StreamingEvent::Close));
        assert_eq!(handle.state(), StreamState::Closed);
    }

    #[test]
    fn default_reconnect_config() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn backoff_increases_exponentially() {
        let config = ReconnectConfig::default();

        let d0 = calculate_backoff(0, &config);
        let d1 = calculate_backoff(1, &config);
        let d2 = calculate_backoff(2, &config);

        // Each step should roughly double (within jitter bounds)
        assert!(d1 > d0, "d1 ({d1:?}) should be greater than d0 ({d0:?})");
        assert!(d2 > d1, "d2 ({d2:?}) should be greater than d1 ({d1:?})");
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            ..ReconnectConfig::default()
        };

        let d10 = calculate_backoff(10, &config);
        // With jitter factor up to 1.25, max effective is 12.5s
        assert!(
            d10 <= Duration::from_secs(13),
            "delay at attempt 10 ({d10:?}) should be capped near max_delay"
        );
    }
}
