//! Streaming codec for the Mastodon-style WebSocket dialect.
//!
//! The feed is selected in the URL (`?stream=user`, `?stream=hashtag&tag=x`,
//! …); inbound frames look like
//! `{"stream": [..], "event": "update", "payload": "<json string>"}` with the
//! payload JSON-encoded *as a string*, except `delete` whose payload is the
//! bare status id.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::convert;
use super::entities as native;
use crate::error::Error;
use crate::streaming::{FrameCodec, StreamingEvent, Subscription};
use crate::transport::TransportConfig;

/// Wire envelope for one inbound frame.
#[derive(Debug, Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    payload: Option<String>,
}

pub(crate) struct Codec {
    url: Url,
}

impl Codec {
    pub(crate) fn new(
        config: &TransportConfig,
        subscription: &Subscription,
    ) -> Result<Self, Error> {
        let mut url = config.ws_base()?.join("/api/v1/streaming")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(token) = config.expose_token() {
                query.append_pair("access_token", token);
            }
            match subscription {
                Subscription::User => {
                    query.append_pair("stream", "user");
                }
                Subscription::Public { local: false } => {
                    query.append_pair("stream", "public");
                }
                Subscription::Public { local: true } => {
                    query.append_pair("stream", "public:local");
                }
                Subscription::Hashtag(tag) => {
                    query.append_pair("stream", "hashtag");
                    query.append_pair("tag", tag);
                }
                Subscription::List(id) => {
                    query.append_pair("stream", "list");
                    query.append_pair("list", id);
                }
                Subscription::Direct => {
                    query.append_pair("stream", "direct");
                }
            }
        }
        Ok(Self { url })
    }
}

impl FrameCodec for Codec {
    fn url(&self) -> &Url {
        &self.url
    }

    fn decode(&self, text: &str) -> Vec<StreamingEvent> {
        vec![decode_frame(text)]
    }
}

/// Decode one frame. Total: anything unparseable becomes a `ParseError`
/// event so the connection is never torn down over a single bad message.
fn decode_frame(text: &str) -> StreamingEvent {
    let frame: RawFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => return parse_error(e.to_string(), text),
    };

    match frame.event.as_str() {
        "update" => match payload::<native::Status>(frame.payload.as_deref()) {
            Ok(s) => match convert::status(s) {
                Ok(status) => StreamingEvent::Update(status),
                Err(e) => parse_error(e.to_string(), text),
            },
            Err(reason) => parse_error(reason, text),
        },
        "status.update" => match payload::<native::Status>(frame.payload.as_deref()) {
            Ok(s) => match convert::status(s) {
                Ok(status) => StreamingEvent::StatusUpdate(status),
                Err(e) => parse_error(e.to_string(), text),
            },
            Err(reason) => parse_error(reason, text),
        },
        "notification" => match payload::<native::Notification>(frame.payload.as_deref()) {
            Ok(n) => match convert::notification(n) {
                Ok(notification) => StreamingEvent::Notification(notification),
                Err(e) => parse_error(e.to_string(), text),
            },
            Err(reason) => parse_error(reason, text),
        },
        "conversation" => match payload::<native::Conversation>(frame.payload.as_deref()) {
            Ok(c) => match convert::conversation(c) {
                Ok(conversation) => StreamingEvent::Conversation(conversation),
                Err(e) => parse_error(e.to_string(), text),
            },
            Err(reason) => parse_error(reason, text),
        },
        // The delete payload is the bare id, not JSON.
        "delete" => match frame.payload {
            Some(id) => StreamingEvent::Delete(id),
            None => parse_error("delete frame without payload".into(), text),
        },
        other => parse_error(format!("unrecognized event {other:?}"), text),
    }
}

/// The payload field is a JSON document encoded as a string.
fn payload<T: DeserializeOwned>(payload: Option<&str>) -> Result<T, String> {
    let payload = payload.ok_or_else(|| "frame without payload".to_string())?;
    serde_json::from_str(payload).map_err(|e| e.to_string())
}

fn parse_error(reason: String, raw: &str) -> StreamingEvent {
    tracing::debug!(reason, "undecodable stream frame");
    StreamingEvent::ParseError {
        reason,
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_frame() -> String {
        let status = serde_json::json!({
            "id": "42",
            "uri": "https://a.example/42",
            "account": {
                "id": "7",
                "username": "ada",
                "acct": "ada",
                "created_at": "2024-03-01T10:00:00Z",
            },
            "content": "<p>hi</p>",
            "created_at": "2024-03-01T11:00:00Z",
            "visibility": "public",
        });
        serde_json::json!({
            "stream": ["user"],
            "event": "update",
            "payload": status.to_string(),
        })
        .to_string()
    }

    #[test]
    fn decodes_update_frame() {
        let codec = test_codec(&Subscription::User);
        let events = codec.decode(&update_frame());
        assert_eq!(events.len(), 1);
        match &events[0] {
            StreamingEvent::Update(status) => assert_eq!(status.id, "42"),
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[test]
    fn malformed_then_wellformed_yields_parse_error_then_update() {
        let codec = test_codec(&Subscription::User);

        let first = codec.decode("{not json");
        assert!(matches!(first[0], StreamingEvent::ParseError { .. }));

        let second = codec.decode(&update_frame());
        assert!(matches!(second[0], StreamingEvent::Update(_)));
    }

    #[test]
    fn delete_payload_is_the_bare_id() {
        let codec = test_codec(&Subscription::User);
        let frame = serde_json::json!({
            "stream": ["user"],
            "event": "delete",
            "payload": "12345",
        });
        let events = codec.decode(&frame.to_string());
        match &events[0] {
            StreamingEvent::Delete(id) => assert_eq!(id, "12345"),
            other => panic!("expected Delete, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_event_is_isolated() {
        let codec = test_codec(&Subscription::User);
        let frame = serde_json::json!({
            "stream": ["user"],
            "event": "filters_changed",
        });
        let events = codec.decode(&frame.to_string());
        assert!(matches!(events[0], StreamingEvent::ParseError { .. }));
    }

    #[test]
    fn subscription_is_encoded_in_the_url() {
        let codec = test_codec(&Subscription::Hashtag("rust".into()));
        let url = codec.url().to_string();
        assert!(url.starts_with("wss://social.example/api/v1/streaming"));
        assert!(url.contains("stream=hashtag"));
        assert!(url.contains("tag=rust"));
        assert!(url.contains("access_token=tok"));
    }

    fn test_codec(subscription: &Subscription) -> Codec {
        let config = TransportConfig::new(
            Url::parse("https://social.example").expect("static url"),
            "tok",
        );
        Codec::new(&config, subscription).expect("codec")
    }
}
