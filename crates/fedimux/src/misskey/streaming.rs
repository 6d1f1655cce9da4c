//! Streaming codec for the Misskey-style WebSocket dialect.
//!
//! One socket multiplexes channels: the feed is selected by sending
//! `{"type": "connect", "body": {"channel": .., "id": ..}}` frames after the
//! handshake, and inbound frames arrive as
//! `{"type": "channel", "body": {"id": .., "type": "note", "body": {..}}}`
//! with the payload nested as real JSON, not a string. Note deletions come
//! through a top-level `noteUpdated` frame.

use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::convert;
use super::entities as native;
use crate::error::Error;
use crate::streaming::{FrameCodec, StreamingEvent, Subscription};
use crate::transport::TransportConfig;

/// Outer envelope of one inbound frame.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    body: serde_json::Value,
}

/// Body of a `"channel"` frame.
#[derive(Debug, Deserialize)]
struct ChannelBody {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    body: serde_json::Value,
}

/// Body of a `"noteUpdated"` frame.
#[derive(Debug, Deserialize)]
struct NoteUpdatedBody {
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

pub(crate) struct Codec {
    url: Url,
    connect_frames: Vec<String>,
}

impl Codec {
    pub(crate) fn new(
        config: &TransportConfig,
        subscription: &Subscription,
    ) -> Result<Self, Error> {
        let mut url = config.ws_base()?.join("/streaming")?;
        if let Some(token) = config.expose_token() {
            url.query_pairs_mut().append_pair("i", token);
        }

        // Channel ids only have to be unique within this socket.
        let connect_frames = match subscription {
            Subscription::User => vec![
                connect_frame("homeTimeline", "home", json!({})),
                connect_frame("main", "main", json!({})),
            ],
            Subscription::Public { local: true } => {
                vec![connect_frame("localTimeline", "local", json!({}))]
            }
            Subscription::Public { local: false } => {
                vec![connect_frame("globalTimeline", "global", json!({}))]
            }
            Subscription::Hashtag(tag) => vec![connect_frame(
                "hashtag",
                "hashtag",
                json!({ "q": [[tag]] }),
            )],
            Subscription::List(id) => vec![connect_frame(
                "userList",
                "list",
                json!({ "listId": id }),
            )],
            // No dedicated direct-message channel; mentions and messages
            // arrive on the main channel as notifications.
            Subscription::Direct => vec![connect_frame("main", "main", json!({}))],
        };

        Ok(Self {
            url,
            connect_frames,
        })
    }
}

fn connect_frame(channel: &str, id: &str, params: serde_json::Value) -> String {
    json!({
        "type": "connect",
        "body": { "channel": channel, "id": id, "params": params },
    })
    .to_string()
}

impl FrameCodec for Codec {
    fn url(&self) -> &Url {
        &self.url
    }

    fn connect_frames(&self) -> Vec<String> {
        self.connect_frames.clone()
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

    match frame.kind.as_str() {
        "channel" => {
            let body: ChannelBody = match serde_json::from_value(frame.body) {
                Ok(body) => body,
                Err(e) => return parse_error(e.to_string(), text),
            };
            decode_channel_event(&body.kind, body.body, text)
        }
        "noteUpdated" => {
            let body: NoteUpdatedBody = match serde_json::from_value(frame.body) {
                Ok(body) => body,
                Err(e) => return parse_error(e.to_string(), text),
            };
            if body.kind == "deleted" {
                StreamingEvent::Delete(body.id)
            } else {
                parse_error(format!("unrecognized note update {:?}", body.kind), text)
            }
        }
        "pong" => StreamingEvent::Heartbeat,
        other => parse_error(format!("unrecognized frame {other:?}"), text),
    }
}

fn decode_channel_event(kind: &str, body: serde_json::Value, raw: &str) -> StreamingEvent {
    match kind {
        "note" => match decode_payload::<native::Note>(body).and_then(convert::status) {
            Ok(status) => StreamingEvent::Update(status),
            Err(e) => parse_error(e.to_string(), raw),
        },
        "notification" => {
            match decode_payload::<native::Notification>(body).and_then(convert::notification) {
                Ok(notification) => StreamingEvent::Notification(notification),
                Err(e) => parse_error(e.to_string(), raw),
            }
        }
        other => parse_error(format!("unrecognized channel event {other:?}"), raw),
    }
}

fn decode_payload<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, Error> {
    serde_json::from_value(body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: String::new(),
    })
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

    fn note_frame() -> String {
        serde_json::json!({
            "type": "channel",
            "body": {
                "id": "home",
                "type": "note",
                "body": {
                    "id": "9note1",
                    "createdAt": "2024-03-01T11:00:00Z",
                    "text": "hi",
                    "visibility": "public",
                    "user": {
                        "id": "9user1",
                        "username": "ada",
                    },
                },
            },
        })
        .to_string()
    }

    #[test]
    fn decodes_note_frame() {
        let codec = test_codec(&Subscription::User);
        let events = codec.decode(&note_frame());
        assert_eq!(events.len(), 1);
        match &events[0] {
            StreamingEvent::Update(status) => assert_eq!(status.id, "9note1"),
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[test]
    fn decodes_notification_frame() {
        let codec = test_codec(&Subscription::User);
        let frame = serde_json::json!({
            "type": "channel",
            "body": {
                "id": "main",
                "type": "notification",
                "body": {
                    "id": "9notif1",
                    "createdAt": "2024-03-01T11:00:00Z",
                    "type": "follow",
                    "user": { "id": "9user1", "username": "ada" },
                },
            },
        });
        let events = codec.decode(&frame.to_string());
        match &events[0] {
            StreamingEvent::Notification(n) => assert_eq!(n.id, "9notif1"),
            other => panic!("expected Notification, got {other:?}"),
        }
    }

    #[test]
    fn note_deletion_becomes_delete() {
        let codec = test_codec(&Subscription::User);
        let frame = serde_json::json!({
            "type": "noteUpdated",
            "body": {
                "id": "9note1",
                "type": "deleted",
                "body": { "deletedAt": "2024-03-01T12:00:00Z" },
            },
        });
        let events = codec.decode(&frame.to_string());
        match &events[0] {
            StreamingEvent::Delete(id) => assert_eq!(id, "9note1"),
            other => panic!("expected Delete, got {other:?}"),
        }
    }

    #[test]
    fn pong_confirms_liveness() {
        let codec = test_codec(&Subscription::User);
        let events = codec.decode(r#"{"type":"pong"}"#);
        assert!(matches!(events[0], StreamingEvent::Heartbeat));
    }

    #[test]
    fn malformed_then_wellformed_yields_parse_error_then_update() {
        let codec = test_codec(&Subscription::User);

        let first = codec.decode("{not json");
        assert!(matches!(first[0], StreamingEvent::ParseError { .. }));

        let second = codec.decode(&note_frame());
        assert!(matches!(second[0], StreamingEvent::Update(_)));
    }

    #[test]
    fn user_subscription_connects_two_channels() {
        let codec = test_codec(&Subscription::User);
        let frames = codec.connect_frames();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].contains("homeTimeline"));
        assert!(frames[1].contains(r#""channel":"main""#));
    }

    #[test]
    fn token_is_encoded_in_the_url() {
        let codec = test_codec(&Subscription::Public { local: true });
        let url = codec.url().to_string();
        assert!(url.starts_with("wss://misskey.example/streaming"));
        assert!(url.contains("i=tok"));
    }

    fn test_codec(subscription: &Subscription) -> Codec {
        let config = TransportConfig::new(
            Url::parse("https://misskey.example").expect("static url"),
            "tok",
        );
        Codec::new(&config, subscription).expect("codec")
    }
}
