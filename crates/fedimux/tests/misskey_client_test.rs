// Integration tests for the Misskey-dialect client using wiremock.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fedimux::entities::Visibility;
use fedimux::misskey::Client;
use fedimux::{Error, Operation, Pagination, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let config = TransportConfig::new(Url::parse(&server.uri()).unwrap(), "tok");
    let client = Client::new(config).unwrap();
    (server, client)
}

fn user_json(id: &str, username: &str) -> serde_json::Value {
    json!({
        "id": id,
        "username": username,
        "host": null,
        "name": username,
        "createdAt": "2024-03-01T10:00:00Z",
    })
}

fn note_json(id: &str, visibility: &str) -> serde_json::Value {
    json!({
        "id": id,
        "createdAt": "2024-03-01T11:00:00Z",
        "text": "hello",
        "visibility": visibility,
        "user": user_json("9u1", "ada"),
        "reactions": { "⭐": 2, "🎉": 3 },
    })
}

fn relation_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "isFollowing": true,
        "isFollowed": false,
    })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_credentials_sends_token_in_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/i"))
        .and(body_partial_json(json!({ "i": "tok" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("9u1", "ada")))
        .mount(&server)
        .await;

    let account = client.verify_account_credentials().await.unwrap();
    assert_eq!(account.id, "9u1");
    assert_eq!(account.acct, "ada");
}

#[tokio::test]
async fn test_home_timeline_maps_pagination_to_body_fields() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/notes/timeline"))
        .and(body_partial_json(json!({ "limit": 20, "untilId": "9n99" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([note_json("9n1", "public"), note_json("9n2", "home")])),
        )
        .mount(&server)
        .await;

    let page = Pagination {
        limit: Some(20),
        max_id: Some("9n99".into()),
        ..Pagination::default()
    };
    let statuses = client.get_home_timeline(&page).await.unwrap();

    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].visibility, Visibility::Public);
    // `home` maps to the closest unified visibility.
    assert_eq!(statuses[1].visibility, Visibility::Unlisted);
    // Reactions are summed into the favourites count.
    assert_eq!(statuses[0].favourites_count, 5);
}

// ── Capability gating ───────────────────────────────────────────────

#[tokio::test]
async fn test_unsupported_operation_rejects_before_any_io() {
    let (server, client) = setup().await;

    let err = client.bookmark_status("9n1").await.unwrap_err();
    match err {
        Error::NotSupported(op) => assert_eq!(op, Operation::BookmarkStatus),
        ref other => panic!("expected NotSupported, got {other:?}"),
    }
    assert!(err.is_capability_gap());

    let err = client.get_filters().await.unwrap_err();
    assert!(matches!(err, Error::NotSupported(Operation::GetFilters)));

    // Nothing ever reached the wire.
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Two-step operations ─────────────────────────────────────────────

#[tokio::test]
async fn test_follow_is_two_steps() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/following/create"))
        .and(body_partial_json(json!({ "userId": "9u2" })))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    // A single-id relation lookup answers with a bare object, not an array.
    Mock::given(method("POST"))
        .and(path("/api/users/relation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(relation_json("9u2")))
        .mount(&server)
        .await;

    let rel = client.follow_account("9u2").await.unwrap();
    assert_eq!(rel.id, "9u2");
    assert!(rel.following);

    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_follow_fails_as_a_whole_when_the_relation_read_fails() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/following/create"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users/relation"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "error": { "message": "Upstream gone", "code": "INTERNAL_ERROR" }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // The mutation lands but the operation still reports failure.
    let err = client.follow_account("9u2").await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 502, .. }));
    assert!(err.is_transient());

    // The mutation is idempotent, so a retry completes the operation.
    Mock::given(method("POST"))
        .and(path("/api/users/relation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(relation_json("9u2")))
        .mount(&server)
        .await;
    let rel = client.follow_account("9u2").await.unwrap();
    assert!(rel.following);
}

// ── Error decoding ──────────────────────────────────────────────────

#[tokio::test]
async fn test_api_error_envelope_includes_the_code() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/notes/show"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "No such note.", "code": "NO_SUCH_NOTE" }
        })))
        .mount(&server)
        .await;

    let err = client.get_status("missing").await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "No such note. (NO_SUCH_NOTE)");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

// ── Cancellation ────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancel_aborts_in_flight_requests() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/notes/timeline"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let client = std::sync::Arc::new(client);
    let task = tokio::spawn({
        let client = client.clone();
        async move { client.get_home_timeline(&Pagination::default()).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    client.cancel();

    assert!(matches!(task.await.unwrap(), Err(Error::Cancelled)));
}
