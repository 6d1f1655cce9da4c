// Integration tests for the Mastodon-dialect client using wiremock.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fedimux::entities::Visibility;
use fedimux::mastodon::Client;
use fedimux::{Error, Pagination, PostStatusParams, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let config = TransportConfig::new(Url::parse(&server.uri()).unwrap(), "tok");
    let client = Client::new(config).unwrap();
    (server, client)
}

fn account_json(id: &str, username: &str) -> serde_json::Value {
    json!({
        "id": id,
        "username": username,
        "acct": username,
        "display_name": username,
        "created_at": "2024-03-01T10:00:00Z",
    })
}

fn status_json(id: &str, visibility: &str) -> serde_json::Value {
    json!({
        "id": id,
        "uri": format!("https://social.example/statuses/{id}"),
        "account": account_json("7", "ada"),
        "content": "<p>hello</p>",
        "created_at": "2024-03-01T11:00:00Z",
        "visibility": visibility,
        "favourites_count": 3,
    })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_credentials_sends_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/verify_credentials"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json("7", "ada")))
        .mount(&server)
        .await;

    let account = client.verify_account_credentials().await.unwrap();
    assert_eq!(account.id, "7");
    assert_eq!(account.username, "ada");
}

#[tokio::test]
async fn test_home_timeline_encodes_only_supplied_pagination() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/timelines/home"))
        .and(query_param("limit", "20"))
        .and(query_param("max_id", "99"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([status_json("1", "public"), status_json("2", "unlisted")])),
        )
        .mount(&server)
        .await;

    let page = Pagination {
        limit: Some(20),
        max_id: Some("99".into()),
        ..Pagination::default()
    };
    let statuses = client.get_home_timeline(&page).await.unwrap();

    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].visibility, Visibility::Public);
    assert_eq!(statuses[1].visibility, Visibility::Unlisted);

    // `since_id` and `min_id` were not supplied and must not appear.
    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default();
    assert!(!query.contains("since_id"));
    assert!(!query.contains("min_id"));
}

#[tokio::test]
async fn test_post_status_encodes_params() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/statuses"))
        .and(body_partial_json(json!({
            "status": "hello fediverse",
            "visibility": "private",
            "spoiler_text": "cw",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_json("50", "private")))
        .mount(&server)
        .await;

    let params = PostStatusParams {
        visibility: Some(Visibility::Private),
        spoiler_text: Some("cw".into()),
        ..PostStatusParams::default()
    };
    let status = client.post_status("hello fediverse", &params).await.unwrap();

    assert_eq!(status.id, "50");
    assert_eq!(status.visibility, Visibility::Private);
}

#[tokio::test]
async fn test_follow_returns_relationship() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/accounts/9/follow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "9",
            "following": true,
            "followed_by": false,
        })))
        .mount(&server)
        .await;

    let rel = client.follow_account("9").await.unwrap();
    assert_eq!(rel.id, "9");
    assert!(rel.following);
    assert!(!rel.followed_by);

    // Single round trip on this dialect.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

// ── Error decoding ──────────────────────────────────────────────────

#[tokio::test]
async fn test_api_error_envelope_is_decoded() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/statuses/404"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Record not found" })),
        )
        .mount(&server)
        .await;

    let err = client.get_status("404").await.unwrap_err();
    match err {
        Error::Api { status, ref message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Record not found");
        }
        ref other => panic!("expected Api error, got {other:?}"),
    }
    assert!(err.is_not_found());
}

// ── Cancellation ────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancel_aborts_in_flight_requests() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/timelines/home"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let client = std::sync::Arc::new(client);
    let first = tokio::spawn({
        let client = client.clone();
        async move { client.get_home_timeline(&Pagination::default()).await }
    });
    let second = tokio::spawn({
        let client = client.clone();
        async move { client.get_home_timeline(&Pagination::default()).await }
    });

    // Give both requests time to reach the server before cancelling.
    tokio::time::sleep(Duration::from_millis(100)).await;
    client.cancel();

    assert!(matches!(first.await.unwrap(), Err(Error::Cancelled)));
    assert!(matches!(second.await.unwrap(), Err(Error::Cancelled)));

    // An independent instance against the same server is unaffected.
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/verify_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json("7", "ada")))
        .mount(&server)
        .await;
    let other = Client::new(TransportConfig::new(
        Url::parse(&server.uri()).unwrap(),
        "tok",
    ))
    .unwrap();
    assert!(other.verify_account_credentials().await.is_ok());

    // The cancelled instance is spent.
    assert!(matches!(
        client.verify_account_credentials().await,
        Err(Error::Cancelled)
    ));
}
