//! Integration tests for the token -> user -> followed streams chain
use anyhow::Result;
use mockito::{Matcher, Server};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::test_harness::{Harness, CLIENT_ID};
use livelist::error::AUTH_FAILED_NOTICE;
use livelist::{Environment, SessionOutcome, Stage};

const PAGE_WITH_TOKEN: &str =
    "http://localhost:8000/streams#access_token=abc123&scope=user%3Aread%3Afollows&token_type=bearer";

fn users_json() -> String {
    json!({"data": [{"id": "123456", "login": "testuser"}]}).to_string()
}

fn followed_json() -> String {
    json!({
        "data": [
            {
                "user_login": "speedy",
                "user_name": "Speedy",
                "game_id": "743",
                "game_name": "Chess",
                "title": "Blitz all day",
                "viewer_count": 42,
                "started_at": "2015-08-03T21:05:57Z",
                "thumbnail_url": "https://static-cdn.jtvnw.net/previews-ttv/live_user_speedy-{width}x{height}.jpg"
            },
            {
                "user_login": "quiet",
                "user_name": "Quiet",
                "game_id": "",
                "game_name": "",
                "title": "",
                "viewer_count": 0,
                "started_at": "2021-01-01T00:00:00Z",
                "thumbnail_url": "https://static-cdn.jtvnw.net/previews-ttv/live_user_quiet-{width}x{height}.jpg"
            }
        ],
        "pagination": {}
    })
    .to_string()
}

#[tokio::test]
async fn test_followed_streams_end_to_end() -> Result<()> {
    let mut server = Server::new_async().await;

    let users = server
        .mock("GET", "/helix/users")
        .match_header("client-id", CLIENT_ID)
        .match_header("authorization", "Bearer abc123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(users_json())
        .expect(1)
        .create_async()
        .await;

    let followed = server
        .mock("GET", "/helix/streams/followed")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("first".into(), "100".into()),
            Matcher::UrlEncoded("user_id".into(), "123456".into()),
        ]))
        .match_header("client-id", CLIENT_ID)
        .match_header("authorization", "Bearer abc123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(followed_json())
        .expect(1)
        .create_async()
        .await;

    let mut harness = Harness::new(&server.url(), PAGE_WITH_TOKEN);
    let outcome = harness.session.run(&CancellationToken::new()).await;

    users.assert_async().await;
    followed.assert_async().await;

    let records = match outcome {
        SessionOutcome::Published(records) => records,
        other => panic!("expected published records, got {:?}", other),
    };
    assert_eq!(records.len(), 2);

    let speedy = &records[0];
    assert_eq!(speedy.channel_link, "https://www.twitch.tv/speedy");
    assert_eq!(
        speedy.thumbnail_url,
        "https://static-cdn.jtvnw.net/previews-ttv/live_user_speedy-240x135.jpg"
    );
    assert_eq!(speedy.title, "Blitz all day");
    assert_eq!(speedy.channel_name, "Speedy");
    assert_eq!(speedy.viewer_count, 42);
    let game = speedy.game.as_ref().unwrap();
    assert_eq!(game.name, "Chess");
    assert_eq!(game.image_url, "https://static-cdn.jtvnw.net/ttv-boxart/Chess-138x190.jpg");

    let quiet = &records[1];
    assert_eq!(quiet.title, "(Failed to load title)");
    assert!(quiet.game.is_none());

    assert_eq!(harness.batches(), vec![records.clone()]);
    assert!(harness.notifications().is_empty());
    assert_eq!(harness.session.stage(), Stage::Published);
    assert!(harness.session.requests_are_done());
    assert_eq!(
        harness.environment.current_url().as_str(),
        "http://localhost:8000/streams"
    );
    assert_eq!(harness.environment.replacements().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_rejected_token_publishes_empty_list() -> Result<()> {
    let mut server = Server::new_async().await;

    let users = server
        .mock("GET", "/helix/users")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Unauthorized","status":401,"message":"Invalid OAuth token"}"#)
        .expect(1)
        .create_async()
        .await;

    let followed = server
        .mock("GET", "/helix/streams/followed")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut harness = Harness::new(&server.url(), PAGE_WITH_TOKEN);
    let outcome = harness.session.run(&CancellationToken::new()).await;

    users.assert_async().await;
    followed.assert_async().await;

    assert!(matches!(outcome, SessionOutcome::Published(ref records) if records.is_empty()));
    assert_eq!(harness.notifications(), vec![AUTH_FAILED_NOTICE.to_string()]);
    assert_eq!(harness.batches(), vec![Vec::new()]);
    assert!(harness.session.requests_are_done());
    assert!(harness.environment.replacements().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_streams_body() -> Result<()> {
    let mut server = Server::new_async().await;

    let _users = server
        .mock("GET", "/helix/users")
        .with_status(200)
        .with_body(users_json())
        .create_async()
        .await;

    let _followed = server
        .mock("GET", "/helix/streams/followed")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error":"Unauthorized"}"#)
        .create_async()
        .await;

    let mut harness = Harness::new(&server.url(), PAGE_WITH_TOKEN);
    let outcome = harness.session.run(&CancellationToken::new()).await;

    assert!(matches!(outcome, SessionOutcome::Published(ref records) if records.is_empty()));
    assert_eq!(harness.notifications(), vec![AUTH_FAILED_NOTICE.to_string()]);
    let counters = harness.session.counters();
    assert_eq!((counters.total, counters.completed), (2, 2));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_api_notifies_once() -> Result<()> {
    // Nothing listens on port 9 locally
    let mut harness = Harness::new("http://127.0.0.1:9", PAGE_WITH_TOKEN);
    let outcome = harness.session.run(&CancellationToken::new()).await;

    assert!(matches!(outcome, SessionOutcome::Published(ref records) if records.is_empty()));
    let notifications = harness.notifications();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].starts_with("There was a problem getting streams from Twitch"));
    assert!(harness.session.requests_are_done());
    Ok(())
}
