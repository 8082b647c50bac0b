use std::time::{Duration, Instant};

use base64::{engine::general_purpose, Engine as _};
use serde_json::json;

use crate::helpers::{spawn_app, spawn_app_with_settings, unreachable_store_configuration};

#[tokio::test]
async fn a_valid_message_is_cached_under_its_id() {
    let app = spawn_app().await;
    let payload = r#"{"id":"book-1","title":"Dune"}"#;

    let response = app.push_message(payload).await;

    assert!(response.status().is_success());
    assert_eq!(app.cache.stored("book-1").as_deref(), Some(payload));
}

#[tokio::test]
async fn the_last_write_wins() {
    let app = spawn_app().await;

    app.push_message(r#"{"id":"1","v":1}"#).await;
    app.push_message(r#"{"id":"1","v":2}"#).await;

    assert_eq!(app.cache.stored("1").as_deref(), Some(r#"{"id":"1","v":2}"#));
}

#[tokio::test]
async fn a_message_without_id_is_acknowledged_but_not_cached() {
    let app = spawn_app().await;

    let response = app.push_message(r#"{"title":"no id"}"#).await;

    assert!(response.status().is_success());
    assert_eq!(app.cache.nb_writes(), 0);
}

#[tokio::test]
async fn invalid_messages_are_acknowledged_but_not_cached() {
    let app = spawn_app().await;
    let test_cases = vec![
        ("not json at all".to_string(), "a body that is not JSON"),
        (json!({ "subscription": "s" }).to_string(), "an envelope without message"),
        (json!({ "message": {} }).to_string(), "a message without data"),
        (
            json!({ "message": { "data": "%%%" } }).to_string(),
            "data that is not base64",
        ),
        (
            json!({ "message": { "data": general_purpose::STANDARD.encode("{oops") } })
                .to_string(),
            "data that is not JSON",
        ),
    ];

    for (body, description) in test_cases {
        let response = app.post_raw(body).await;

        assert!(
            response.status().is_success(),
            "The writer did not acknowledge {}",
            description
        );
    }
    assert_eq!(app.cache.nb_writes(), 0);
}

#[tokio::test]
async fn a_structured_cloud_event_is_cached() {
    let app = spawn_app().await;
    let payload = r#"{"id":42,"name":"answer"}"#;
    let body = json!({
        "specversion": "1.0",
        "type": "google.cloud.pubsub.topic.v1.messagePublished",
        "source": "//pubsub.googleapis.com/projects/test/topics/cache",
        "id": "event-1",
        "data": {
            "message": { "data": general_purpose::STANDARD.encode(payload) },
            "subscription": "projects/test/subscriptions/cache"
        }
    });

    let response = app.post_raw(body.to_string()).await;

    assert!(response.status().is_success());
    assert_eq!(app.cache.stored("42").as_deref(), Some(payload));
}

#[tokio::test]
async fn an_unreachable_store_fails_the_delivery_right_away() {
    let address = spawn_app_with_settings(unreachable_store_configuration()).await;
    let body = json!({
        "message": { "data": general_purpose::STANDARD.encode(r#"{"id":"book-1"}"#) },
        "subscription": "projects/test/subscriptions/cache"
    });
    let start = Instant::now();

    let response = reqwest::Client::new()
        .post(&format!("{}/", &address))
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .expect("Failed to execute request.");

    // Redelivered later by the push subscription
    assert_eq!(500, response.status().as_u16());
    assert!(
        start.elapsed() < Duration::from_secs(2),
        "answered in {:?}",
        start.elapsed()
    );
}
