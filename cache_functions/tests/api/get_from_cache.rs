use std::time::{Duration, Instant};

use crate::helpers::{spawn_app, spawn_app_with_settings, unreachable_store_configuration};

#[tokio::test]
async fn a_cached_value_is_returned_as_is() {
    let app = spawn_app().await;
    let payload = r#"{"id":"abc", "nested": {"a": [1, 2]}}"#;
    app.push_message(payload).await;

    let response = app.get_from_cache("abc").await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        response
            .headers()
            .get("Content-Type")
            .and_then(|h| h.to_str().ok()),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(response.text().await.unwrap(), payload);
}

#[tokio::test]
async fn an_unknown_id_returns_an_empty_body() {
    let app = spawn_app().await;

    let response = app.get_from_cache("unknown").await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "");
}

#[tokio::test]
async fn a_request_without_id_returns_an_empty_body() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .get(&format!("{}/", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "");
}

#[tokio::test]
async fn an_unreachable_store_returns_an_empty_body_right_away() {
    let address = spawn_app_with_settings(unreachable_store_configuration()).await;
    let client = reqwest::Client::new();

    // The failed connection is not kept: every request tries once, and only once
    for _ in 0..2 {
        let start = Instant::now();
        let response = client
            .get(&format!("{}/", &address))
            .query(&[("id", "abc")])
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(200, response.status().as_u16());
        assert_eq!(response.text().await.unwrap(), "");
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "answered in {:?}",
            start.elapsed()
        );
    }
}
