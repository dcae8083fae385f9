mod common;

use axum::http::StatusCode;
use common::{app_with, capture_logs, post_json, send};
use ez_plugin::state::{PluginConfig, Settings};
use tracing::Level;

/// Field values are written with `Debug`, so quotes in a body come out escaped.
fn body_field(body: &str) -> String {
    format!("body={body:?}")
}

fn plugin(max_print_body_size: usize) -> PluginConfig {
    PluginConfig::new(Settings {
        cookie_name: "token".into(),
        token_salt: common::SALT.into(),
        max_print_body_size,
    })
}

#[tokio::test]
async fn debug_logs_query_body_and_response() {
    let (logs, _guard) = capture_logs(Level::DEBUG);

    let reply = send(
        app_with(plugin(4096)),
        post_json("/api/v1/echo/3?page=2&tags=x&tags=y", r#"{"name":"zed"}"#),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);

    let out = logs.contents();
    assert!(out.contains("/api/v1/echo/3"), "{out}");
    assert!(out.contains("method=POST"), "{out}");
    assert!(out.contains("code=200"), "{out}");
    assert!(out.contains("{page: [2],tags: [x y],}"), "{out}");
    assert!(out.contains(&body_field(r#"{"name":"zed"}"#)), "{out}");
    assert!(out.contains(r#"response="{\"code\":200"#), "{out}");
    assert!(out.contains("cost="), "{out}");
}

#[tokio::test]
async fn body_is_still_readable_after_logging() {
    let (_logs, _guard) = capture_logs(Level::DEBUG);

    let reply = send(
        app_with(plugin(4096)),
        post_json("/api/v1/echo/1", r#"{"name":"kept"}"#),
    )
    .await;

    assert_eq!(reply.json()["data"]["name"], "kept");
}

#[tokio::test]
async fn body_at_cap_is_logged_and_over_cap_is_not() {
    let at_cap = r#"{"name":"abc"}"#;
    let (logs, _guard) = capture_logs(Level::DEBUG);
    send(
        app_with(plugin(at_cap.len())),
        post_json("/api/v1/echo/1", at_cap),
    )
    .await;
    assert!(logs.contents().contains(&body_field(at_cap)));

    let over_cap = r#"{"name":"abcd"}"#;
    let (logs, _guard) = capture_logs(Level::DEBUG);
    let reply = send(
        app_with(plugin(over_cap.len() - 1)),
        post_json("/api/v1/echo/1", over_cap),
    )
    .await;
    let out = logs.contents();
    assert!(!out.contains("body="), "{out}");
    assert!(!out.contains("response="), "{out}");
    assert!(out.contains("code=200"), "{out}");
    assert_eq!(reply.json()["data"]["name"], "abcd");
}

#[tokio::test]
async fn info_level_logs_only_the_summary() {
    let (logs, _guard) = capture_logs(Level::INFO);

    send(
        app_with(plugin(4096)),
        post_json("/api/v1/echo/1?page=9", r#"{"name":"quiet"}"#),
    )
    .await;

    let out = logs.contents();
    assert!(out.contains("/api/v1/echo/1"), "{out}");
    assert!(out.contains("code=200"), "{out}");
    assert!(!out.contains("quiet"), "{out}");
    assert!(!out.contains("page: [9]"), "{out}");
}

#[tokio::test]
async fn request_id_is_logged() {
    let (logs, _guard) = capture_logs(Level::INFO);

    let request = axum::http::Request::get("/api/v1/health")
        .header("x-request-id", "trace-77")
        .body(axum::body::Body::empty())
        .unwrap();
    send(app_with(plugin(4096)), request).await;

    assert!(logs.contents().contains("trace-77"));
}

#[tokio::test]
async fn size_cap_can_change_at_runtime() {
    let plugin = plugin(4096);
    let body = r#"{"name":"later"}"#;

    let (logs, _guard) = capture_logs(Level::DEBUG);
    plugin.set_max_print_body_size(4);
    send(app_with(plugin.clone()), post_json("/api/v1/echo/1", body)).await;

    assert!(!logs.contents().contains("body="));
    assert_eq!(plugin.max_print_body_size(), 4);
}
