mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let app = vib3_messaging::router(common::offline_state());
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, common::bearer_for(Uuid::new_v4()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "vib3-messaging");
}

#[tokio::test]
async fn chats_require_authentication() {
    let (status, body) = send(Request::get("/chats").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "E0004");
}

#[tokio::test]
async fn message_without_body_is_rejected() {
    let uri = format!("/chats/{}/messages", Uuid::new_v4());
    let (status, body) = send(post_json(&uri, serde_json::json!({ "client_id": "tmp-1" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E0002");
}

#[tokio::test]
async fn match_message_without_body_is_rejected() {
    let payload = serde_json::json!({ "match_id": Uuid::new_v4(), "content": "  " });
    let (status, body) = send(post_json("/chat", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E0002");
}

#[tokio::test]
async fn direct_chat_needs_exactly_one_other_participant() {
    let payload = serde_json::json!({
        "type": "direct",
        "participant_ids": [Uuid::new_v4(), Uuid::new_v4()],
    });
    let (status, body) = send(post_json("/chats", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E4004");
}

#[tokio::test]
async fn chat_needs_another_participant() {
    let payload = serde_json::json!({ "type": "group", "name": "Solo", "participant_ids": [] });
    let (status, body) = send(post_json("/chats", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E0002");
}

#[tokio::test]
async fn overlong_group_name_is_rejected() {
    let payload = serde_json::json!({
        "type": "group",
        "name": "x".repeat(51),
        "participant_ids": [Uuid::new_v4()],
    });
    let (status, body) = send(post_json("/chats", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E0002");
}

#[tokio::test]
async fn blank_reaction_is_rejected() {
    let uri = format!("/messages/{}/reactions", Uuid::new_v4());
    let (status, body) = send(post_json(&uri, serde_json::json!({ "emoji": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E0002");
}
