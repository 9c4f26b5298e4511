//! LINE webhook callback.
//!
//! Only the first event of an envelope is handled. Operation events greet the
//! new friend, message events either answer the `air` command or echo the text
//! back, and every other event type is acknowledged without a reply.

use airbot_core::air::latest_reading;
use airbot_core::types::{CallbackEnvelope, Event, EventContent, EventKind};
use axum::{body::Bytes, extract::State, routing::post, Router};
use tracing::{debug, error, info, warn};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub const WELCOME_TEXT: &str = "Welcome to Jim's Bot.";
pub const NON_TEXT_REPLY: &str = "喔喔喔，看不懂，請用文字跟我溝通";
const AIR_COMMAND: &str = "air";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/callback", post(callback).fallback(not_found))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}

pub async fn callback(State(state): State<AppState>, body: Bytes) -> AppResult<()> {
    debug!(body = %String::from_utf8_lossy(&body), "callback received");

    let envelope: CallbackEnvelope = serde_json::from_slice(&body).map_err(|err| {
        error!(error = %err, "callback decode failed");
        AppError::Decode(err.to_string())
    })?;

    let mut events = envelope.result.into_iter();
    let Some(event) = events.next() else {
        info!("callback carried no events");
        return Ok(());
    };
    let ignored = events.count();
    if ignored > 0 {
        warn!(ignored, "only the first callback event is handled");
    }

    match event.kind() {
        EventKind::Operation => handle_operation(&state, &event).await,
        EventKind::Message => handle_message(&state, &event).await,
        EventKind::Other => {
            debug!(event_type = %event.event_type, "ignoring callback event");
            Ok(())
        }
    }
}

async fn handle_operation(state: &AppState, event: &Event) -> AppResult<()> {
    let target = event.content.operation_target().map_err(|err| {
        warn!(error = %err, event_id = %event.id, "operation without target user");
        AppError::BadRequest(err.to_string())
    })?;
    info!(to = %target, "received operation");

    send(state, target, WELCOME_TEXT).await
}

async fn handle_message(state: &AppState, event: &Event) -> AppResult<()> {
    let content = &event.content;
    info!(from = %content.from, content_type = content.content_type, "received message");

    match reply_for(state, content).await {
        Some(text) => send(state, &content.from, &text).await,
        None => Ok(()),
    }
}

/// Text to answer a message with, or `None` when there is nothing to say.
async fn reply_for(state: &AppState, content: &EventContent) -> Option<String> {
    if !content.is_text() {
        return Some(NON_TEXT_REPLY.to_string());
    }

    if !content.text.eq_ignore_ascii_case(AIR_COMMAND) {
        return Some(content.text.clone());
    }

    let site = &state.air_site;
    match latest_reading(state.store.as_ref(), &site.county, &site.site).await {
        Ok(reading) => Some(reading.report()),
        Err(err) => {
            error!(
                error = %err,
                county = %site.county,
                site = %site.site,
                "air state lookup failed"
            );
            None
        }
    }
}

async fn send(state: &AppState, to: &str, text: &str) -> AppResult<()> {
    state
        .line
        .send_text(vec![to.to_string()], text)
        .await
        .map_err(|err| {
            error!(error = %err, to = %to, "line send failed");
            AppError::Upstream
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::app;
    use crate::state::test_support;
    use airbot_core::store::{AirStateStore, InMemoryAirStateStore};
    use airbot_core::types::{EVENT_TYPE_MESSAGE, EVENT_TYPE_OPERATION};
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn line_server(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/events"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    }

    async fn post_callback(router: Router, body: impl Into<Body>) -> (StatusCode, String) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/callback")
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn message(content: serde_json::Value) -> String {
        json!({ "Result": [{ "eventType": EVENT_TYPE_MESSAGE, "content": content }] }).to_string()
    }

    async fn sent_texts(server: &MockServer) -> Vec<serde_json::Value> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|req| serde_json::from_slice::<serde_json::Value>(&req.body).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_air_command_replies_with_latest_reading() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/events"))
            .and(body_partial_json(json!({
                "to": ["U1"],
                "content": { "contentType": 1, "text": "PSI: 45 (Green)\nPM2.5: 20 (Green)" }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryAirStateStore::new());
        store
            .insert_missing(&[
                test_support::air_state("大同", "2016-04-15 13:00", "88", "41"),
                test_support::air_state("大同", "2016-04-15 14:00", "45", "20"),
            ])
            .await
            .unwrap();
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = message(json!({ "from": "U1", "contentType": 1, "text": "air" }));
        let (status, text) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::OK);
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_air_command_is_case_insensitive() {
        let server = line_server(200).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        store
            .insert_missing(&[test_support::air_state("大同", "2016-04-15 14:00", "150", "60")])
            .await
            .unwrap();
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = message(json!({ "from": "U1", "contentType": 1, "text": "AiR" }));
        let (status, _) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::OK);

        let sent = sent_texts(&server).await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["content"]["text"], "PSI: 150 (Red)\nPM2.5: 60 (Red)");
    }

    #[tokio::test]
    async fn test_air_command_without_data_sends_nothing() {
        let server = line_server(200).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = message(json!({ "from": "U1", "contentType": 1, "text": "air" }));
        let (status, _) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::OK);
        assert!(sent_texts(&server).await.is_empty());
    }

    #[tokio::test]
    async fn test_text_is_echoed_back() {
        let server = line_server(200).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = message(json!({ "from": "U7", "contentType": 1, "text": "你好 air" }));
        let (status, _) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::OK);

        let sent = sent_texts(&server).await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["to"], json!(["U7"]));
        assert_eq!(sent[0]["toChannel"], 1383378250);
        assert_eq!(sent[0]["eventType"], "138311608800106203");
        assert_eq!(sent[0]["content"]["text"], "你好 air");
    }

    #[tokio::test]
    async fn test_non_text_message_gets_fixed_reply() {
        let server = line_server(200).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = message(json!({
            "from": "U1",
            "contentType": 2,
            "text": "air",
            "originalContentUrl": "https://example.com/a.jpg"
        }));
        let (status, _) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::OK);

        let sent = sent_texts(&server).await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["content"]["text"], NON_TEXT_REPLY);
    }

    #[tokio::test]
    async fn test_image_message_with_null_fields_gets_fixed_reply() {
        let server = line_server(200).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = json!({
            "result": [{
                "eventType": EVENT_TYPE_MESSAGE,
                "content": {
                    "from": "U1",
                    "contentType": 2,
                    "toType": 1,
                    "text": null,
                    "location": null,
                    "contentMetadata": null
                }
            }]
        })
        .to_string();
        let (status, text) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::OK);
        assert!(text.is_empty());

        let sent = sent_texts(&server).await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["to"], json!(["U1"]));
        assert_eq!(sent[0]["content"]["text"], NON_TEXT_REPLY);
    }

    #[tokio::test]
    async fn test_operation_sends_welcome_to_param() {
        let server = line_server(200).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = json!({
            "result": [{
                "eventType": EVENT_TYPE_OPERATION,
                "content": { "opType": 4, "params": ["u0cc15697597f61dd8b01cea8b027050e", null, null] }
            }]
        })
        .to_string();
        let (status, _) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::OK);

        let sent = sent_texts(&server).await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["to"], json!(["u0cc15697597f61dd8b01cea8b027050e"]));
        assert_eq!(sent[0]["content"]["text"], WELCOME_TEXT);
    }

    #[tokio::test]
    async fn test_operation_with_non_string_param_is_bad_request() {
        let server = line_server(200).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = json!({
            "Result": [{ "eventType": EVENT_TYPE_OPERATION, "content": { "params": [12345] } }]
        })
        .to_string();
        let (status, text) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(text.contains("params[0]"));
        assert!(sent_texts(&server).await.is_empty());
    }

    #[tokio::test]
    async fn test_operation_without_params_is_bad_request() {
        let server = line_server(200).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = json!({ "Result": [{ "eventType": EVENT_TYPE_OPERATION }] }).to_string();
        let (status, text) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(text, "missing field: params[0]");
    }

    #[tokio::test]
    async fn test_unknown_event_type_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = json!({
            "Result": [{ "eventType": "999", "content": { "from": "U1", "contentType": 1, "text": "hi" } }]
        })
        .to_string();
        let (status, text) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::OK);
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_only_first_event_is_handled() {
        let server = line_server(200).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = json!({
            "Result": [
                { "eventType": EVENT_TYPE_MESSAGE, "content": { "from": "U1", "contentType": 1, "text": "one" } },
                { "eventType": EVENT_TYPE_MESSAGE, "content": { "from": "U2", "contentType": 1, "text": "two" } }
            ]
        })
        .to_string();
        let (status, _) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::OK);

        let sent = sent_texts(&server).await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["content"]["text"], "one");
    }

    #[tokio::test]
    async fn test_empty_result_is_ok() {
        let server = line_server(200).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let (status, _) = post_callback(router, r#"{"Result":[]}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(sent_texts(&server).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_returns_500_with_message() {
        let server = line_server(200).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let (status, text) = post_callback(router, "{not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let expected = serde_json::from_str::<CallbackEnvelope>("{not json")
            .unwrap_err()
            .to_string();
        assert_eq!(text, expected);
    }

    #[tokio::test]
    async fn test_platform_rejection_still_returns_200() {
        let server = line_server(500).await;
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state(&server.uri(), "http://unused", store));

        let body = message(json!({ "from": "U1", "contentType": 1, "text": "hi" }));
        let (status, _) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sent_texts(&server).await.len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_returns_500() {
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state("http://127.0.0.1:1", "http://unused", store));

        let body = message(json!({ "from": "U1", "contentType": 1, "text": "hi" }));
        let (status, text) = post_callback(router, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_non_post_returns_404() {
        let store = Arc::new(InMemoryAirStateStore::new());
        let router = app(test_support::state("http://unused", "http://unused", store));

        for verb in [Method::GET, Method::PUT, Method::DELETE] {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method(verb)
                        .uri("/callback")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }
}
