//! Router tests against the in-memory store
//!
//! Requests go through the full middleware stack with `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use board_api::middleware::{HttpSettings, REQUEST_ID_HEADER};
use board_api::{create_app, AppState};
use board_common::JwtService;
use board_core::{User, UserRole};
use board_db::MemoryStore;
use board_media::{AttachmentProcessor, MemoryFileStorage, OEmbedResolver, ProcessorConfig};
use board_service::services::DisabledCaptchaVerifier;
use board_service::{ServiceContext, ServiceContextBuilder};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "X-ROUTER-TEST";
const PASSWORD: &str = "correct horse battery";

struct TestApp {
    app: Router,
    state: AppState,
}

fn context() -> ServiceContext {
    let embeds = OEmbedResolver::new(Duration::from_millis(100), Duration::from_millis(100)).unwrap();
    let processor = AttachmentProcessor::new(
        Arc::new(MemoryFileStorage::new()),
        Arc::new(embeds),
        ProcessorConfig::default(),
    );

    ServiceContextBuilder::new()
        .store(Arc::new(MemoryStore::new()))
        .attachment_processor(Arc::new(processor))
        .captcha_verifier(Arc::new(DisabledCaptchaVerifier))
        .jwt_service(Arc::new(JwtService::new("router-test-secret-that-is-long-enough", 900)))
        .build()
        .unwrap()
}

impl TestApp {
    fn new() -> Self {
        let state = AppState::new(context());
        let app = create_app(state.clone(), &HttpSettings::default());
        Self { app, state }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn staff(&self, username: &str, role: UserRole) -> String {
        let ctx = self.state.service_context();
        let mut user = User::new(ctx.generate_id(), username.to_string(), format!("{username}@example.com"));
        user.set_role(role);
        let hash = ctx.password_service().hash(PASSWORD).await.unwrap();
        ctx.user_repo().create(&user, &hash).await.unwrap();

        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/api/auth/login",
                None,
                &json!({ "username": username, "password": PASSWORD }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn board(&self, token: &str, label: &str) {
        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/api/boards",
                Some(token),
                &json!({ "label": label, "name": "Fitness" }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_and_request_id() {
    let app = TestApp::new();

    let response = app.app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let (status, body) = app.send(get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"], "healthy");
}

#[tokio::test]
async fn test_thread_and_reply_numbering() {
    let app = TestApp::new();
    let admin = app.staff("admin", UserRole::Admin).await;
    app.board(&admin, "fit").await;

    let (status, op) = app
        .send(form(
            "/api/boards/fit/threads",
            &[("subject", "Squat form"), ("body", "post your numbers")],
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{op}");
    assert_eq!(op["thread_number"], 1);
    assert_eq!(op["post_number"], 1);
    assert_eq!(op["post"]["name"], "Anonymous");
    assert!(op["deletion_code"].as_str().is_some_and(|c| !c.is_empty()));

    let (status, reply) = app
        .send(form(
            "/api/boards/fit/threads/1/replies",
            &[("body", "140kg"), ("sage", "on")],
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{reply}");
    assert_eq!(reply["thread_number"], 1);
    assert_eq!(reply["post_number"], 2);
    assert_eq!(reply["post"]["sage"], true);

    let (status, thread) = app.send(get("/api/boards/fit/threads/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["subject"], "Squat form");
    assert_eq!(thread["reply_count"], 1);
    assert_eq!(thread["posts"].as_array().unwrap().len(), 2);
    assert!(thread["posts"][0].get("deletion_code").is_none());
    assert!(thread["posts"][0].get("ip").is_none());

    let (status, replies) = app.send(get("/api/boards/fit/threads/1/replies?since=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replies.as_array().unwrap().len(), 1);

    let (status, page) = app.send(get("/api/boards/fit/threads?page=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["threads"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_validation_errors_list_fields() {
    let app = TestApp::new();
    let admin = app.staff("admin", UserRole::Admin).await;
    app.board(&admin, "fit").await;

    let long_name = "n".repeat(40);
    let (status, body) = app
        .send(form(
            "/api/boards/fit/threads",
            &[("name", long_name.as_str()), ("body", "   ")],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["name"].is_array());
    assert!(body["error"]["details"]["body"].is_array());
}

#[tokio::test]
async fn test_error_codes() {
    let app = TestApp::new();

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/boards",
            None,
            &json!({ "label": "fit", "name": "Fitness" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "MISSING_AUTHORIZATION");

    let (status, body) = app.send(get("/api/boards/nope/threads")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "UNKNOWN_BOARD");

    let (status, body) = app.send(get("/api/boards/nope/threads/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PATH_PARAMETER");

    let janitor = app.staff("jan", UserRole::Janitor).await;
    let (status, _) = app
        .send(json_request(
            Method::POST,
            "/api/boards",
            Some(&janitor),
            &json!({ "label": "fit", "name": "Fitness" }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_lock_blocks_replies() {
    let app = TestApp::new();
    let admin = app.staff("admin", UserRole::Admin).await;
    app.board(&admin, "fit").await;
    app.send(form("/api/boards/fit/threads", &[("body", "op")])).await;

    let (status, body) = app
        .send(json_request(
            Method::PATCH,
            "/api/boards/fit/threads/1/lock",
            Some(&admin),
            &json!({ "value": true }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["locked"], true);

    let (status, body) = app
        .send(form("/api/boards/fit/threads/1/replies", &[("body", "late")]))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "THREAD_LOCKED");
}

#[tokio::test]
async fn test_delete_with_code_removes_thread() {
    let app = TestApp::new();
    let admin = app.staff("admin", UserRole::Admin).await;
    app.board(&admin, "fit").await;
    let (_, op) = app.send(form("/api/boards/fit/threads", &[("body", "op")])).await;
    let code = op["deletion_code"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(json_request(
            Method::DELETE,
            "/api/boards/fit/posts/1",
            None,
            &json!({ "deletion_code": "wrong" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(json_request(
            Method::DELETE,
            "/api/boards/fit/posts/1",
            None,
            &json!({ "deletion_code": code }),
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send(get("/api/boards/fit/threads/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_moderator_sees_ip() {
    let app = TestApp::new();
    let admin = app.staff("admin", UserRole::Admin).await;
    app.board(&admin, "fit").await;
    app.send(form("/api/boards/fit/threads", &[("body", "op")])).await;

    let request = Request::builder()
        .uri("/api/boards/fit/threads/1")
        .header(header::AUTHORIZATION, format!("Bearer {admin}"))
        .body(Body::empty())
        .unwrap();
    let (status, thread) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["posts"][0]["ip"], "203.0.113.7");
}

#[tokio::test]
async fn test_banned_ip_is_rejected_until_unbanned() {
    let app = TestApp::new();
    let admin = app.staff("admin", UserRole::Admin).await;
    let janitor = app.staff("jan", UserRole::Janitor).await;
    app.board(&admin, "fit").await;

    let ban = json!({ "ip": "203.0.113.7", "reason": "spam" });
    let (status, _) = app
        .send(json_request(Method::POST, "/api/bans", Some(&janitor), &ban))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app
        .send(json_request(Method::POST, "/api/bans", Some(&admin), &ban))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["status"], "ACTIVE");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = app.send(form("/api/boards/fit/threads", &[("body", "op")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["ip"][0]["code"], "banned");

    let request = Request::builder()
        .uri("/api/bans/current")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::empty())
        .unwrap();
    let (status, current) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["id"], id.as_str());

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            "/api/bans/not-a-number/unban",
            Some(&admin),
            &json!({ "reason": "appealed" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PATH_PARAMETER");

    let (status, lifted) = app
        .send(json_request(
            Method::PUT,
            &format!("/api/bans/{id}/unban"),
            Some(&admin),
            &json!({ "reason": "appealed" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{lifted}");
    assert_eq!(lifted["status"], "UNBANNED");

    let (status, _) = app.send(form("/api/boards/fit/threads", &[("body", "op")])).await;
    assert_eq!(status, StatusCode::CREATED);
}
