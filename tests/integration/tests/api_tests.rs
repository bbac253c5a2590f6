//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Environment variables: DATABASE_URL, JWT_SECRET, API_PORT
//!
//! Run with: cargo test -p integration-tests --test api_tests

use board_core::UserRole;
use integration_tests::{assert_json, assert_status, check_test_env, fixtures::*, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn board(server: &TestServer) -> (String, String) {
    let admin = server.staff(UserRole::Admin).await.unwrap();
    let request = CreateBoardRequest::unique();
    let response = server.post_auth("/api/boards", &admin, &request).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();
    (request.label, admin)
}

async fn start_thread(server: &TestServer, label: &str, subject: &str) -> PostCreated {
    let response = server
        .post_form(
            &format!("/api/boards/{label}/threads"),
            None,
            thread_form(subject, "opening post"),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn reply(server: &TestServer, label: &str, thread: i64, form: reqwest::multipart::Form) -> PostCreated {
    let response = server
        .post_form(&format!("/api/boards/{label}/threads/{thread}/replies"), None, form)
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Posting Tests
// ============================================================================

#[tokio::test]
async fn test_numbers_are_shared_across_threads() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (label, _) = board(&server).await;

    let first = start_thread(&server, &label, "first").await;
    let second = start_thread(&server, &label, "second").await;
    let answer = reply(&server, &label, first.thread_number, reply_form("reply")).await;

    assert_eq!(first.board, label);
    assert_eq!(first.post_number, 1);
    assert_eq!(second.post_number, 2);
    assert_eq!(answer.post_number, 3);
    assert_eq!(answer.thread_number, 1);
}

#[tokio::test]
async fn test_concurrent_replies_get_distinct_numbers() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (label, _) = board(&server).await;
    let op = start_thread(&server, &label, "race").await;

    let url = format!(
        "{}/api/boards/{label}/threads/{}/replies",
        server.base_url(),
        op.thread_number
    );
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8 {
        let client = server.client.clone();
        let url = url.clone();
        tasks.spawn(async move {
            let response = client
                .post(url)
                .multipart(reply_form(&format!("reply {i}")))
                .send()
                .await
                .unwrap();
            assert_json::<PostCreated>(response, StatusCode::CREATED).await.unwrap()
        });
    }

    let mut numbers = Vec::new();
    while let Some(created) = tasks.join_next().await {
        numbers.push(created.unwrap().post_number);
    }
    numbers.sort_unstable();
    assert_eq!(numbers, (2..=9).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_sage_does_not_bump() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (label, _) = board(&server).await;
    let older = start_thread(&server, &label, "older").await;
    let newer = start_thread(&server, &label, "newer").await;

    reply(&server, &label, older.thread_number, sage_form("sage")).await;
    let page: ThreadPage = assert_json(
        server.get(&format!("/api/boards/{label}/threads")).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(page.page, 0);
    assert_eq!(page.board, label);
    assert_eq!(page.threads[0].number, newer.thread_number);
    assert_eq!(page.threads[1].reply_count, 1);

    reply(&server, &label, older.thread_number, reply_form("bump")).await;
    let page: ThreadPage = assert_json(
        server.get(&format!("/api/boards/{label}/threads")).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(page.threads[0].number, older.thread_number);
    assert_eq!(page.threads[0].subject.as_deref(), Some("older"));
}

#[tokio::test]
async fn test_validation_errors() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (label, _) = board(&server).await;

    let response = server
        .post_form(
            &format!("/api/boards/{label}/threads"),
            None,
            reqwest::multipart::Form::new().text("body", "  "),
        )
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["body"].is_array());
}

// ============================================================================
// Moderation Tests
// ============================================================================

#[tokio::test]
async fn test_lock_and_sticky() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (label, admin) = board(&server).await;
    let first = start_thread(&server, &label, "first").await;
    start_thread(&server, &label, "second").await;

    let path = format!("/api/boards/{label}/threads/{}", first.thread_number);
    let summary: ThreadSummary = assert_json(
        server
            .patch_auth(&format!("{path}/sticky"), &admin, &json!({ "value": true }))
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert!(summary.stickied);

    let summary: ThreadSummary = assert_json(
        server
            .patch_auth(&format!("{path}/lock"), &admin, &json!({ "value": true }))
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert!(summary.locked);

    let response = server
        .post_form(&format!("{path}/replies"), None, reply_form("too late"))
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    let page: ThreadPage = assert_json(
        server.get(&format!("/api/boards/{label}/threads")).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(page.threads[0].number, first.thread_number);
}

#[tokio::test]
async fn test_user_cannot_lock() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (label, _) = board(&server).await;
    let op = start_thread(&server, &label, "thread").await;

    let registration = RegisterRequest::unique();
    let response = server.post("/api/users", &registration).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();
    let login: Value = assert_json(
        server
            .post(
                "/api/auth/login",
                &json!({ "username": registration.username, "password": registration.password }),
            )
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    let token = login["access_token"].as_str().unwrap();

    let response = server
        .patch_auth(
            &format!("/api/boards/{label}/threads/{}/lock", op.thread_number),
            token,
            &json!({ "value": true }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_delete_post() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (label, admin) = board(&server).await;
    let op = start_thread(&server, &label, "thread").await;
    let answer = reply(&server, &label, op.thread_number, reply_form("reply")).await;

    let response = server
        .delete(
            &format!("/api/boards/{label}/posts/{}", answer.post_number),
            None,
            &json!({ "deletion_code": answer.deletion_code }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .delete(
            &format!("/api/boards/{label}/posts/{}", op.post_number),
            Some(&admin),
            &json!({}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .get(&format!("/api/boards/{label}/threads/{}", op.thread_number))
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}
