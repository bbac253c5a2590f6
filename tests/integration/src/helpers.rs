//! Test helpers for integration tests
//!
//! Spawns a server on an ephemeral port and wraps the HTTP calls the tests make.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use board_api::middleware::HttpSettings;
use board_api::{create_app, create_app_state, AppState};
use board_common::AppConfig;
use board_core::{User, UserRole};
use reqwest::{multipart::Form, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{unique_suffix, STAFF_PASSWORD};

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    state: AppState,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(&config).await?;
        let app = create_app(state.clone(), &HttpSettings::from(&config));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            state,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Create a staff account straight in the store and sign in as it
    pub async fn staff(&self, role: UserRole) -> Result<String> {
        let ctx = self.state.service_context();
        let username = format!("staff{}", unique_suffix());
        let mut user = User::new(ctx.generate_id(), username.clone(), format!("{username}@example.com"));
        user.set_role(role);
        let hash = ctx.password_service().hash(STAFF_PASSWORD).await?;
        ctx.user_repo().create(&user, &hash).await?;

        let response = self
            .post(
                "/api/auth/login",
                &serde_json::json!({ "username": username, "password": STAFF_PASSWORD }),
            )
            .await?;
        let body: serde_json::Value = assert_json(response, StatusCode::OK).await?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("login response without access_token"))
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    pub async fn post_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Send a posting form
    pub async fn post_form(&self, path: &str, token: Option<&str>, form: Form) -> Result<Response> {
        let builder = self.client.post(self.url(path)).multipart(form);
        Ok(Self::authorized(builder, token).send().await?)
    }

    pub async fn patch_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        Ok(self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete<T: Serialize>(&self, path: &str, token: Option<&str>, body: &T) -> Result<Response> {
        let builder = self.client.delete(self.url(path)).json(body);
        Ok(Self::authorized(builder, token).send().await?)
    }
}

/// Configuration from the environment, with uploads kept in a scratch directory
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    config.storage.upload_dir = std::env::temp_dir()
        .join(format!("board-it-{}", std::process::id()))
        .to_string_lossy()
        .into_owned();
    config.captcha.secret = None;

    Ok(config)
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    for key in ["DATABASE_URL", "JWT_SECRET", "API_PORT"] {
        if std::env::var(key).is_err() {
            eprintln!("Skipping test: {key} not set");
            return false;
        }
    }
    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
