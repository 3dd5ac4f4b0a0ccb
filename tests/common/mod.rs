#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use diary_api::app::{self, AppState, Stores};
use diary_api::config::AppConfig;
use diary_api::database::MemoryStore;

pub const PASSWORD: &str = "correct-horse-42";

/// One in-process server on its own port and its own in-memory store.
pub struct TestApp {
    pub base_url: String,
    pub store: MemoryStore,
    pub client: reqwest::Client,
}

pub async fn spawn_app() -> Result<TestApp> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;

    let config = AppConfig::from_lookup(|name| match name {
        "JWT_SECRET" => Some("integration-test-secret".to_string()),
        "SECURITY_HASH_MEMORY_KIB" => Some("1024".to_string()),
        "SECURITY_HASH_ITERATIONS" => Some("1".to_string()),
        "API_ENABLE_REQUEST_LOGGING" => Some("false".to_string()),
        _ => None,
    })?;

    let store = MemoryStore::new();
    let state = AppState::new(config, Stores::memory(store.clone()))?;

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tokio::spawn(async move {
        axum::serve(listener, app::router(state)).await.ok();
    });

    Ok(TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        client: reqwest::Client::new(),
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sign up `email` with the shared test password and return the token.
    pub async fn signup(&self, email: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/v1/auth/signup"))
            .json(&json!({
                "full_name": "Test Writer",
                "email": email,
                "password": PASSWORD,
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "signup failed: {}", res.status());

        let body: Value = res.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("signup response has no token")
    }

    /// Create an entry as `token` and return its JSON.
    pub async fn create_entry(&self, token: &str, title: &str, body: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/api/v1/entries"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "body": body }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());

        let body: Value = res.json().await?;
        Ok(body["result"].clone())
    }
}
