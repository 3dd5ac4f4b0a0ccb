use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::ReminderConfig;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Push transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Push relay rejected the notification with status {0}")]
    Rejected(u16),
}

/// Delivers one notification to one browser push subscription.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(&self, subscription: &Value, payload: &Value) -> Result<(), PushError>;
}

/// Forwards notifications to a web-push relay over HTTP.
///
/// The relay receives `{"subscription": ..., "payload": ...}` and owns the
/// VAPID signing and payload encryption.
pub struct HttpPushGateway {
    client: reqwest::Client,
    relay_url: String,
    token: Option<String>,
}

impl HttpPushGateway {
    pub fn new(relay_url: impl Into<String>, token: Option<String>) -> Result<Self, PushError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            relay_url: relay_url.into(),
            token,
        })
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    async fn send(&self, subscription: &Value, payload: &Value) -> Result<(), PushError> {
        let mut request = self.client.post(&self.relay_url).json(&json!({
            "subscription": subscription,
            "payload": payload,
        }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(PushError::Rejected(resp.status().as_u16()));
        }
        Ok(())
    }
}

/// Gateway for deployments without a relay: notifications are only logged.
pub struct LogPushGateway;

#[async_trait]
impl PushGateway for LogPushGateway {
    async fn send(&self, subscription: &Value, payload: &Value) -> Result<(), PushError> {
        let endpoint = subscription
            .get("endpoint")
            .and_then(Value::as_str)
            .unwrap_or("<no endpoint>");
        tracing::info!("Push to {} (no relay configured): {}", endpoint, payload);
        Ok(())
    }
}

/// Pick the relay gateway when one is configured, else the logging one.
pub fn gateway_from_config(config: &ReminderConfig) -> Result<Arc<dyn PushGateway>, PushError> {
    match &config.push_relay_url {
        Some(url) => Ok(Arc::new(HttpPushGateway::new(url.clone(), config.push_relay_token.clone())?)),
        None => {
            tracing::warn!("REMINDER_PUSH_RELAY_URL not set, reminders will only be logged");
            Ok(Arc::new(LogPushGateway))
        }
    }
}
