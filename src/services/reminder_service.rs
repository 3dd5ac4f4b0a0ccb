use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::json;

use crate::database::{CredentialStore, DatabaseError};

use super::PushGateway;

/// Outcome of one dispatch round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub subscribers: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Opted in but without a stored subscription.
    pub skipped: usize,
}

/// Sends the daily "write in your diary" greeting.
pub struct ReminderService {
    users: Arc<dyn CredentialStore>,
    gateway: Arc<dyn PushGateway>,
}

impl ReminderService {
    pub fn new(users: Arc<dyn CredentialStore>, gateway: Arc<dyn PushGateway>) -> Self {
        Self { users, gateway }
    }

    /// Push one greeting to every opted-in user.
    ///
    /// Only the subscriber query can fail; a failed push is logged and
    /// counted in the summary.
    pub async fn dispatch(&self) -> Result<DispatchSummary, DatabaseError> {
        let users = self.users.list_reminder_subscribers().await?;
        if users.is_empty() {
            tracing::info!("No user subscribed yet");
            return Ok(DispatchSummary::default());
        }

        let mut summary = DispatchSummary {
            subscribers: users.len(),
            ..DispatchSummary::default()
        };

        let sends = users.iter().filter_map(|user| {
            let Some(subscription) = user.push_subscription.as_ref() else {
                tracing::debug!("User {} has reminders on but no subscription", user.id);
                return None;
            };
            let payload = json!({ "title": format!("Hi {}", user.full_name) });
            let gateway = self.gateway.clone();
            Some(async move {
                let result = gateway.send(subscription, &payload).await;
                (user.id, result)
            })
        });

        let results = join_all(sends).await;
        summary.skipped = summary.subscribers - results.len();

        for (user_id, result) in results {
            match result {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    tracing::warn!("Reminder push to user {} failed: {}", user_id, e);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            "Reminder dispatch: {} delivered, {} failed, {} skipped",
            summary.delivered,
            summary.failed,
            summary.skipped
        );
        Ok(summary)
    }

    /// Dispatch now and then once per `period`, forever.
    pub async fn run_every(&self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = self.dispatch().await {
                tracing::error!("Reminder dispatch failed: {}", e);
            }
        }
    }
}
