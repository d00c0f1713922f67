//! [`Notifier`] that forwards messages to an optional webhook.

use std::time::Duration;

use serde::Serialize;

use autoapply_app::ports::{NotificationError, Notifier};
use autoapply_domain::id::UserId;

#[derive(Serialize)]
struct NotificationPayload<'a> {
    user_id: UserId,
    message: &'a str,
}

/// Delivers notifications by POSTing them to a webhook.
///
/// Without a webhook URL messages are only written to the log.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl WebhookNotifier {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: crate::client(timeout)?,
            url: url.filter(|url| !url.trim().is_empty()),
        })
    }

    /// Whether messages leave the process at all.
    #[must_use]
    pub fn is_delivering(&self) -> bool {
        self.url.is_some()
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, user_id: UserId, message: &str) -> Result<(), NotificationError> {
        let Some(url) = self.url.as_deref() else {
            tracing::info!(%user_id, text = message, "notification");
            return Ok(());
        };

        self.client
            .post(url)
            .json(&NotificationPayload { user_id, message })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| NotificationError(Box::new(err)))?;

        tracing::debug!(%user_id, "notification delivered");
        Ok(())
    }
}
