// src/notify/push.rs
use super::{Notifier, NotifyError};
use crate::config::PushConfig;
use crate::monitor::Notification;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Pushover-style form POST with a one-line summary.
pub struct PushNotifier {
    url: Url,
    token: String,
    user: String,
    client: Client,
}

impl PushNotifier {
    pub fn new(config: &PushConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create push HTTP client")?;

        Ok(Self {
            url: config.url.clone(),
            token: config.token.clone(),
            user: config.user.clone(),
            client,
        })
    }

    pub fn message(notification: &Notification) -> String {
        format!(
            "State: {} Response: {} ({})",
            notification.classification,
            notification.result.body(),
            notification.result.status_code()
        )
    }
}

#[async_trait]
impl Notifier for PushNotifier {
    fn name(&self) -> &'static str {
        "push"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = Self::message(notification);
        self.client
            .post(self.url.as_str())
            .form(&[
                ("token", self.token.as_str()),
                ("user", self.user.as_str()),
                ("message", message.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
