// src/notify/mod.rs
mod dispatcher;
mod email;
mod push;

pub use dispatcher::Dispatcher;
pub use email::{EmailNotifier, EmailReport};
pub use push::PushNotifier;

use crate::monitor::Notification;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to render email: {0}")]
    Template(#[from] askama::Error),

    #[error("Failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Push request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A delivery channel for state-change notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in logs and metrics (e.g. "email").
    fn name(&self) -> &'static str;

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}
