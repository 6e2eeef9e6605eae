// src/notify/dispatcher.rs
use super::Notifier;
use crate::metrics::MetricsCollector;
use crate::monitor::Notification;
use std::sync::Arc;
use tracing::{info, warn};

/// Fans a notification out to every configured channel.
///
/// Channels are independent: one failing never stops the others, and no
/// error escapes to the caller.
pub struct Dispatcher {
    notifiers: Vec<Box<dyn Notifier>>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Dispatcher {
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self {
            notifiers,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn channels(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Returns how many channels delivered successfully.
    pub async fn dispatch(&self, notification: &Notification) -> usize {
        let results = futures::future::join_all(
            self.notifiers.iter().map(|n| n.notify(notification)),
        )
        .await;

        let mut delivered = 0;
        for (notifier, result) in self.notifiers.iter().zip(results) {
            let outcome = match result {
                Ok(()) => {
                    delivered += 1;
                    info!(
                        channel = notifier.name(),
                        state = %notification.classification,
                        "Notification sent"
                    );
                    "sent"
                }
                Err(e) => {
                    warn!(channel = notifier.name(), error = %e, "Notification failed");
                    "failed"
                }
            };

            if let Some(metrics) = &self.metrics {
                metrics.record_notification(notifier.name(), outcome);
            }
        }

        delivered
    }
}
