// src/config/models.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub probe: ProbeConfig,
    pub policy: PolicyConfig,
    pub email: EmailConfig,
    pub push: PushConfig,
    pub metrics: MetricsConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.probe.validate()?;
        self.policy.validate()?;
        self.email.validate()?;
        self.push.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub url: Url,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if !matches!(self.url.scheme(), "http" | "https") {
            bail!("probe.url must be an http(s) URL, got {}", self.url);
        }
        if self.timeout_secs == 0 {
            bail!("probe.timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:8080/management/healthcheck")
                .expect("default probe URL is valid"),
            timeout_secs: 5,
            user_agent: concat!("http-watchdog/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Thresholds and timing for the monitoring state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Consecutive failed probes before a notification is raised.
    pub tko: u32,
    /// Sleep between probes while a failure streak is below `tko`.
    pub retry_interval_secs: u64,
    /// Sleep between probes while healthy, and after each threshold crossing.
    pub check_period_secs: u64,
    /// Response body that classifies a failure as WARNING instead of CRITICAL.
    pub stale_body: String,
    /// Threshold notifications sent per failure streak before suppression.
    pub max_notifications: u32,
}

impl PolicyConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn check_period(&self) -> Duration {
        Duration::from_secs(self.check_period_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.tko == 0 {
            bail!("policy.tko must be at least 1");
        }
        if self.retry_interval_secs == 0 || self.check_period_secs == 0 {
            bail!("policy intervals must be greater than 0");
        }
        if self.max_notifications == 0 {
            bail!("policy.max_notifications must be at least 1");
        }
        Ok(())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            tko: 3,
            retry_interval_secs: 10,
            check_period_secs: 600,
            stale_body: "HEARTBEAT_STALE".to_string(),
            max_notifications: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    /// Name of the watched service, used in the subject and body.
    pub service_name: String,
    pub from: String,
    pub to: Vec<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub timeout_secs: u64,
}

impl EmailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.enabled && self.to.is_empty() {
            bail!("email.to must list at least one recipient when email is enabled");
        }
        if self.timeout_secs == 0 {
            bail!("email.timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "Alerta".to_string(),
            from: "Watchdog <watchdog@localhost>".to_string(),
            to: vec!["root@localhost".to_string()],
            smtp_host: "localhost".to_string(),
            smtp_port: 25,
            timeout_secs: 10,
        }
    }
}

/// Pushover-compatible push notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub enabled: bool,
    pub url: Url,
    pub token: String,
    pub user: String,
    pub timeout_secs: u64,
}

impl PushConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.enabled && (self.token.is_empty() || self.user.is_empty()) {
            bail!("push.token and push.user are required when push is enabled");
        }
        if self.timeout_secs == 0 {
            bail!("push.timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: Url::parse("https://api.pushover.net/1/messages.json")
                .expect("default push URL is valid"),
            token: String::new(),
            user: String::new(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9100,
            path: "/metrics".to_string(),
        }
    }
}
