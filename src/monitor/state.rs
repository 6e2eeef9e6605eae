// src/monitor/state.rs
use crate::config::PolicyConfig;
use crate::probe::ProbeResult;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Ok,
    Warning,
    Critical,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Ok => "OK",
            HealthState::Warning => "WARNING",
            HealthState::Critical => "CRITICAL",
        }
    }

    /// Gauge value exported in metrics.
    pub fn severity(&self) -> i64 {
        match self {
            HealthState::Ok => 0,
            HealthState::Warning => 1,
            HealthState::Critical => 2,
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of the monitoring loop.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub health: HealthState,
    pub consecutive_failures: u32,
    pub first_failure: Option<ProbeResult>,
    pub notifications_sent: u32,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            health: HealthState::Ok,
            consecutive_failures: 0,
            first_failure: None,
            notifications_sent: 0,
        }
    }
}

/// Everything a notifier needs to report one transition.
#[derive(Debug, Clone)]
pub struct Notification {
    pub classification: HealthState,
    /// The probe that triggered the transition ("hard event").
    pub result: ProbeResult,
    /// The probe that opened the failure streak ("soft event").
    pub first_failure: Option<ProbeResult>,
    /// Set on the last notification before suppression kicks in.
    pub final_notice: bool,
    pub tko: u32,
}

impl Notification {
    /// When the streak began, falling back to the triggering probe.
    pub fn streak_start(&self) -> &ProbeResult {
        self.first_failure.as_ref().unwrap_or(&self.result)
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    None,
    Notify(Notification),
    /// A threshold was crossed but the per-streak cap is exhausted.
    Suppressed(HealthState),
}

#[derive(Debug, Clone)]
pub struct Step {
    pub action: Action,
    pub sleep: Duration,
}

/// The OK / WARNING / CRITICAL transition logic.
///
/// A threshold crossing re-arms the failure counter while the state stays
/// non-OK, so an ongoing outage raises a reminder every `tko` failed probes
/// until `max_notifications` have gone out for the streak.
pub struct StateMachine {
    policy: PolicyConfig,
    state: MonitorState,
}

impl StateMachine {
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            policy,
            state: MonitorState::default(),
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn evaluate(&mut self, result: ProbeResult) -> Step {
        if result.is_healthy() {
            self.on_success(result)
        } else {
            self.on_failure(result)
        }
    }

    fn on_success(&mut self, result: ProbeResult) -> Step {
        let previous = std::mem::take(&mut self.state);
        let sleep = self.policy.check_period();

        if previous.health == HealthState::Ok {
            if previous.consecutive_failures > 0 {
                debug!(
                    "Recovered after {} failed probe(s) below threshold",
                    previous.consecutive_failures
                );
            }
            return Step {
                action: Action::None,
                sleep,
            };
        }

        info!("State: {} -> OK", previous.health);
        Step {
            action: Action::Notify(Notification {
                classification: HealthState::Ok,
                result,
                first_failure: previous.first_failure,
                final_notice: false,
                tko: self.policy.tko,
            }),
            sleep,
        }
    }

    fn on_failure(&mut self, result: ProbeResult) -> Step {
        if self.state.first_failure.is_none() {
            debug!(
                code = result.status_code(),
                "Caching first failure of streak"
            );
            self.state.first_failure = Some(result.clone());
        }

        self.state.consecutive_failures += 1;
        debug!(
            "Failed probe {}/{} (code {})",
            self.state.consecutive_failures,
            self.policy.tko,
            result.status_code()
        );

        if self.state.consecutive_failures < self.policy.tko {
            return Step {
                action: Action::None,
                sleep: self.policy.retry_interval(),
            };
        }

        let classification = if result.body() == self.policy.stale_body {
            HealthState::Warning
        } else {
            HealthState::Critical
        };

        self.state.health = classification;
        self.state.consecutive_failures = 0;

        let sent = self.state.notifications_sent;
        self.state.notifications_sent = sent.saturating_add(1);

        let action = if sent < self.policy.max_notifications {
            warn!("State: {}", classification);
            Action::Notify(Notification {
                classification,
                result,
                first_failure: self.state.first_failure.clone(),
                final_notice: sent + 1 == self.policy.max_notifications,
                tko: self.policy.tko,
            })
        } else {
            warn!(
                "State: {} (notification suppressed, {} already sent for this event)",
                classification, self.policy.max_notifications
            );
            Action::Suppressed(classification)
        };

        Step {
            action,
            sleep: self.policy.check_period(),
        }
    }
}
