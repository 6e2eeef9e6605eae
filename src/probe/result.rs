// src/probe/result.rs
use chrono::{DateTime, Utc};
use std::time::Duration;

/// What a single probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The endpoint answered 200.
    Success { body: String },
    /// The endpoint answered with any other status.
    HttpError { status: u16, body: String },
    /// No response within the configured timeout.
    Timeout { after: Duration },
    /// Connection refused, DNS failure, TLS error and the like.
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub timestamp: DateTime<Utc>,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn new(outcome: ProbeOutcome) -> Self {
        Self::at(Utc::now(), outcome)
    }

    pub fn at(timestamp: DateTime<Utc>, outcome: ProbeOutcome) -> Self {
        Self { timestamp, outcome }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Success { .. })
    }

    /// HTTP status code, with 0 standing for a transport-level failure.
    pub fn status_code(&self) -> u16 {
        match &self.outcome {
            ProbeOutcome::Success { .. } => 200,
            ProbeOutcome::HttpError { status, .. } => *status,
            ProbeOutcome::Timeout { .. } | ProbeOutcome::Transport(_) => 0,
        }
    }

    /// Response payload, or a description of the failure for status 0.
    pub fn body(&self) -> String {
        match &self.outcome {
            ProbeOutcome::Success { body } | ProbeOutcome::HttpError { body, .. } => body.clone(),
            ProbeOutcome::Timeout { after } => format!("timed out after {:?}", after),
            ProbeOutcome::Transport(reason) => reason.clone(),
        }
    }

    /// Short label used for metrics and logs.
    pub fn outcome_label(&self) -> &'static str {
        match self.outcome {
            ProbeOutcome::Success { .. } => "success",
            ProbeOutcome::HttpError { .. } => "http_error",
            ProbeOutcome::Timeout { .. } => "timeout",
            ProbeOutcome::Transport(_) => "transport_error",
        }
    }

    /// `dd/mm/YYYY HH:MM:SS` in UTC, as shown in notifications.
    pub fn human_time(&self) -> String {
        self.timestamp.format("%d/%m/%Y %H:%M:%S").to_string()
    }
}
