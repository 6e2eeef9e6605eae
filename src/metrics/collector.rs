// src/metrics/collector.rs
use crate::monitor::HealthState;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::Result;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
        }
        buffer
    }
}

pub struct MetricsCollector {
    // Probe metrics
    pub probes_total: IntCounterVec,
    pub probe_duration_seconds: Histogram,

    // State machine metrics
    pub health_state: IntGauge,
    pub consecutive_failures: IntGauge,

    // Notification metrics
    pub notifications_total: IntCounterVec,
    pub notifications_suppressed_total: IntCounter,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        // Probe metrics
        let probes_total = IntCounterVec::new(
            Opts::new("watchdog_probes_total", "Total number of probes by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(probes_total.clone()))?;

        let probe_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "watchdog_probe_duration_seconds",
            "Probe duration in seconds",
        ))?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        // State machine metrics
        let health_state = IntGauge::new(
            "watchdog_health_state",
            "Current health state (0=ok, 1=warning, 2=critical)",
        )?;
        registry.register(Box::new(health_state.clone()))?;

        let consecutive_failures = IntGauge::new(
            "watchdog_consecutive_failures",
            "Consecutive failed probes since the last OK or threshold crossing",
        )?;
        registry.register(Box::new(consecutive_failures.clone()))?;

        // Notification metrics
        let notifications_total = IntCounterVec::new(
            Opts::new(
                "watchdog_notifications_total",
                "Notifications attempted per channel and result",
            ),
            &["channel", "result"],
        )?;
        registry.register(Box::new(notifications_total.clone()))?;

        let notifications_suppressed_total = IntCounter::new(
            "watchdog_notifications_suppressed_total",
            "Threshold crossings whose notification was suppressed",
        )?;
        registry.register(Box::new(notifications_suppressed_total.clone()))?;

        Ok(Self {
            probes_total,
            probe_duration_seconds,
            health_state,
            consecutive_failures,
            notifications_total,
            notifications_suppressed_total,
        })
    }

    pub fn record_probe(&self, outcome: &str, duration: Duration) {
        self.probes_total.with_label_values(&[outcome]).inc();
        self.probe_duration_seconds.observe(duration.as_secs_f64());
    }

    pub fn update_state(&self, state: HealthState, consecutive_failures: u32) {
        self.health_state.set(state.severity());
        self.consecutive_failures.set(consecutive_failures as i64);
    }

    pub fn record_notification(&self, channel: &str, result: &str) {
        self.notifications_total
            .with_label_values(&[channel, result])
            .inc();
    }

    pub fn record_suppressed(&self) {
        self.notifications_suppressed_total.inc();
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
