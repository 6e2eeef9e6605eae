// src/monitor/watchdog.rs
use super::state::{Action, MonitorState, StateMachine, Step};
use crate::config::PolicyConfig;
use crate::metrics::{MetricsCollector, Timer};
use crate::notify::Dispatcher;
use crate::probe::Prober;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// The probe / evaluate / notify / sleep loop.
pub struct Watchdog<P> {
    prober: P,
    machine: StateMachine,
    dispatcher: Dispatcher,
    metrics: Option<Arc<MetricsCollector>>,
}

impl<P: Prober> Watchdog<P> {
    pub fn new(prober: P, policy: PolicyConfig, dispatcher: Dispatcher) -> Self {
        Self {
            prober,
            machine: StateMachine::new(policy),
            dispatcher,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> &MonitorState {
        self.machine.state()
    }

    /// Run one iteration without sleeping and return what was decided.
    pub async fn tick(&mut self) -> Step {
        let timer = Timer::new();
        let result = self.prober.probe().await;
        let elapsed = timer.elapsed();

        debug!(
            code = result.status_code(),
            outcome = result.outcome_label(),
            "Probe response: {} ({:?})",
            result.body(),
            elapsed
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_probe(result.outcome_label(), elapsed);
        }

        let step = self.machine.evaluate(result);

        if let Some(metrics) = &self.metrics {
            let state = self.machine.state();
            metrics.update_state(state.health, state.consecutive_failures);
        }

        match &step.action {
            Action::Notify(notification) => {
                self.dispatcher.dispatch(notification).await;
            }
            Action::Suppressed(state) => {
                info!(%state, "Not sending notifications - too many messages for event");
                if let Some(metrics) = &self.metrics {
                    metrics.record_suppressed();
                }
            }
            Action::None => {}
        }

        step
    }

    /// Loop until `shutdown` resolves. An in-flight probe or delivery is
    /// finished first; only the sleep between iterations is interrupted.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            target_url = %self.prober.target(),
            tko = self.machine.policy().tko,
            channels = ?self.dispatcher.channels(),
            "Watchdog started"
        );

        loop {
            let step = self.tick().await;
            debug!("Re-probing in {:?}", step.sleep);

            tokio::select! {
                _ = tokio::time::sleep(step.sleep) => {}
                _ = &mut shutdown => {
                    info!("Watchdog shutting down");
                    break;
                }
            }
        }
    }
}
