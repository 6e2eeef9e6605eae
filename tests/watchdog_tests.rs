// tests/watchdog_tests.rs
use async_trait::async_trait;
use http_watchdog::config::PolicyConfig;
use http_watchdog::metrics::MetricsRegistry;
use http_watchdog::monitor::{Action, HealthState, Notification, Watchdog};
use http_watchdog::notify::{Dispatcher, Notifier, NotifyError};
use http_watchdog::probe::{ProbeOutcome, ProbeResult, Prober};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use url::Url;

/// Replays a fixed list of results, then reports healthy forever.
struct ScriptedProber {
    url: Url,
    script: Mutex<VecDeque<ProbeResult>>,
    exhausted: Mutex<Option<oneshot::Sender<()>>>,
}

impl ScriptedProber {
    fn new(script: Vec<ProbeResult>) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let prober = Self {
            url: Url::parse("http://service.test/health").unwrap(),
            script: Mutex::new(script.into()),
            exhausted: Mutex::new(Some(tx)),
        };
        (prober, rx)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self) -> ProbeResult {
        let mut script = self.script.lock().unwrap();
        let next = script.pop_front();
        if script.is_empty() {
            if let Some(tx) = self.exhausted.lock().unwrap().take() {
                let _ = tx.send(());
            }
        }
        next.unwrap_or_else(ok)
    }

    fn target(&self) -> &Url {
        &self.url
    }
}

type Log = Arc<Mutex<Vec<(&'static str, HealthState, bool)>>>;

struct Recording {
    name: &'static str,
    log: Log,
}

#[async_trait]
impl Notifier for Recording {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn notify(&self, n: &Notification) -> Result<(), NotifyError> {
        self.log
            .lock()
            .unwrap()
            .push((self.name, n.classification, n.final_notice));
        Ok(())
    }
}

struct Unreachable;

#[async_trait]
impl Notifier for Unreachable {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn notify(&self, _n: &Notification) -> Result<(), NotifyError> {
        Err("nobody@".parse::<lettre::Address>().unwrap_err().into())
    }
}

fn ok() -> ProbeResult {
    ProbeResult::new(ProbeOutcome::Success { body: "OK".into() })
}

fn fail(body: &str) -> ProbeResult {
    ProbeResult::new(ProbeOutcome::HttpError {
        status: 500,
        body: body.into(),
    })
}

fn recorders(log: &Log) -> Vec<Box<dyn Notifier>> {
    vec![
        Box::new(Recording {
            name: "email",
            log: log.clone(),
        }),
        Box::new(Recording {
            name: "push",
            log: log.clone(),
        }),
    ]
}

#[tokio::test]
async fn test_stale_heartbeat_scenario_sends_warning_then_recovery() {
    let log: Log = Arc::default();
    let (prober, _done) = ScriptedProber::new(vec![
        ok(),
        fail("Internal Server Error"),
        fail("Internal Server Error"),
        fail("HEARTBEAT_STALE"),
        ok(),
    ]);
    let policy = PolicyConfig::default();
    let mut watchdog = Watchdog::new(prober, policy.clone(), Dispatcher::new(recorders(&log)));

    let mut sleeps = Vec::new();
    let mut states = Vec::new();
    for _ in 0..5 {
        let step = watchdog.tick().await;
        sleeps.push(step.sleep);
        states.push(watchdog.state().health);
    }

    assert_eq!(
        states,
        vec![
            HealthState::Ok,
            HealthState::Ok,
            HealthState::Ok,
            HealthState::Warning,
            HealthState::Ok
        ]
    );
    assert_eq!(
        sleeps,
        vec![
            policy.check_period(),
            policy.retry_interval(),
            policy.retry_interval(),
            policy.check_period(),
            policy.check_period()
        ]
    );
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            ("email", HealthState::Warning, false),
            ("push", HealthState::Warning, false),
            ("email", HealthState::Ok, false),
            ("push", HealthState::Ok, false),
        ]
    );
}

#[tokio::test]
async fn test_transport_failures_escalate_to_critical() {
    let log: Log = Arc::default();
    let (prober, _done) = ScriptedProber::new(vec![
        ProbeResult::new(ProbeOutcome::Timeout {
            after: Duration::from_secs(5),
        }),
        ProbeResult::new(ProbeOutcome::Transport("connection refused".into())),
        ProbeResult::new(ProbeOutcome::Transport("connection refused".into())),
    ]);
    let mut watchdog = Watchdog::new(prober, PolicyConfig::default(), Dispatcher::new(recorders(&log)));

    watchdog.tick().await;
    watchdog.tick().await;
    let step = watchdog.tick().await;

    assert!(matches!(step.action, Action::Notify(_)));
    assert_eq!(watchdog.state().health, HealthState::Critical);
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_long_outage_is_capped_and_loop_survives_delivery_failures() {
    let tko = 3;
    let log: Log = Arc::default();
    let mut script: Vec<ProbeResult> = (0..5 * tko).map(|_| fail("down")).collect();
    script.push(ok());
    let (prober, done) = ScriptedProber::new(script);

    let registry = MetricsRegistry::new().unwrap();
    let mut notifiers = recorders(&log);
    notifiers.insert(0, Box::new(Unreachable));
    let dispatcher = Dispatcher::new(notifiers).with_metrics(registry.collector());

    let policy = PolicyConfig {
        tko,
        ..PolicyConfig::default()
    };
    let mut watchdog =
        Watchdog::new(prober, policy.clone(), dispatcher).with_metrics(registry.collector());

    let started = tokio::time::Instant::now();
    watchdog
        .run_until(async {
            let _ = done.await;
        })
        .await;
    let elapsed = started.elapsed();

    let email: Vec<(HealthState, bool)> = log
        .lock()
        .unwrap()
        .iter()
        .filter(|(channel, _, _)| *channel == "email")
        .map(|(_, state, last)| (*state, *last))
        .collect();
    assert_eq!(
        email,
        vec![
            (HealthState::Critical, false),
            (HealthState::Critical, false),
            (HealthState::Critical, false),
            (HealthState::Critical, true),
            (HealthState::Ok, false),
        ]
    );
    assert_eq!(watchdog.state().health, HealthState::Ok);
    assert_eq!(watchdog.state().notifications_sent, 0);

    // Each crossing costs (tko - 1) retries plus one healthy period.
    let per_crossing = policy.retry_interval() * (tko - 1) + policy.check_period();
    assert!(elapsed >= per_crossing * 5);
    assert!(elapsed < per_crossing * 5 + policy.check_period());

    let metrics = String::from_utf8(registry.gather()).unwrap();
    assert!(metrics.contains("watchdog_notifications_suppressed_total 1"));
    assert!(metrics.contains(
        "watchdog_notifications_total{channel=\"unreachable\",result=\"failed\"} 5"
    ));
    assert!(metrics.contains("watchdog_probes_total{outcome=\"http_error\"} 15"));
}
