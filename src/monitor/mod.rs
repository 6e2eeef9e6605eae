// src/monitor/mod.rs
mod state;
mod watchdog;

pub use state::{Action, HealthState, MonitorState, Notification, StateMachine, Step};
pub use watchdog::Watchdog;
