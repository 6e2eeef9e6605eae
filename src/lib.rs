// src/lib.rs
pub mod cli;
pub mod config;
pub mod metrics;
pub mod monitor;
pub mod notify;
pub mod probe;
