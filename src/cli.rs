// src/cli.rs
//! Command-line interface.
//!
//! With no arguments the watchdog re-launches itself in the background and
//! the caller exits after printing the child PID.

use clap::Parser;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Polls a service health endpoint and notifies on state changes
#[derive(Debug, Parser)]
#[command(name = "http-watchdog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Stay in the foreground with verbose diagnostics
    #[arg(short, long)]
    pub foreground: bool,

    /// Configuration file (YAML or JSON); built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Set on the background child; suppresses console output
    #[arg(long, hide = true, conflicts_with = "foreground")]
    pub detached: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Spawn a detached copy of this process and exit.
    Launch,
    Foreground,
    Detached,
}

impl Cli {
    pub fn mode(&self) -> RunMode {
        if self.foreground {
            RunMode::Foreground
        } else if self.detached {
            RunMode::Detached
        } else {
            RunMode::Launch
        }
    }

    /// Re-execute the current binary as a detached child and return its PID.
    pub fn spawn_detached(&self) -> std::io::Result<u32> {
        let exe = std::env::current_exe()?;
        let mut cmd = Command::new(exe);
        cmd.arg("--detached")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if let Some(config) = &self.config {
            cmd.arg("--config").arg(std::fs::canonicalize(config)?);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn()?;
        Ok(child.id())
    }
}
