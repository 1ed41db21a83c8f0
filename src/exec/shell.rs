// src/exec/shell.rs

//! Shell-command payloads for manifest-driven runs.

use std::process::{Command, Stdio};

use anyhow::{Context, bail};
use tracing::info;

use crate::pool::ExecMode;

use super::action::Action;

/// Runs a single manifest command through the platform shell.
///
/// Stdout/stderr are inherited so command output reaches the terminal
/// directly; our own logs go to stderr via `tracing`.
#[derive(Debug, Clone)]
pub struct ShellAction {
    name: String,
    cmd: String,
    mode: ExecMode,
}

impl ShellAction {
    pub fn new(name: impl Into<String>, cmd: impl Into<String>, dedicated: bool) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
            mode: if dedicated {
                ExecMode::Dedicated
            } else {
                ExecMode::Pooled
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Action for ShellAction {
    fn call(&self) -> anyhow::Result<()> {
        info!(action = %self.name, cmd = %self.cmd, "starting action command");

        // Build a shell command appropriate for the platform.
        let mut command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        };

        let status = command
            .stdin(Stdio::null())
            .status()
            .with_context(|| format!("spawning process for action '{}'", self.name))?;

        let code = status.code().unwrap_or(-1);
        info!(
            action = %self.name,
            exit_code = code,
            success = status.success(),
            "action command exited"
        );

        if !status.success() {
            bail!("action '{}' exited with status {}", self.name, code);
        }
        Ok(())
    }

    fn exec_mode(&self) -> ExecMode {
        self.mode
    }
}
