//! Post-write actions.
//!
//! An action is a shell command run through `sh -c` with inherited stdio and
//! environment. Its exit status is reported, never propagated.

use std::process::Command;

/// Result of running (or not running) a declaration's action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The declaration has no action.
    NotConfigured,
    /// The command exited with status 0.
    Succeeded { command: String },
    /// The command ran and exited non-zero (`code` is `None` when killed by a signal).
    Failed { command: String, code: Option<i32> },
    /// The shell could not be started.
    SpawnFailed { command: String, error: String },
}

impl ActionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ActionOutcome::Failed { .. } | ActionOutcome::SpawnFailed { .. }
        )
    }
}

/// Run `command` through `sh -c`, blocking until it exits.
pub fn run_action(command: &str) -> ActionOutcome {
    tracing::debug!("executing action: {command}");
    match Command::new("sh").arg("-c").arg(command).status() {
        Ok(status) if status.success() => ActionOutcome::Succeeded {
            command: command.to_string(),
        },
        Ok(status) => ActionOutcome::Failed {
            command: command.to_string(),
            code: status.code(),
        },
        Err(err) => ActionOutcome::SpawnFailed {
            command: command.to_string(),
            error: err.to_string(),
        },
    }
}
