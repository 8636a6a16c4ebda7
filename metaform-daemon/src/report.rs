//! Logging for load and cycle results.
//!
//! Everything below the daemon returns values; this is where they become log
//! lines.

use metaform_renderer::LabelDiagnostic;
use metaform_sync::{ActionOutcome, ApplyOutcome, ApplyStatus, CycleReport, LoadReport};

pub fn log_load_report(report: &LoadReport) {
    for failure in &report.failures {
        tracing::error!(
            path = %failure.path.display(),
            error = %failure.error,
            "failed to load template declaration"
        );
    }
    for declaration in &report.set {
        tracing::info!(
            template = declaration.name(),
            destination = %declaration.destination().display(),
            "loaded template declaration"
        );
    }
}

pub fn log_cycle(report: &CycleReport) {
    for outcome in &report.outcomes {
        log_outcome(outcome);
    }
    tracing::info!(
        written = report.written(),
        unchanged = report.unchanged(),
        failed = report.failed(),
        duration_ms = report.duration_ms(),
        "refresh cycle complete"
    );
}

pub fn log_outcome(outcome: &ApplyOutcome) {
    let name = outcome.name.as_str();
    for diagnostic in &outcome.diagnostics {
        log_diagnostic(name, diagnostic);
    }
    match &outcome.status {
        ApplyStatus::Unchanged { hash } => {
            tracing::trace!(template = name, hash = hash.as_str(), "no changes")
        }
        ApplyStatus::Written {
            previous_hash,
            hash,
            action,
        } => {
            tracing::info!(
                template = name,
                previous_hash = previous_hash.as_str(),
                hash = hash.as_str(),
                "destination updated"
            );
            log_action(name, action);
        }
        ApplyStatus::RenderFailed(err) => {
            tracing::error!(template = name, error = %err, "failed to render template")
        }
        ApplyStatus::WriteFailed(err) => {
            tracing::error!(template = name, error = %err, "failed to write destination")
        }
    }
}

fn log_action(name: &str, action: &ActionOutcome) {
    match action {
        ActionOutcome::NotConfigured => {}
        ActionOutcome::Succeeded { command } => {
            tracing::debug!(template = name, command = command.as_str(), "action succeeded")
        }
        ActionOutcome::Failed { command, code } => tracing::error!(
            template = name,
            command = command.as_str(),
            code = ?code,
            "action exited with failure"
        ),
        ActionOutcome::SpawnFailed { command, error } => tracing::error!(
            template = name,
            command = command.as_str(),
            error = error.as_str(),
            "action could not be started"
        ),
    }
}

fn log_diagnostic(name: &str, diagnostic: &LabelDiagnostic) {
    match diagnostic {
        LabelDiagnostic::InvalidInteger { label, .. } => {
            tracing::error!(template = name, label = label.as_str(), "{diagnostic}")
        }
        LabelDiagnostic::EmptyList { label } => {
            tracing::debug!(template = name, label = label.as_str(), "{diagnostic}")
        }
    }
}
