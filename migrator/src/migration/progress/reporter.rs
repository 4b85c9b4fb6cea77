//! Progress reporting abstraction for migration runs

use tracing::{error, info, warn};

use crate::migration::types::{MigrationReport, Phase, PhaseReport};
use crate::services::errors::{ErrorSeverity, MigrationError};

/// Trait for reporting migration progress
pub trait ProgressReporter: Send + Sync {
    fn report_phase(&self, phase: Phase);
    fn report_phase_complete(&self, report: &PhaseReport);
    fn report_error(&self, error: &MigrationError);
    fn report_completion(&self, report: &MigrationReport);
}

/// Reporter that writes progress through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgressReporter;

impl ProgressReporter for TracingProgressReporter {
    fn report_phase(&self, phase: Phase) {
        info!(phase = %phase, "[Progress] {}", phase.label());
    }

    fn report_phase_complete(&self, report: &PhaseReport) {
        info!(
            phase = %report.phase,
            "[Progress] {} phase done: {} fetched, {} excluded, {} skipped, {} written",
            report.phase,
            report.fetched,
            report.excluded,
            report.skipped,
            report.written
        );
    }

    fn report_error(&self, error: &MigrationError) {
        match error.severity() {
            ErrorSeverity::Critical => {
                error!("[Progress] Migration aborted with partial writes: {}", error);
                error!("[Progress] The destination holds a partial copy; re-running is safe");
            }
            ErrorSeverity::High => error!("[Progress] Migration failed: {}", error),
            ErrorSeverity::Medium | ErrorSeverity::Low => {
                warn!("[Progress] Migration failed: {}", error)
            }
        }
    }

    fn report_completion(&self, report: &MigrationReport) {
        let mode = if report.dry_run { " (dry run)" } else { "" };
        info!(
            "[Progress] Migration complete{}: {} written, {} skipped in {:.1}s",
            mode,
            report.total_written(),
            report.total_skipped(),
            report.elapsed.as_secs_f64()
        );
    }
}
