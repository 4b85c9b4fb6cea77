//! Core types for migration phases and reporting

use std::fmt;
use std::time::Duration;

/// One sequential stage of a migration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Init,
    Cleanup,
    Users,
    Groups,
    Subscriptions,
    Done,
}

impl Phase {
    /// Human-readable description used in progress output
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Init => "Acquiring credentials",
            Phase::Cleanup => "Deleting destination users",
            Phase::Users => "Migrating users",
            Phase::Groups => "Migrating group memberships",
            Phase::Subscriptions => "Migrating subscriptions",
            Phase::Done => "Migration complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "init",
            Phase::Cleanup => "cleanup",
            Phase::Users => "users",
            Phase::Groups => "groups",
            Phase::Subscriptions => "subscriptions",
            Phase::Done => "done",
        };
        f.pad(name)
    }
}

/// Counters for one completed phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Records read from the service the phase lists
    pub fetched: usize,
    /// Records dropped by a filter rule (system, administrator, out of scope)
    pub excluded: usize,
    /// Records that passed the filters but failed projection
    pub skipped: usize,
    /// Create-or-update or delete calls that succeeded
    pub written: usize,
}

impl PhaseReport {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            fetched: 0,
            excluded: 0,
            skipped: 0,
            written: 0,
        }
    }
}

/// Summary logged when a run reaches `Done`
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    pub phases: Vec<PhaseReport>,
    pub elapsed: Duration,
    pub dry_run: bool,
}

impl MigrationReport {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|report| report.phase == phase)
    }

    pub fn total_written(&self) -> usize {
        self.phases.iter().map(|report| report.written).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.phases.iter().map(|report| report.skipped).sum()
    }
}
