use thiserror::Error;

use crate::migration::types::Phase;
use crate::services::client::ClientError;
use crate::services::upsert::BatchFailure;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {field} {message}")]
    Configuration { field: String, message: String },

    #[error("Authentication error: {source}")]
    Authentication { source: ClientError },

    #[error("Failed to retrieve {entity}: {source}")]
    Fetch {
        entity: &'static str,
        source: ClientError,
    },

    #[error("{phase} phase aborted: {failure}")]
    Upsert {
        phase: Phase,
        #[source]
        failure: BatchFailure<ClientError>,
    },

    #[error("Subscription {subscription} is owned by user {owner}, who was not migrated")]
    OwnerNotMigrated { subscription: String, owner: String },

    #[error("Destination group {group} is not provisioned (adding member {user}): {source}")]
    GroupNotProvisioned {
        group: String,
        user: String,
        source: ClientError,
    },
}

pub type MigrationResult<T> = Result<T, MigrationError>;

impl MigrationError {
    /// Get error severity for logging purposes
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MigrationError::Configuration { .. } => ErrorSeverity::High,
            MigrationError::Authentication { .. } => ErrorSeverity::High,
            MigrationError::Fetch { .. } => ErrorSeverity::Medium,
            // Some writes may already have landed on the destination
            MigrationError::Upsert { failure, .. } if !failure.succeeded.is_empty() => {
                ErrorSeverity::Critical
            }
            MigrationError::Upsert { .. } => ErrorSeverity::High,
            MigrationError::OwnerNotMigrated { .. } => ErrorSeverity::High,
            MigrationError::GroupNotProvisioned { .. } => ErrorSeverity::High,
        }
    }

    /// The phase the error aborted, when it belongs to one
    pub fn phase(&self) -> Option<Phase> {
        match self {
            MigrationError::Upsert { phase, .. } => Some(*phase),
            MigrationError::OwnerNotMigrated { .. } => Some(Phase::Subscriptions),
            MigrationError::GroupNotProvisioned { .. } => Some(Phase::Groups),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}
