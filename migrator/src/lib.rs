//! Migrates users, group memberships and subscriptions between Azure API
//! Management services through the Azure Resource Manager API.

pub mod migration;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use migration::{run_migration, MigrationReport, Migrator, RunOptions};
pub use services::config::MigratorConfig;
pub use services::errors::{MigrationError, MigrationResult};
