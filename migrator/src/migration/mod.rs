//! API Management migration
//!
//! Copies users, custom group memberships and product subscriptions from a
//! source service to a destination service, phase by phase:
//!
//! - **Cleanup** (opt-in): deletes destination users and their subscriptions
//! - **Users**: re-creates every non-administrator user with complete details
//! - **Groups**: re-creates membership edges of non-system groups
//! - **Subscriptions**: re-creates the product's subscriptions under the
//!   destination owners
//!
//! # Usage
//!
//! ```no_run
//! use apim_migrator::migration::{run_migration, RunOptions, TracingProgressReporter};
//! use apim_migrator::services::config::MigratorConfig;
//!
//! # async fn demo() -> Result<(), apim_migrator::services::errors::MigrationError> {
//! let config = MigratorConfig::from_env();
//! let report = run_migration(&config, RunOptions::default(), &TracingProgressReporter).await?;
//! println!("{} records written", report.total_written());
//! # Ok(())
//! # }
//! ```

pub mod filters;
pub mod lookup;
pub mod orchestrator;
pub mod progress;
pub mod steps;
pub mod types;


pub use lookup::UserLookup;
pub use orchestrator::{run_migration, Migrator, RunOptions};
pub use progress::*;
pub use types::*;
