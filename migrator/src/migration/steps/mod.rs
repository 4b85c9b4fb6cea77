//! Individual migration phases
//!
//! Each phase lists what it needs from one service, filters it, and writes the
//! result through a [`BoundedUpserter`](crate::services::upsert::BoundedUpserter).
//! A phase returns only after every write it started has settled.

pub mod cleanup;
pub mod groups;
pub mod subscriptions;
pub mod users;

pub use cleanup::cleanup_destination_users;
pub use groups::migrate_group_memberships;
pub use subscriptions::migrate_subscriptions;
pub use users::migrate_users;

use crate::services::client::ApimApi;
use crate::services::config::MigratorConfig;

/// What every phase runs against
pub struct StepContext<'a, A: ApimApi + ?Sized> {
    pub api: &'a A,
    pub config: &'a MigratorConfig,
}

impl<'a, A: ApimApi + ?Sized> StepContext<'a, A> {
    pub fn new(api: &'a A, config: &'a MigratorConfig) -> Self {
        Self { api, config }
    }
}
