//! User phase

use tracing::{info, instrument, warn};

use super::StepContext;
use crate::migration::filters::{is_migratable_user, project_user};
use crate::migration::lookup::UserLookup;
use crate::migration::types::{Phase, PhaseReport};
use crate::services::client::{list_all_users, ApimApi, ClientError};
use crate::services::errors::{MigrationError, MigrationResult};
use crate::services::upsert::BoundedUpserter;

/// Copy every migratable source user and index the created destination users
#[instrument(skip_all, fields(source = %ctx.config.source.service_name))]
pub async fn migrate_users<A: ApimApi + ?Sized>(
    ctx: &StepContext<'_, A>,
) -> MigrationResult<(UserLookup, PhaseReport)> {
    let mut report = PhaseReport::new(Phase::Users);
    let destination = &ctx.config.destination;
    let api = ctx.api;

    let users = list_all_users(api, &ctx.config.source)
        .await
        .map_err(|source| MigrationError::Fetch {
            entity: "users",
            source,
        })?;
    report.fetched = users.len();

    let mut upserts = Vec::with_capacity(users.len());
    for user in &users {
        if !is_migratable_user(user) {
            report.excluded += 1;
            continue;
        }
        match project_user(user) {
            Some(upsert) => upserts.push(upsert),
            None => {
                report.skipped += 1;
                warn!(
                    "Skipping user {}: id, email, first name and last name are required",
                    user.identifier().unwrap_or("<unnamed>")
                );
            }
        }
    }

    let upserter = BoundedUpserter::new("users", ctx.config.concurrency.users);
    let operations = upserts.iter().map(|upsert| {
        (upsert.user_id.clone(), async move {
            let created = api
                .create_or_update_user(destination, &upsert.user_id, &upsert.parameters)
                .await?;
            info!("Migrated user {}", upsert.user_id);
            Ok::<_, ClientError>(created)
        })
    });

    let created = upserter
        .run(operations)
        .await
        .map_err(|failure| MigrationError::Upsert {
            phase: Phase::Users,
            failure,
        })?;

    report.written = created.len();
    let lookup = UserLookup::from_entries(created.into_iter().map(|c| (c.key, c.value)));
    Ok((lookup, report))
}
