//! Optional destructive cleanup of destination users

use tracing::{info, instrument};

use super::StepContext;
use crate::migration::filters::is_administrator;
use crate::migration::types::{Phase, PhaseReport};
use crate::services::client::{list_all_users, ApimApi, ClientError, DeleteUserOptions};
use crate::services::errors::{MigrationError, MigrationResult};
use crate::services::upsert::BoundedUpserter;

/// Delete every non-administrator destination user along with their subscriptions
#[instrument(skip_all, fields(service = %ctx.config.destination.service_name))]
pub async fn cleanup_destination_users<A: ApimApi + ?Sized>(
    ctx: &StepContext<'_, A>,
) -> MigrationResult<PhaseReport> {
    let mut report = PhaseReport::new(Phase::Cleanup);
    let destination = &ctx.config.destination;
    let api = ctx.api;

    let users = list_all_users(api, destination)
        .await
        .map_err(|source| MigrationError::Fetch {
            entity: "destination users",
            source,
        })?;
    report.fetched = users.len();

    let mut doomed = Vec::new();
    for user in &users {
        if is_administrator(user) {
            report.excluded += 1;
            continue;
        }
        match user.path_identifier().filter(|id| !id.is_empty()) {
            Some(user_id) => doomed.push(user_id.to_string()),
            None => report.skipped += 1,
        }
    }

    info!(
        "Deleting {} users from {} (administrator kept)",
        doomed.len(),
        destination.service_name
    );

    let options = DeleteUserOptions {
        delete_subscriptions: true,
    };
    let upserter = BoundedUpserter::new("cleanup", ctx.config.concurrency.cleanup);
    let operations = doomed.iter().map(|user_id| {
        (user_id.clone(), async move {
            api.delete_user(destination, user_id, "*", options).await?;
            info!("Deleted user {}", user_id);
            Ok::<_, ClientError>(())
        })
    });

    let deleted = upserter
        .run(operations)
        .await
        .map_err(|failure| MigrationError::Upsert {
            phase: Phase::Cleanup,
            failure,
        })?;

    report.written = deleted.len();
    Ok(report)
}
