//! Subscription phase

use tracing::{info, instrument, warn};

use super::StepContext;
use crate::migration::filters::{
    is_migratable_subscription, project_subscription, subscription_display_name,
    subscription_owner, ADMINISTRATOR_USER_ID,
};
use crate::migration::lookup::UserLookup;
use crate::migration::types::{Phase, PhaseReport};
use crate::services::client::{list_all_subscriptions, ApimApi, ClientError, SubscriptionCreateParameters};
use crate::services::errors::{MigrationError, MigrationResult};
use crate::services::upsert::BoundedUpserter;

struct PlannedSubscription {
    subscription_id: String,
    parameters: SubscriptionCreateParameters,
}

/// Copy the product's subscriptions, re-scoped and re-owned on the destination
///
/// Every owner is resolved before the first write, so an unmigrated owner fails
/// the phase without touching the destination.
#[instrument(skip_all, fields(product = %ctx.config.product_id))]
pub async fn migrate_subscriptions<A: ApimApi + ?Sized>(
    ctx: &StepContext<'_, A>,
    lookup: &UserLookup,
) -> MigrationResult<PhaseReport> {
    let mut report = PhaseReport::new(Phase::Subscriptions);
    let config = ctx.config;
    let destination = &config.destination;
    let api = ctx.api;

    let subscriptions = list_all_subscriptions(api, &config.source)
        .await
        .map_err(|source| MigrationError::Fetch {
            entity: "subscriptions",
            source,
        })?;
    report.fetched = subscriptions.len();

    let source_scope = config.source_product_scope();
    let destination_scope = config.destination_product_scope();
    let destination_users = format!("{}/users", destination.resource_path(&config.subscription_id));

    let mut planned = Vec::new();
    for subscription in &subscriptions {
        if !is_migratable_subscription(subscription, &source_scope) {
            report.excluded += 1;
            continue;
        }
        let Some(subscription_id) = subscription.path_identifier() else {
            report.excluded += 1;
            continue;
        };

        let Some(owner) = subscription_owner(subscription) else {
            report.skipped += 1;
            warn!("Skipping subscription {}: no owner", subscription_id);
            continue;
        };
        if owner == ADMINISTRATOR_USER_ID {
            report.skipped += 1;
            info!("Skipping subscription {}: owned by the administrator", subscription_id);
            continue;
        }

        if subscription_display_name(subscription).is_none() {
            report.skipped += 1;
            warn!("Skipping subscription {}: no display name", subscription_id);
            continue;
        }

        if !lookup.contains(owner) {
            return Err(MigrationError::OwnerNotMigrated {
                subscription: subscription_id.to_string(),
                owner: owner.to_string(),
            });
        }
        let owner_resource_id = lookup
            .resource_id(owner)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/{}", destination_users, owner));

        if let Some(parameters) =
            project_subscription(subscription, &owner_resource_id, &destination_scope)
        {
            planned.push(PlannedSubscription {
                subscription_id: subscription_id.to_string(),
                parameters,
            });
        }
    }

    info!(
        "Creating {} subscriptions scoped to {}",
        planned.len(),
        destination_scope
    );

    let upserter = BoundedUpserter::new("subscriptions", config.concurrency.subscriptions);
    let operations = planned.iter().map(|plan| {
        (plan.subscription_id.clone(), async move {
            let created = api
                .create_or_update_subscription(destination, &plan.subscription_id, &plan.parameters)
                .await?;
            info!("Migrated subscription {}", plan.subscription_id);
            Ok::<_, ClientError>(created)
        })
    });

    let created = upserter
        .run(operations)
        .await
        .map_err(|failure| MigrationError::Upsert {
            phase: Phase::Subscriptions,
            failure,
        })?;

    report.written = created.len();
    Ok(report)
}
