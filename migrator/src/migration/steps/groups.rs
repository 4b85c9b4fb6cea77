//! Group membership phase
//!
//! Destination groups are provisioned outside this tool; only membership edges
//! of non-system groups are copied. Every member gets an edge under the
//! lower-cased group identifier, including members the user phase did not
//! write (they may already exist on the destination). A missing destination
//! group aborts the run.

use tracing::{info, instrument, warn};

use super::StepContext;
use crate::migration::filters::{destination_group_id, is_custom_group, ADMINISTRATOR_USER_ID};
use crate::migration::lookup::UserLookup;
use crate::migration::types::{Phase, PhaseReport};
use crate::services::client::{list_all_group_users, list_all_groups, ApimApi, ClientError};
use crate::services::errors::{MigrationError, MigrationResult};
use crate::services::upsert::BoundedUpserter;

/// One group membership to create on the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipEdge {
    /// Lower-cased destination group identifier
    pub group_id: String,
    pub user_id: String,
}

impl MembershipEdge {
    fn key(&self) -> String {
        format!("{}/{}", self.group_id, self.user_id)
    }
}

#[instrument(skip_all, fields(source = %ctx.config.source.service_name))]
pub async fn migrate_group_memberships<A: ApimApi + ?Sized>(
    ctx: &StepContext<'_, A>,
    lookup: &UserLookup,
) -> MigrationResult<PhaseReport> {
    let mut report = PhaseReport::new(Phase::Groups);
    let source = &ctx.config.source;
    let destination = &ctx.config.destination;
    let api = ctx.api;

    let groups = list_all_groups(api, source)
        .await
        .map_err(|source| MigrationError::Fetch {
            entity: "groups",
            source,
        })?;
    report.fetched = groups.len();

    let mut edges = Vec::new();
    for group in &groups {
        if !is_custom_group(group) {
            report.excluded += 1;
            continue;
        }
        let Some(group_id) = group.identifier().filter(|id| !id.is_empty()) else {
            report.skipped += 1;
            warn!("Skipping group without an identifier");
            continue;
        };

        let members = list_all_group_users(api, source, group_id)
            .await
            .map_err(|source| MigrationError::Fetch {
                entity: "group users",
                source,
            })?;

        for member in &members {
            match member.path_identifier().filter(|id| !id.is_empty()) {
                Some(user_id) => edges.push(MembershipEdge {
                    group_id: destination_group_id(group_id),
                    user_id: user_id.to_string(),
                }),
                None => {
                    report.skipped += 1;
                    warn!("Skipping member of {} without an identifier", group_id);
                }
            }
        }
    }

    info!("Creating {} group memberships", edges.len());

    let upserter = BoundedUpserter::new("group users", ctx.config.concurrency.group_users);
    let operations = edges.iter().map(|edge| {
        (edge.key(), async move {
            let created = api
                .create_group_user(destination, &edge.group_id, &edge.user_id)
                .await?;
            info!("Added user {} to group {}", edge.user_id, edge.group_id);
            Ok::<_, ClientError>(created)
        })
    });

    // A 404 names the group only when the member is known to exist on the destination
    let created = upserter.run(operations).await.map_err(|failure| {
        let failed_edge = edges.iter().find(|edge| edge.key() == failure.key);
        match failed_edge {
            Some(edge)
                if failure.source.is_not_found()
                    && (lookup.contains(&edge.user_id) || edge.user_id == ADMINISTRATOR_USER_ID) =>
            {
                MigrationError::GroupNotProvisioned {
                    group: edge.group_id.clone(),
                    user: edge.user_id.clone(),
                    source: failure.source.clone(),
                }
            }
            _ => MigrationError::Upsert {
                phase: Phase::Groups,
                failure,
            },
        }
    })?;

    report.written = created.len();
    Ok(report)
}
