//! Full collection fetchers, one per entity type
//!
//! Each fetcher requests the first page and drains the remaining pages through
//! the paginator. A failed page aborts the whole listing.

use tracing::{info, instrument};

use super::errors::ClientResult;
use super::pagination::{collect_pages, pages};
use super::traits::ApimApi;
use super::types::{GroupContract, ServiceLocator, SubscriptionContract, UserContract};

#[instrument(skip(api), fields(service = %service.service_name), err)]
pub async fn list_all_users<A: ApimApi + ?Sized>(
    api: &A,
    service: &ServiceLocator,
) -> ClientResult<Vec<UserContract>> {
    let first = api.list_users(service).await?;
    let users = collect_pages(
        pages(first, |link| async move { api.list_users_next(&link).await }),
        "users",
    )
    .await?;

    info!("Retrieved {} users from {}", users.len(), service.service_name);
    Ok(users)
}

#[instrument(skip(api), fields(service = %service.service_name), err)]
pub async fn list_all_groups<A: ApimApi + ?Sized>(
    api: &A,
    service: &ServiceLocator,
) -> ClientResult<Vec<GroupContract>> {
    let first = api.list_groups(service).await?;
    let groups = collect_pages(
        pages(first, |link| async move { api.list_groups_next(&link).await }),
        "groups",
    )
    .await?;

    info!("Retrieved {} groups from {}", groups.len(), service.service_name);
    Ok(groups)
}

#[instrument(skip(api), fields(service = %service.service_name), err)]
pub async fn list_all_group_users<A: ApimApi + ?Sized>(
    api: &A,
    service: &ServiceLocator,
    group_id: &str,
) -> ClientResult<Vec<UserContract>> {
    let first = api.list_group_users(service, group_id).await?;
    let members = collect_pages(
        pages(first, |link| async move { api.list_group_users_next(&link).await }),
        "group users",
    )
    .await?;

    info!("Retrieved {} members of group {}", members.len(), group_id);
    Ok(members)
}

#[instrument(skip(api), fields(service = %service.service_name), err)]
pub async fn list_all_subscriptions<A: ApimApi + ?Sized>(
    api: &A,
    service: &ServiceLocator,
) -> ClientResult<Vec<SubscriptionContract>> {
    let first = api.list_subscriptions(service).await?;
    let subscriptions = collect_pages(
        pages(first, |link| async move { api.list_subscriptions_next(&link).await }),
        "subscriptions",
    )
    .await?;

    info!(
        "Retrieved {} subscriptions from {}",
        subscriptions.len(),
        service.service_name
    );
    Ok(subscriptions)
}
