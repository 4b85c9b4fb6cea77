//! Group and group membership operations

use tracing::{info, instrument};

use crate::services::client::arm_client::ArmClient;
use crate::services::client::errors::ClientError;
use crate::services::client::types::{GroupContract, Page, ServiceLocator, UserContract};

pub async fn list_groups_impl(
    client: &ArmClient,
    service: &ServiceLocator,
) -> Result<Page<GroupContract>, ClientError> {
    let url = client.service_url(service, &["groups"])?;
    client.get_page(url.as_str(), "group.listByService").await
}

pub async fn list_groups_next_impl(
    client: &ArmClient,
    next_link: &str,
) -> Result<Page<GroupContract>, ClientError> {
    client.get_page(next_link, "group.listByServiceNext").await
}

/// Members of one group: `GET .../groups/{groupId}/users`
pub async fn list_group_users_impl(
    client: &ArmClient,
    service: &ServiceLocator,
    group_id: &str,
) -> Result<Page<UserContract>, ClientError> {
    let url = client.service_url(service, &["groups", group_id, "users"])?;
    client.get_page(url.as_str(), "groupUser.list").await
}

pub async fn list_group_users_next_impl(
    client: &ArmClient,
    next_link: &str,
) -> Result<Page<UserContract>, ClientError> {
    client.get_page(next_link, "groupUser.listNext").await
}

/// `PUT .../groups/{groupId}/users/{userId}`; 404 when the group is missing
#[instrument(skip(client), err)]
pub async fn create_group_user_impl(
    client: &ArmClient,
    service: &ServiceLocator,
    group_id: &str,
    user_id: &str,
) -> Result<UserContract, ClientError> {
    let url = client.service_url(service, &["groups", group_id, "users", user_id])?;
    let request = client.http_client.put(url);

    let user: UserContract = client
        .send_json(
            request,
            "groupUser.create",
            &format!("group {} (member {})", group_id, user_id),
        )
        .await?;
    info!("User {} added to group {}", user_id, group_id);
    Ok(user)
}
