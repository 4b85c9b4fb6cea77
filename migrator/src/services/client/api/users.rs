//! User operations of the APIM resource provider

use tracing::{info, instrument};

use crate::services::client::arm_client::ArmClient;
use crate::services::client::errors::ClientError;
use crate::services::client::types::{
    DeleteUserOptions, Page, ServiceLocator, UserContract, UserCreateParameters,
};

/// First page of `GET .../users`
pub async fn list_users_impl(
    client: &ArmClient,
    service: &ServiceLocator,
) -> Result<Page<UserContract>, ClientError> {
    let url = client.service_url(service, &["users"])?;
    client.get_page(url.as_str(), "user.listByService").await
}

/// Follow a `nextLink` of a user listing
pub async fn list_users_next_impl(
    client: &ArmClient,
    next_link: &str,
) -> Result<Page<UserContract>, ClientError> {
    client.get_page(next_link, "user.listByServiceNext").await
}

/// `PUT .../users/{userId}`
#[instrument(skip(client, parameters), err)]
pub async fn create_or_update_user_impl(
    client: &ArmClient,
    service: &ServiceLocator,
    user_id: &str,
    parameters: &UserCreateParameters,
) -> Result<UserContract, ClientError> {
    let url = client.service_url(service, &["users", user_id])?;
    let request = client.http_client.put(url).json(parameters);

    let user: UserContract = client
        .send_json(request, "user.createOrUpdate", &format!("user {}", user_id))
        .await?;
    info!("User {} upserted on {}", user_id, service.service_name);
    Ok(user)
}

/// `DELETE .../users/{userId}` with optional cascading subscription deletion
#[instrument(skip(client), err)]
pub async fn delete_user_impl(
    client: &ArmClient,
    service: &ServiceLocator,
    user_id: &str,
    if_match: &str,
    options: DeleteUserOptions,
) -> Result<(), ClientError> {
    let mut url = client.service_url(service, &["users", user_id])?;
    if options.delete_subscriptions {
        url.query_pairs_mut().append_pair("deleteSubscriptions", "true");
    }

    let request = client.http_client.delete(url).header("If-Match", if_match);
    client
        .send_empty(request, "user.deleteMethod", &format!("user {}", user_id))
        .await?;
    info!("User {} deleted from {}", user_id, service.service_name);
    Ok(())
}
