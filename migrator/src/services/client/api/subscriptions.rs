//! Subscription operations

use tracing::{info, instrument};

use crate::services::client::arm_client::ArmClient;
use crate::services::client::errors::ClientError;
use crate::services::client::types::{
    Page, ServiceLocator, SubscriptionContract, SubscriptionCreateParameters,
};

pub async fn list_subscriptions_impl(
    client: &ArmClient,
    service: &ServiceLocator,
) -> Result<Page<SubscriptionContract>, ClientError> {
    let url = client.service_url(service, &["subscriptions"])?;
    client.get_page(url.as_str(), "subscription.list").await
}

pub async fn list_subscriptions_next_impl(
    client: &ArmClient,
    next_link: &str,
) -> Result<Page<SubscriptionContract>, ClientError> {
    client.get_page(next_link, "subscription.listNext").await
}

/// `PUT .../subscriptions/{sid}`; carries key material, parameters are never logged
#[instrument(skip(client, parameters), err)]
pub async fn create_or_update_subscription_impl(
    client: &ArmClient,
    service: &ServiceLocator,
    subscription_id: &str,
    parameters: &SubscriptionCreateParameters,
) -> Result<SubscriptionContract, ClientError> {
    let url = client.service_url(service, &["subscriptions", subscription_id])?;
    let request = client.http_client.put(url).json(parameters);

    let subscription: SubscriptionContract = client
        .send_json(
            request,
            "subscription.createOrUpdate",
            &format!("subscription {}", subscription_id),
        )
        .await?;
    info!("Subscription {} upserted on {}", subscription_id, service.service_name);
    Ok(subscription)
}
