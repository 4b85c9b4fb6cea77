//! Read-through, write-nothing wrapper around an [`ApimApi`]
//!
//! Listing calls go to the wrapped client. Writes are logged and answered with
//! the resource the destination would have returned, so later phases can plan
//! against it (e.g. subscription owners resolve to the would-be user ids).

use async_trait::async_trait;
use tracing::info;

use super::errors::ClientResult;
use super::traits::ApimApi;
use super::types::*;

pub struct DryRunApim<'a, A: ApimApi + ?Sized> {
    inner: &'a A,
    subscription_id: String,
}

impl<'a, A: ApimApi + ?Sized> DryRunApim<'a, A> {
    pub fn new(inner: &'a A, subscription_id: &str) -> Self {
        Self {
            inner,
            subscription_id: subscription_id.to_string(),
        }
    }

    fn resource_id(&self, service: &ServiceLocator, path: &str) -> String {
        format!("{}{}", service.resource_path(&self.subscription_id), path)
    }
}

#[async_trait]
impl<'a, A: ApimApi + ?Sized> ApimApi for DryRunApim<'a, A> {
    async fn list_users(&self, service: &ServiceLocator) -> ClientResult<Page<UserContract>> {
        self.inner.list_users(service).await
    }

    async fn list_users_next(&self, next_link: &str) -> ClientResult<Page<UserContract>> {
        self.inner.list_users_next(next_link).await
    }

    async fn list_groups(&self, service: &ServiceLocator) -> ClientResult<Page<GroupContract>> {
        self.inner.list_groups(service).await
    }

    async fn list_groups_next(&self, next_link: &str) -> ClientResult<Page<GroupContract>> {
        self.inner.list_groups_next(next_link).await
    }

    async fn list_group_users(
        &self,
        service: &ServiceLocator,
        group_id: &str,
    ) -> ClientResult<Page<UserContract>> {
        self.inner.list_group_users(service, group_id).await
    }

    async fn list_group_users_next(&self, next_link: &str) -> ClientResult<Page<UserContract>> {
        self.inner.list_group_users_next(next_link).await
    }

    async fn list_subscriptions(
        &self,
        service: &ServiceLocator,
    ) -> ClientResult<Page<SubscriptionContract>> {
        self.inner.list_subscriptions(service).await
    }

    async fn list_subscriptions_next(
        &self,
        next_link: &str,
    ) -> ClientResult<Page<SubscriptionContract>> {
        self.inner.list_subscriptions_next(next_link).await
    }

    async fn create_or_update_user(
        &self,
        service: &ServiceLocator,
        user_id: &str,
        parameters: &UserCreateParameters,
    ) -> ClientResult<UserContract> {
        info!("[dry-run] would upsert user {} on {}", user_id, service.service_name);
        let properties = &parameters.properties;
        Ok(UserContract {
            id: Some(self.resource_id(service, &format!("/users/{}", user_id))),
            name: Some(user_id.to_string()),
            resource_type: None,
            properties: UserProperties {
                state: properties.state,
                note: properties.note.clone(),
                identities: properties.identities.clone(),
                email: Some(properties.email.clone()),
                first_name: Some(properties.first_name.clone()),
                last_name: Some(properties.last_name.clone()),
                registration_date: None,
            },
        })
    }

    async fn create_group_user(
        &self,
        service: &ServiceLocator,
        group_id: &str,
        user_id: &str,
    ) -> ClientResult<UserContract> {
        info!(
            "[dry-run] would add user {} to group {} on {}",
            user_id, group_id, service.service_name
        );
        Ok(UserContract {
            id: Some(self.resource_id(service, &format!("/users/{}", user_id))),
            name: Some(user_id.to_string()),
            ..Default::default()
        })
    }

    async fn create_or_update_subscription(
        &self,
        service: &ServiceLocator,
        subscription_id: &str,
        parameters: &SubscriptionCreateParameters,
    ) -> ClientResult<SubscriptionContract> {
        info!(
            "[dry-run] would upsert subscription {} (owner {}) on {}",
            subscription_id, parameters.properties.owner_id, service.service_name
        );
        Ok(SubscriptionContract {
            id: Some(self.resource_id(service, &format!("/subscriptions/{}", subscription_id))),
            name: Some(subscription_id.to_string()),
            resource_type: None,
            properties: SubscriptionProperties {
                owner_id: Some(parameters.properties.owner_id.clone()),
                scope: Some(parameters.properties.scope.clone()),
                display_name: Some(parameters.properties.display_name.clone()),
                state: parameters.properties.state,
                primary_key: None,
                secondary_key: None,
            },
        })
    }

    async fn delete_user(
        &self,
        service: &ServiceLocator,
        user_id: &str,
        _if_match: &str,
        options: DeleteUserOptions,
    ) -> ClientResult<()> {
        info!(
            "[dry-run] would delete user {} from {} (delete subscriptions: {})",
            user_id, service.service_name, options.delete_subscriptions
        );
        Ok(())
    }
}
