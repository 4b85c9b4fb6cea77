//! Remote contract the migration relies on
//!
//! One `list` / `list_next` pair per collection plus the writes needed to
//! re-create entities on the destination. [`ArmClient`](super::ArmClient) speaks
//! it over HTTP; tests use an in-memory implementation.

use async_trait::async_trait;

use super::errors::ClientResult;
use super::types::{
    DeleteUserOptions, GroupContract, Page, ServiceLocator, SubscriptionContract,
    SubscriptionCreateParameters, UserContract, UserCreateParameters,
};

#[async_trait]
pub trait ApimApi: Send + Sync {
    async fn list_users(&self, service: &ServiceLocator) -> ClientResult<Page<UserContract>>;

    async fn list_users_next(&self, next_link: &str) -> ClientResult<Page<UserContract>>;

    async fn list_groups(&self, service: &ServiceLocator) -> ClientResult<Page<GroupContract>>;

    async fn list_groups_next(&self, next_link: &str) -> ClientResult<Page<GroupContract>>;

    async fn list_group_users(
        &self,
        service: &ServiceLocator,
        group_id: &str,
    ) -> ClientResult<Page<UserContract>>;

    async fn list_group_users_next(&self, next_link: &str) -> ClientResult<Page<UserContract>>;

    async fn list_subscriptions(
        &self,
        service: &ServiceLocator,
    ) -> ClientResult<Page<SubscriptionContract>>;

    async fn list_subscriptions_next(
        &self,
        next_link: &str,
    ) -> ClientResult<Page<SubscriptionContract>>;

    async fn create_or_update_user(
        &self,
        service: &ServiceLocator,
        user_id: &str,
        parameters: &UserCreateParameters,
    ) -> ClientResult<UserContract>;

    /// Add an existing user to an existing group
    async fn create_group_user(
        &self,
        service: &ServiceLocator,
        group_id: &str,
        user_id: &str,
    ) -> ClientResult<UserContract>;

    async fn create_or_update_subscription(
        &self,
        service: &ServiceLocator,
        subscription_id: &str,
        parameters: &SubscriptionCreateParameters,
    ) -> ClientResult<SubscriptionContract>;

    async fn delete_user(
        &self,
        service: &ServiceLocator,
        user_id: &str,
        if_match: &str,
        options: DeleteUserOptions,
    ) -> ClientResult<()>;
}
