//! In-memory API Management used by the migration tests
//!
//! Collections are served in pages of `page_size` with opaque `nextLink`
//! values, every write is recorded, and the peak number of concurrent writes is
//! tracked per operation kind.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::services::client::{
    ApimApi, ClientError, ClientResult, DeleteUserOptions, GroupContract, GroupProperties,
    GroupType, Page, ServiceLocator, SubscriptionContract, SubscriptionCreateParameters,
    SubscriptionProperties, SubscriptionState, UserContract, UserCreateParameters,
    UserProperties,
};
use crate::services::config::MigratorConfig;

pub const SUBSCRIPTION_ID: &str = "sub-0";
pub const SOURCE_SERVICE: &str = "apim-src";
pub const DESTINATION_SERVICE: &str = "apim-dest";

pub fn test_config() -> MigratorConfig {
    let env: HashMap<&str, &str> = [
        ("SRC_RESOURCE_GROUP_NAME", "rg-src"),
        ("SRC_APIM_SERVICE_NAME", SOURCE_SERVICE),
        ("DEST_RESOURCE_GROUP_NAME", "rg-dest"),
        ("DEST_APIM_SERVICE_NAME", DESTINATION_SERVICE),
        ("PRODUCT_ID", "Starter"),
        ("SUBSCRIPTION_ID", SUBSCRIPTION_ID),
        ("TENANT_DOMAIN", "contoso.onmicrosoft.com"),
    ]
    .into_iter()
    .collect();
    MigratorConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
}

fn source_path() -> String {
    test_config().source.resource_path(SUBSCRIPTION_ID)
}

pub fn destination_path() -> String {
    test_config().destination.resource_path(SUBSCRIPTION_ID)
}

/// Scope of the migrated product on the source service
pub fn product_scope() -> String {
    format!("{}/products/starter", source_path())
}

pub fn user(id: &str) -> UserContract {
    UserContract {
        id: Some(format!("{}/users/{}", source_path(), id)),
        name: Some(id.to_string()),
        resource_type: Some("Microsoft.ApiManagement/service/users".to_string()),
        properties: UserProperties {
            email: Some(format!("{}@example.com", id)),
            first_name: Some(format!("First {}", id)),
            last_name: Some(format!("Last {}", id)),
            ..Default::default()
        },
    }
}

pub fn group(id: &str, group_type: GroupType) -> GroupContract {
    GroupContract {
        id: Some(format!("{}/groups/{}", source_path(), id)),
        name: Some(id.to_string()),
        resource_type: None,
        properties: GroupProperties {
            display_name: Some(id.to_string()),
            group_type: Some(group_type),
            built_in: group_type == GroupType::System,
            ..Default::default()
        },
    }
}

pub fn subscription(id: &str, owner: &str, scope: &str) -> SubscriptionContract {
    SubscriptionContract {
        id: Some(format!("{}/subscriptions/{}", source_path(), id)),
        name: Some(id.to_string()),
        resource_type: None,
        properties: SubscriptionProperties {
            owner_id: Some(format!("{}/users/{}", source_path(), owner)),
            scope: Some(scope.to_string()),
            display_name: Some(format!("{} subscription", id)),
            state: Some(SubscriptionState::Active),
            primary_key: Some(format!("{}-primary", id)),
            secondary_key: Some(format!("{}-secondary", id)),
        },
    }
}

/// A write the fake received
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    User {
        service: String,
        user_id: String,
        parameters: UserCreateParameters,
    },
    GroupUser {
        service: String,
        group_id: String,
        user_id: String,
    },
    Subscription {
        service: String,
        subscription_id: String,
        parameters: SubscriptionCreateParameters,
    },
    DeleteUser {
        service: String,
        user_id: String,
        if_match: String,
        delete_subscriptions: bool,
    },
}

#[derive(Default)]
struct ServiceData {
    users: Vec<UserContract>,
    groups: Vec<GroupContract>,
    group_users: HashMap<String, Vec<UserContract>>,
    subscriptions: Vec<SubscriptionContract>,
}

#[derive(Default)]
struct Gauge {
    current: usize,
    peak: usize,
}

pub struct InMemoryApim {
    page_size: usize,
    services: Mutex<HashMap<String, ServiceData>>,
    writes: Mutex<Vec<Write>>,
    write_failures: Mutex<HashMap<String, ClientError>>,
    failing_pages: Mutex<HashSet<String>>,
    missing_groups: Mutex<HashSet<String>>,
    gauges: Mutex<HashMap<&'static str, Gauge>>,
}

impl Default for InMemoryApim {
    fn default() -> Self {
        Self::new(2)
    }
}

impl InMemoryApim {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            services: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            write_failures: Mutex::new(HashMap::new()),
            failing_pages: Mutex::new(HashSet::new()),
            missing_groups: Mutex::new(HashSet::new()),
            gauges: Mutex::new(HashMap::new()),
        }
    }

    fn with_service<R>(&self, service: &str, f: impl FnOnce(&mut ServiceData) -> R) -> R {
        let mut services = self.services.lock().unwrap();
        f(services.entry(service.to_string()).or_default())
    }

    pub fn seed_users(&self, service: &str, users: Vec<UserContract>) {
        self.with_service(service, |data| data.users.extend(users));
    }

    pub fn seed_groups(&self, service: &str, groups: Vec<GroupContract>) {
        self.with_service(service, |data| data.groups.extend(groups));
    }

    pub fn seed_group_users(&self, service: &str, group_id: &str, members: Vec<UserContract>) {
        self.with_service(service, |data| {
            data.group_users
                .entry(group_id.to_string())
                .or_default()
                .extend(members)
        });
    }

    pub fn seed_subscriptions(&self, service: &str, subscriptions: Vec<SubscriptionContract>) {
        self.with_service(service, |data| data.subscriptions.extend(subscriptions));
    }

    /// Fail the write with this key (`user:u2`, `group-user:g1/u2`,
    /// `subscription:s1`, `delete:u2`)
    pub fn fail_write(&self, key: &str, error: ClientError) {
        self.write_failures.lock().unwrap().insert(key.to_string(), error);
    }

    /// Fail every page after the first of a collection (`users`, `groups`, ...)
    pub fn fail_next_pages(&self, collection: &str) {
        self.failing_pages.lock().unwrap().insert(collection.to_string());
    }

    /// Make membership writes for this destination group answer 404
    pub fn unprovision_group(&self, group_id: &str) {
        self.missing_groups.lock().unwrap().insert(group_id.to_string());
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    /// Highest number of concurrent writes seen for a kind
    pub fn peak(&self, kind: &str) -> usize {
        self.gauges
            .lock()
            .unwrap()
            .get(kind)
            .map(|gauge| gauge.peak)
            .unwrap_or(0)
    }

    fn page<T: Clone>(&self, items: &[T], service: &str, collection: &str, offset: usize) -> Page<T> {
        let end = (offset + self.page_size).min(items.len());
        let value = items.get(offset..end).map(<[T]>::to_vec).unwrap_or_default();
        let next_link =
            (end < items.len()).then(|| format!("fake|{}|{}|{}", service, collection, end));
        Page::new(value, next_link)
    }

    /// Split a link produced by [`Self::page`] into service, collection and offset
    fn parse_link(&self, link: &str) -> ClientResult<(String, String, usize)> {
        let parts: Vec<&str> = link.split('|').collect();
        match parts.as_slice() {
            ["fake", service, collection, offset] => {
                if self.failing_pages.lock().unwrap().contains(*collection) {
                    return Err(ClientError::Network {
                        message: format!("connection reset while reading {}", collection),
                    });
                }
                let offset = offset.parse().map_err(|_| ClientError::InvalidResponse {
                    expected: "numeric offset".to_string(),
                    got: offset.to_string(),
                })?;
                Ok((service.to_string(), collection.to_string(), offset))
            }
            _ => Err(ClientError::InvalidResponse {
                expected: "fake next link".to_string(),
                got: link.to_string(),
            }),
        }
    }

    fn list_users_at(&self, service: &str, offset: usize) -> Page<UserContract> {
        self.with_service(service, |data| self.page(&data.users, service, "users", offset))
    }

    fn list_groups_at(&self, service: &str, offset: usize) -> Page<GroupContract> {
        self.with_service(service, |data| self.page(&data.groups, service, "groups", offset))
    }

    fn list_group_users_at(&self, service: &str, group_id: &str, offset: usize) -> Page<UserContract> {
        self.with_service(service, |data| {
            let members = data.group_users.get(group_id).cloned().unwrap_or_default();
            self.page(&members, service, &format!("groups/{}/users", group_id), offset)
        })
    }

    fn list_subscriptions_at(&self, service: &str, offset: usize) -> Page<SubscriptionContract> {
        self.with_service(service, |data| {
            self.page(&data.subscriptions, service, "subscriptions", offset)
        })
    }

    /// Count the write as in flight across a couple of scheduler turns, then apply it
    async fn write<T>(
        &self,
        kind: &'static str,
        key: String,
        apply: impl FnOnce() -> ClientResult<T> + Send,
    ) -> ClientResult<T> {
        {
            let mut gauges = self.gauges.lock().unwrap();
            let gauge = gauges.entry(kind).or_default();
            gauge.current += 1;
            gauge.peak = gauge.peak.max(gauge.current);
        }

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        if let Some(gauge) = self.gauges.lock().unwrap().get_mut(kind) {
            gauge.current -= 1;
        }

        if let Some(error) = self.write_failures.lock().unwrap().get(&key).cloned() {
            return Err(error);
        }
        apply()
    }

    fn record(&self, write: Write) {
        self.writes.lock().unwrap().push(write);
    }
}

#[async_trait]
impl ApimApi for InMemoryApim {
    async fn list_users(&self, service: &ServiceLocator) -> ClientResult<Page<UserContract>> {
        Ok(self.list_users_at(&service.service_name, 0))
    }

    async fn list_users_next(&self, next_link: &str) -> ClientResult<Page<UserContract>> {
        let (service, _, offset) = self.parse_link(next_link)?;
        Ok(self.list_users_at(&service, offset))
    }

    async fn list_groups(&self, service: &ServiceLocator) -> ClientResult<Page<GroupContract>> {
        Ok(self.list_groups_at(&service.service_name, 0))
    }

    async fn list_groups_next(&self, next_link: &str) -> ClientResult<Page<GroupContract>> {
        let (service, _, offset) = self.parse_link(next_link)?;
        Ok(self.list_groups_at(&service, offset))
    }

    async fn list_group_users(
        &self,
        service: &ServiceLocator,
        group_id: &str,
    ) -> ClientResult<Page<UserContract>> {
        Ok(self.list_group_users_at(&service.service_name, group_id, 0))
    }

    async fn list_group_users_next(&self, next_link: &str) -> ClientResult<Page<UserContract>> {
        let (service, collection, offset) = self.parse_link(next_link)?;
        let group_id = collection
            .strip_prefix("groups/")
            .and_then(|rest| rest.strip_suffix("/users"))
            .unwrap_or_default()
            .to_string();
        Ok(self.list_group_users_at(&service, &group_id, offset))
    }

    async fn list_subscriptions(
        &self,
        service: &ServiceLocator,
    ) -> ClientResult<Page<SubscriptionContract>> {
        Ok(self.list_subscriptions_at(&service.service_name, 0))
    }

    async fn list_subscriptions_next(
        &self,
        next_link: &str,
    ) -> ClientResult<Page<SubscriptionContract>> {
        let (service, _, offset) = self.parse_link(next_link)?;
        Ok(self.list_subscriptions_at(&service, offset))
    }

    async fn create_or_update_user(
        &self,
        service: &ServiceLocator,
        user_id: &str,
        parameters: &UserCreateParameters,
    ) -> ClientResult<UserContract> {
        self.write("users", format!("user:{}", user_id), || {
            self.record(Write::User {
                service: service.service_name.clone(),
                user_id: user_id.to_string(),
                parameters: parameters.clone(),
            });
            let properties = &parameters.properties;
            Ok(UserContract {
                id: Some(format!(
                    "{}/users/{}",
                    service.resource_path(SUBSCRIPTION_ID),
                    user_id
                )),
                name: Some(user_id.to_string()),
                resource_type: None,
                properties: UserProperties {
                    email: Some(properties.email.clone()),
                    first_name: Some(properties.first_name.clone()),
                    last_name: Some(properties.last_name.clone()),
                    ..Default::default()
                },
            })
        })
        .await
    }

    async fn create_group_user(
        &self,
        service: &ServiceLocator,
        group_id: &str,
        user_id: &str,
    ) -> ClientResult<UserContract> {
        self.write("group_users", format!("group-user:{}/{}", group_id, user_id), || {
            if self.missing_groups.lock().unwrap().contains(group_id) {
                return Err(ClientError::NotFound {
                    resource: format!("groups/{}", group_id),
                });
            }
            self.record(Write::GroupUser {
                service: service.service_name.clone(),
                group_id: group_id.to_string(),
                user_id: user_id.to_string(),
            });
            Ok(UserContract {
                id: Some(format!(
                    "{}/groups/{}/users/{}",
                    service.resource_path(SUBSCRIPTION_ID),
                    group_id,
                    user_id
                )),
                name: Some(user_id.to_string()),
                ..Default::default()
            })
        })
        .await
    }

    async fn create_or_update_subscription(
        &self,
        service: &ServiceLocator,
        subscription_id: &str,
        parameters: &SubscriptionCreateParameters,
    ) -> ClientResult<SubscriptionContract> {
        self.write("subscriptions", format!("subscription:{}", subscription_id), || {
            self.record(Write::Subscription {
                service: service.service_name.clone(),
                subscription_id: subscription_id.to_string(),
                parameters: parameters.clone(),
            });
            Ok(SubscriptionContract {
                id: Some(format!(
                    "{}/subscriptions/{}",
                    service.resource_path(SUBSCRIPTION_ID),
                    subscription_id
                )),
                name: Some(subscription_id.to_string()),
                resource_type: None,
                properties: SubscriptionProperties {
                    owner_id: Some(parameters.properties.owner_id.clone()),
                    scope: Some(parameters.properties.scope.clone()),
                    display_name: Some(parameters.properties.display_name.clone()),
                    state: parameters.properties.state,
                    ..Default::default()
                },
            })
        })
        .await
    }

    async fn delete_user(
        &self,
        service: &ServiceLocator,
        user_id: &str,
        if_match: &str,
        options: DeleteUserOptions,
    ) -> ClientResult<()> {
        self.write("cleanup", format!("delete:{}", user_id), || {
            self.record(Write::DeleteUser {
                service: service.service_name.clone(),
                user_id: user_id.to_string(),
                if_match: if_match.to_string(),
                delete_subscriptions: options.delete_subscriptions,
            });
            Ok(())
        })
        .await
    }
}
