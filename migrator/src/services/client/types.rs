use serde::{Deserialize, Serialize};

/// Resource provider segment shared by every APIM resource path
pub const APIM_PROVIDER: &str = "Microsoft.ApiManagement/service";

/// Last segment of an ARM resource path (`.../users/u2` -> `u2`)
pub fn resource_name(resource_path: &str) -> &str {
    resource_path.rsplit('/').next().unwrap_or(resource_path)
}

/// Resource group + service name pair that addresses one APIM instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ServiceLocator {
    pub resource_group: String,
    pub service_name: String,
}

impl ServiceLocator {
    pub fn new(resource_group: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            resource_group: resource_group.into(),
            service_name: service_name.into(),
        }
    }

    /// Full resource path of the service inside an Azure subscription
    pub fn resource_path(&self, subscription_id: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}/{}",
            subscription_id, self.resource_group, APIM_PROVIDER, self.service_name
        )
    }
}

/// ARM resource envelope: `{ id, name, type, properties }`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ArmResource<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub properties: P,
}

impl<P> ArmResource<P> {
    /// Identifier of the resource: `name` when present, else the last id segment
    pub fn identifier(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.id.as_deref().map(resource_name))
    }

    /// Identifier derived from the resource path only
    pub fn path_identifier(&self) -> Option<&str> {
        self.id.as_deref().map(resource_name)
    }
}

/// One page of a collection listing
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    pub fn new(value: Vec<T>, next_link: Option<String>) -> Self {
        Self { value, next_link }
    }

    /// Continuation link, treating an empty link the same as none
    pub fn continuation(&self) -> Option<&str> {
        self.next_link.as_deref().filter(|link| !link.is_empty())
    }
}

// Users

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    Active,
    Blocked,
    Pending,
    Deleted,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<UserState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<UserIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<String>,
}

pub type UserContract = ArmResource<UserProperties>;

/// Mutable user fields sent on create-or-update
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<UserState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<UserIdentity>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

// Groups

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Custom,
    System,
    External,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub built_in: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<GroupType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

pub type GroupContract = ArmResource<GroupProperties>;

// Subscriptions

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
    Suspended,
    Active,
    Expired,
    Submitted,
    Rejected,
    Cancelled,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<SubscriptionState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_key: Option<String>,
}

// Keys stay out of logs.
impl std::fmt::Debug for SubscriptionProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionProperties")
            .field("owner_id", &self.owner_id)
            .field("scope", &self.scope)
            .field("display_name", &self.display_name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

pub type SubscriptionContract = ArmResource<SubscriptionProperties>;

/// Subscription fields sent on create-or-update
#[derive(Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreateProperties {
    pub owner_id: String,
    pub scope: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<SubscriptionState>,
}

impl std::fmt::Debug for SubscriptionCreateProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionCreateProperties")
            .field("owner_id", &self.owner_id)
            .field("scope", &self.scope)
            .field("display_name", &self.display_name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Request body wrapper for PUT operations: `{ "properties": { ... } }`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateOrUpdate<P> {
    pub properties: P,
}

impl<P> CreateOrUpdate<P> {
    pub fn new(properties: P) -> Self {
        Self { properties }
    }
}

pub type UserCreateParameters = CreateOrUpdate<UserCreateProperties>;
pub type SubscriptionCreateParameters = CreateOrUpdate<SubscriptionCreateProperties>;

/// Options for user deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteUserOptions {
    /// Also delete every subscription the user owns
    pub delete_subscriptions: bool,
}
