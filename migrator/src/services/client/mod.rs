// Management-plane client for Azure API Management
//
// This module provides everything the migration needs from the remote side:
// - Credentials (device code login or a supplied bearer token)
// - ARM REST operations for users, groups, group members and subscriptions
// - nextLink pagination and full-collection fetchers
// - A dry-run wrapper that reads but never writes

pub mod api;
pub mod arm_client;
pub mod auth;
pub mod dry_run;
pub mod errors;
pub mod listing;
pub mod pagination;
pub mod traits;
pub mod types;

// Re-export core types for easy access
pub use types::{
    resource_name,
    ArmResource,
    CreateOrUpdate,
    DeleteUserOptions,
    // Groups
    GroupContract,
    GroupProperties,
    GroupType,
    Page,
    ServiceLocator,
    // Subscriptions
    SubscriptionContract,
    SubscriptionCreateParameters,
    SubscriptionCreateProperties,
    SubscriptionProperties,
    SubscriptionState,
    // Users
    UserContract,
    UserCreateParameters,
    UserCreateProperties,
    UserIdentity,
    UserProperties,
    UserState,
};

// Re-export error types
pub use errors::{ClientError, ClientResult};

pub use arm_client::ArmClient;
pub use auth::{AccessToken, DeviceCodeCredential, StaticTokenCredential, TokenCredential};
pub use dry_run::DryRunApim;
pub use listing::{list_all_group_users, list_all_groups, list_all_subscriptions, list_all_users};
pub use traits::ApimApi;
