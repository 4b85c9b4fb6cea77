//! Exclusion rules and upsert projections, one pure function per entity

use crate::services::client::{
    resource_name, GroupContract, GroupType, SubscriptionContract, SubscriptionCreateParameters,
    SubscriptionCreateProperties, UserContract, UserCreateParameters, UserCreateProperties,
};

/// Built-in administrator; never migrated and never deleted
pub const ADMINISTRATOR_USER_ID: &str = "1";

/// Built-in all-access subscription that exists on every service
pub const MASTER_SUBSCRIPTION_ID: &str = "master";

/// A user ready to be written to the destination
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpsert {
    pub user_id: String,
    pub parameters: UserCreateParameters,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn is_administrator(user: &UserContract) -> bool {
    user.path_identifier() == Some(ADMINISTRATOR_USER_ID)
}

pub fn is_migratable_user(user: &UserContract) -> bool {
    !is_administrator(user)
}

/// Mutable fields of a user, or `None` when id, email or a name is missing
pub fn project_user(user: &UserContract) -> Option<UserUpsert> {
    let user_id = non_empty(user.path_identifier())?;
    let properties = &user.properties;
    let email = non_empty(properties.email.as_deref())?;
    let first_name = non_empty(properties.first_name.as_deref())?;
    let last_name = non_empty(properties.last_name.as_deref())?;

    Some(UserUpsert {
        user_id: user_id.to_string(),
        parameters: UserCreateParameters::new(UserCreateProperties {
            state: properties.state,
            note: properties.note.clone(),
            identities: properties.identities.clone(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }),
    })
}

pub fn is_custom_group(group: &GroupContract) -> bool {
    group.properties.group_type != Some(GroupType::System)
}

/// Destination group identifier for membership edges
pub fn destination_group_id(group_id: &str) -> String {
    group_id.to_lowercase()
}

/// Has an id, is not `master`, and is scoped to the migrated product
pub fn is_migratable_subscription(subscription: &SubscriptionContract, source_scope: &str) -> bool {
    match subscription.path_identifier() {
        None => false,
        Some(MASTER_SUBSCRIPTION_ID) => false,
        Some(_) => subscription.properties.scope.as_deref() == Some(source_scope),
    }
}

/// User identifier of the subscription owner (`.../users/u2` -> `u2`)
pub fn subscription_owner(subscription: &SubscriptionContract) -> Option<&str> {
    non_empty(subscription.properties.owner_id.as_deref()).map(resource_name)
}

pub fn subscription_display_name(subscription: &SubscriptionContract) -> Option<&str> {
    non_empty(subscription.properties.display_name.as_deref())
}

/// Re-scoped create parameters; `None` when the display name is missing
pub fn project_subscription(
    subscription: &SubscriptionContract,
    owner_resource_id: &str,
    destination_scope: &str,
) -> Option<SubscriptionCreateParameters> {
    let properties = &subscription.properties;
    let display_name = subscription_display_name(subscription)?;

    Some(SubscriptionCreateParameters::new(SubscriptionCreateProperties {
        owner_id: owner_resource_id.to_string(),
        scope: destination_scope.to_string(),
        display_name: display_name.to_string(),
        primary_key: properties.primary_key.clone(),
        secondary_key: properties.secondary_key.clone(),
        state: properties.state,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::client::{GroupProperties, SubscriptionProperties, SubscriptionState, UserProperties};

    const SCOPE: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.ApiManagement/service/src/products/starter";

    fn user(id: &str, first_name: Option<&str>) -> UserContract {
        UserContract {
            id: Some(format!("/users/{}", id)),
            name: Some(id.to_string()),
            resource_type: None,
            properties: UserProperties {
                email: Some(format!("{}@example.com", id)),
                first_name: first_name.map(str::to_string),
                last_name: Some("Doe".to_string()),
                ..Default::default()
            },
        }
    }

    fn subscription(id: Option<&str>, scope: &str, owner: &str) -> SubscriptionContract {
        SubscriptionContract {
            id: id.map(|id| format!("/subscriptions/{}", id)),
            name: id.map(str::to_string),
            resource_type: None,
            properties: SubscriptionProperties {
                owner_id: Some(format!("/users/{}", owner)),
                scope: Some(scope.to_string()),
                display_name: Some("Starter".to_string()),
                state: Some(SubscriptionState::Active),
                primary_key: Some("pk".to_string()),
                secondary_key: Some("sk".to_string()),
            },
        }
    }

    #[test]
    fn test_administrator_is_excluded() {
        assert!(!is_migratable_user(&user("1", Some("Admin"))));
        assert!(is_migratable_user(&user("u2", Some("Ada"))));
    }

    #[test]
    fn test_user_projection_requires_names() {
        let projected = project_user(&user("u2", Some("Ada"))).unwrap();
        assert_eq!(projected.user_id, "u2");
        assert_eq!(projected.parameters.properties.first_name, "Ada");
        assert_eq!(projected.parameters.properties.email, "u2@example.com");

        assert!(project_user(&user("u3", None)).is_none());
        assert!(project_user(&user("u3", Some("  "))).is_none());

        let mut without_id = user("u4", Some("Ada"));
        without_id.id = None;
        assert!(project_user(&without_id).is_none());
    }

    #[test]
    fn test_system_groups_are_excluded() {
        let group = |group_type| GroupContract {
            id: Some("/groups/g".to_string()),
            properties: GroupProperties {
                group_type,
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(!is_custom_group(&group(Some(GroupType::System))));
        assert!(is_custom_group(&group(Some(GroupType::Custom))));
        assert!(is_custom_group(&group(Some(GroupType::External))));
        assert!(is_custom_group(&group(None)));
        assert_eq!(destination_group_id("Partners"), "partners");
    }

    #[test]
    fn test_subscription_rules() {
        assert!(is_migratable_subscription(&subscription(Some("s1"), SCOPE, "u2"), SCOPE));
        assert!(!is_migratable_subscription(&subscription(Some("master"), SCOPE, "1"), SCOPE));
        assert!(!is_migratable_subscription(&subscription(None, SCOPE, "u2"), SCOPE));
        assert!(!is_migratable_subscription(
            &subscription(Some("s2"), "/products/unlimited", "u2"),
            SCOPE
        ));
    }

    #[test]
    fn test_subscription_projection() {
        let source = subscription(Some("s1"), SCOPE, "u2");
        assert_eq!(subscription_owner(&source), Some("u2"));

        let params = project_subscription(&source, "/dest/users/u2", "/products/Starter").unwrap();
        assert_eq!(params.properties.owner_id, "/dest/users/u2");
        assert_eq!(params.properties.scope, "/products/Starter");
        assert_eq!(params.properties.primary_key.as_deref(), Some("pk"));

        let mut unnamed = source.clone();
        unnamed.properties.display_name = None;
        assert_eq!(subscription_display_name(&unnamed), None);
        assert!(project_subscription(&unnamed, "/dest/users/u2", "/products/Starter").is_none());

        let mut orphan = source;
        orphan.properties.owner_id = Some(String::new());
        assert_eq!(subscription_owner(&orphan), None);
    }
}
