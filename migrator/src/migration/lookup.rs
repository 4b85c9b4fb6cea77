use std::collections::HashMap;

use crate::services::client::UserContract;

/// Destination users created during the user phase, keyed by user identifier
///
/// Built once after every user upsert has settled and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct UserLookup {
    users: HashMap<String, UserContract>,
}

impl UserLookup {
    /// Index created users by the identifier they were upserted under
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, UserContract)>,
    {
        Self {
            users: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, user_id: &str) -> Option<&UserContract> {
        self.users.get(user_id)
    }

    /// Destination resource id of a migrated user
    pub fn resource_id(&self, user_id: &str) -> Option<&str> {
        self.get(user_id).and_then(|user| user.id.as_deref())
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
