//! ARM REST operations for API Management
//!
//! Each entity type has its own module; every function takes the
//! [`ArmClient`](super::ArmClient) as first parameter:
//! - Users (list, create-or-update, delete)
//! - Groups and group memberships
//! - Subscriptions

pub mod groups;
pub use groups::*;

pub mod subscriptions;
pub use subscriptions::*;

pub mod users;
pub use users::*;
