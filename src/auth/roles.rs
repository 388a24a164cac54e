//! The fixed role enumeration and the route-guard predicate.

use serde::{Deserialize, Serialize};

/// Roles a user can hold. Serialized lowercase, both in the database
/// (`text[]`) and in access-token claims.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
    Support,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
            Self::Support => "support",
        }
    }

    /// Parse a stored role name. Unknown names return `None` so that a
    /// future role added by another deployment does not break reads.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(Self::Admin),
            "customer" => Some(Self::Customer),
            "support" => Some(Self::Support),
            _ => None,
        }
    }
}

/// Default role set granted at registration.
#[must_use]
pub fn default_roles() -> Vec<Role> {
    vec![Role::Customer]
}

/// Route guard: does the user hold at least one of the required roles?
///
/// An empty requirement means the route is open to any authenticated
/// user.
#[must_use]
pub fn has_required_roles(user_roles: &[Role], required: &[Role]) -> bool {
    required.is_empty() || user_roles.iter().any(|role| required.contains(role))
}
