use serde::Serialize;
use std::fmt;

use crate::domain::value_objects::{Role, RoleSet};

/// Authenticated caller attached to a request by the authentication stage
///
/// Only the authentication middleware constructs this from validated access
/// token claims; every later stage and handler reads it from the request
/// extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub user_id: i64,
    pub tenant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl AuthContext {
    /// Tenant scope of the request, `None` when the credential carried an empty tenant
    pub fn tenant(&self) -> Option<&str> {
        Some(self.tenant_id.as_str()).filter(|tenant| !tenant.is_empty())
    }

    /// Check if the caller's role is a member of `allowed`
    pub fn has_any_role(&self, allowed: RoleSet) -> bool {
        self.role.is_some_and(|role| allowed.contains(role))
    }
}

impl fmt::Display for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuthContext(user_id={}, tenant_id={}, role={})",
            self.user_id,
            self.tenant_id,
            self.role.map_or("none", Role::as_str)
        )
    }
}
