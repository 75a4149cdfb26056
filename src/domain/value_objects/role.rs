use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a user holds within a tenant, matching the `user_roles.role` column values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator, not bound to a single tenant's administration
    #[serde(rename = "superadmin")]
    SuperAdmin,
    /// Administrator of one tenant
    TenantAdmin,
    /// Supervises agents and queues
    Supervisor,
    /// Handles calls, chats and tickets
    Agent,
    /// Read-only access
    Viewer,
}

impl Role {
    pub const ALL: [Role; 5] =
        [Role::SuperAdmin, Role::TenantAdmin, Role::Supervisor, Role::Agent, Role::Viewer];

    /// Wire representation of the role
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "superadmin",
            Self::TenantAdmin => "tenant_admin",
            Self::Supervisor => "supervisor",
            Self::Agent => "agent",
            Self::Viewer => "viewer",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::SuperAdmin => 1,
            Self::TenantAdmin => 1 << 1,
            Self::Supervisor => 1 << 2,
            Self::Agent => 1 << 3,
            Self::Viewer => 1 << 4,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Self::SuperAdmin),
            "tenant_admin" => Ok(Self::TenantAdmin),
            "supervisor" => Ok(Self::Supervisor),
            "agent" => Ok(Self::Agent),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!(
                "Invalid role: {s}. Valid values: superadmin, tenant_admin, supervisor, agent, viewer"
            )),
        }
    }
}

/// Set of roles allowed through a route group
///
/// Stored as a bit set so it is `Copy` and can be built in `const` context.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);

    /// Every role, for routes that only need an authenticated tenant member
    pub const ANY: RoleSet = RoleSet::of(&Role::ALL);

    /// Super admins and tenant admins
    pub const ADMINS: RoleSet = RoleSet::of(&[Role::SuperAdmin, Role::TenantAdmin]);

    /// Admins plus supervisors
    pub const MANAGERS: RoleSet =
        RoleSet::of(&[Role::SuperAdmin, Role::TenantAdmin, Role::Supervisor]);

    pub const fn of(roles: &[Role]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= roles[i].bit();
            i += 1;
        }
        Self(bits)
    }

    #[must_use]
    pub const fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    pub const fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, RoleSet::with)
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
