use async_trait::async_trait;

use crate::domain::value_objects::Role;

/// Current standing of a user within one tenant, as seen by the refresh exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantMembership {
    pub user_id: i64,
    pub tenant_id: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

/// Failure reported by a directory backend, classified as an internal error upstream
pub type DirectoryError = Box<dyn std::error::Error + Send + Sync>;

/// Read-only lookup into the user/role store owned by the persistence layer
///
/// Refresh tokens carry no email or role, so minting a new access token has to
/// consult the current membership.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Find the membership of `user_id` in `tenant_id`, `None` if the user has no role there
    async fn find_membership(
        &self,
        user_id: i64,
        tenant_id: &str,
    ) -> Result<Option<TenantMembership>, DirectoryError>;
}
