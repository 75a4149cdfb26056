#[cfg(test)]
pub mod mocks {
    use async_trait::async_trait;
    use std::collections::HashMap;

    use crate::domain::repositories::{AccountDirectory, DirectoryError, TenantMembership};
    use crate::domain::value_objects::Role;

    /// In-memory account directory keyed by `(user_id, tenant_id)`
    #[derive(Clone, Default)]
    pub struct InMemoryDirectory {
        members: HashMap<(i64, String), TenantMembership>,
        fail: bool,
    }

    impl InMemoryDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        /// Directory whose every lookup fails like an unreachable database
        pub fn failing() -> Self {
            Self { fail: true, ..Self::default() }
        }

        #[must_use]
        pub fn with_member(mut self, user_id: i64, tenant_id: &str, email: &str, role: Role) -> Self {
            self.members.insert(
                (user_id, tenant_id.to_string()),
                TenantMembership {
                    user_id,
                    tenant_id: tenant_id.to_string(),
                    email: email.to_string(),
                    role,
                    active: true,
                },
            );
            self
        }

        #[must_use]
        pub fn deactivate(mut self, user_id: i64, tenant_id: &str) -> Self {
            if let Some(member) = self.members.get_mut(&(user_id, tenant_id.to_string())) {
                member.active = false;
            }
            self
        }
    }

    #[async_trait]
    impl AccountDirectory for InMemoryDirectory {
        async fn find_membership(
            &self,
            user_id: i64,
            tenant_id: &str,
        ) -> Result<Option<TenantMembership>, DirectoryError> {
            if self.fail {
                return Err("connection refused".into());
            }
            Ok(self.members.get(&(user_id, tenant_id.to_string())).cloned())
        }
    }
}
