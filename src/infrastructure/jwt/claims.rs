use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::entities::AuthContext;
use crate::domain::value_objects::{Role, TokenKind};

/// Identity a credential is issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub user_id: i64,
    pub tenant_id: String,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl Subject {
    pub fn new(user_id: i64, tenant_id: impl Into<String>) -> Self {
        Self { user_id, tenant_id: tenant_id.into(), email: None, role: None }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

/// JWT claims carried by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>, // access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>, // access tokens only
    pub token_type: TokenKind,
    pub iat: u64, // Issued at
    pub nbf: u64, // Not before
    pub exp: u64, // Expiration time
}

impl Claims {
    /// Build claims for `subject` valid from `now` for `lifetime`
    ///
    /// Refresh claims never carry email or role, whatever the subject holds.
    pub fn issue(kind: TokenKind, subject: &Subject, now: u64, lifetime: Duration) -> Self {
        let (email, role) = match kind {
            TokenKind::Access => (subject.email.clone(), subject.role),
            TokenKind::Refresh => (None, None),
        };

        Self {
            user_id: subject.user_id,
            tenant_id: subject.tenant_id.clone(),
            email,
            role,
            token_type: kind,
            iat: now,
            nbf: now,
            exp: now.saturating_add(lifetime.as_secs()),
        }
    }

    /// Check if token is expired at `now`
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.exp < now
    }

    /// Check if token is not yet valid at `now`
    pub fn is_not_yet_valid_at(&self, now: u64) -> bool {
        self.nbf > now
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            tenant_id: claims.tenant_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Current Unix time in whole seconds
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
