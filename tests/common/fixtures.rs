use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::Value;
use std::sync::Arc;

use callcenter_gateway::domain::repositories::{
    AccountDirectory, DirectoryError, TenantMembership,
};
use callcenter_gateway::domain::value_objects::Role;
use callcenter_gateway::infrastructure::config::{
    AppConfig, CorsConfig, JwtConfig, LogFormat, LoggingConfig, RuntimeMode, ServerConfig,
};
use callcenter_gateway::infrastructure::jwt::JwtService;

pub const SECRET: &str = "integration-test-secret";
pub const TENANT: &str = "acme-corp";
pub const CONSOLE_ORIGIN: &str = "https://console.acme.test";

pub fn test_config() -> AppConfig {
    AppConfig {
        mode: RuntimeMode::Local,
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 0 },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
            access_ttl_seconds: 900,
            refresh_ttl_seconds: 86_400,
        },
        cors: CorsConfig {
            allowed_origins: vec![CONSOLE_ORIGIN.to_string()],
            ..CorsConfig::default()
        },
        logging: LoggingConfig { level: "debug".to_string(), format: LogFormat::Json },
    }
}

pub fn token_service() -> Arc<JwtService> {
    Arc::new(JwtService::from_config(&test_config().jwt))
}

/// Directory backed by a fixed membership list
pub struct StaticDirectory {
    members: Vec<TenantMembership>,
}

impl StaticDirectory {
    pub fn with_members(members: Vec<TenantMembership>) -> Arc<dyn AccountDirectory> {
        Arc::new(Self { members })
    }
}

#[async_trait]
impl AccountDirectory for StaticDirectory {
    async fn find_membership(
        &self,
        user_id: i64,
        tenant_id: &str,
    ) -> Result<Option<TenantMembership>, DirectoryError> {
        Ok(self
            .members
            .iter()
            .find(|member| member.user_id == user_id && member.tenant_id == tenant_id)
            .cloned())
    }
}

pub fn member(user_id: i64, email: &str, role: Role) -> TenantMembership {
    TenantMembership {
        user_id,
        tenant_id: TENANT.to_string(),
        email: email.to_string(),
        role,
        active: true,
    }
}

/// Assemble a compact JWT from raw header, claims and signature segments
pub fn forge_token(header: &Value, claims: &Value, signature: &str) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        signature
    )
}

/// Decode the claims segment of a compact JWT
pub fn decode_claims(token: &str) -> Value {
    let segment = token.split('.').nth(1).unwrap();
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segment).unwrap()).unwrap()
}

/// Replace one character in the middle of the signature segment
pub fn tamper_signature(token: &str) -> String {
    let (signed, signature) = token.rsplit_once('.').unwrap();
    let mut chars: Vec<char> = signature.chars().collect();
    let middle = chars.len() / 2;
    chars[middle] = if chars[middle] == 'A' { 'B' } else { 'A' };
    format!("{signed}.{}", chars.into_iter().collect::<String>())
}
