use std::fmt;

use serde::Deserialize;

use campus_core::config::Config;

use crate::domain::types::DEFAULT_LOGIN_DOMAIN;

/// Provisioning service configuration loaded from environment variables.
#[derive(Deserialize)]
pub struct ProvisioningConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret the identity platform signs access tokens with.
    pub jwt_secret: String,
    /// Base URL of the hosted auth service (e.g. "https://project.example.co").
    pub auth_url: String,
    /// Service-role key for the auth admin API.
    pub auth_service_key: String,
    /// Domain appended to synthesized login handles. Env var: `LOGIN_DOMAIN`.
    #[serde(default = "default_login_domain")]
    pub login_domain: String,
    /// TCP port to listen on (default 3120). Env var: `PROVISIONING_PORT`.
    #[serde(default = "default_port")]
    pub provisioning_port: u16,
    /// Request timeout for identity store calls, in seconds.
    #[serde(default = "default_identity_timeout")]
    pub identity_timeout_secs: u64,
}

fn default_login_domain() -> String {
    DEFAULT_LOGIN_DOMAIN.to_owned()
}

fn default_port() -> u16 {
    3120
}

fn default_identity_timeout() -> u64 {
    10
}

impl Config for ProvisioningConfig {}

impl fmt::Debug for ProvisioningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisioningConfig")
            .field("database_url", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("auth_url", &self.auth_url)
            .field("auth_service_key", &"<redacted>")
            .field("login_domain", &self.login_domain)
            .field("provisioning_port", &self.provisioning_port)
            .field("identity_timeout_secs", &self.identity_timeout_secs)
            .finish()
    }
}
