//! Data model for provider configuration.

use std::env;
use std::fmt;

use burwood_api::{Credentials, DEFAULT_BASE_URL};
use burwood_util::text_processing::REDACTED;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the portal host.
pub const HOST_ENV: &str = "PORTAL_HOST";
/// Environment variable supplying the portal username.
pub const USERNAME_ENV: &str = "PORTAL_USERNAME";
/// Environment variable supplying the portal password.
pub const PASSWORD_ENV: &str = "PORTAL_PASSWORD";

/// Host and credentials used to build the portal client.
///
/// Every field is optional so that partial layers (file, environment,
/// command line) can be merged.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Portal base URL. Only needed for non-production environments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Portal username used for authentication with the REST API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Portal password used for authentication with the REST API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .finish()
    }
}

impl ProviderConfig {
    /// Read the `PORTAL_*` environment variables. Blank values count as unset.
    pub fn from_env() -> Self {
        Self {
            host: non_blank_env(HOST_ENV),
            username: non_blank_env(USERNAME_ENV),
            password: non_blank_env(PASSWORD_ENV),
        }
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merged_with(self, other: ProviderConfig) -> Self {
        Self {
            host: other.host.or(self.host),
            username: other.username.or(self.username),
            password: other.password.or(self.password),
        }
    }

    /// Configured host, or the production portal.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Credentials, with unset values left empty.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.username.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )
    }
}

fn non_blank_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
