//! Registry credentials taken from the process environment

use super::error::{RegistryError, RegistryResult};

/// Environment variable holding the registry user (namespace of the repo)
pub const USERNAME_VAR: &str = "HF_USERNAME";
/// Environment variable holding the access token
pub const TOKEN_VAR: &str = "HF_TOKEN";
/// Optional override of the registry base URL
pub const ENDPOINT_VAR: &str = "HF_ENDPOINT";
/// Registry used when no override is set
pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

/// Username and token for the registry
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

// Keep the token out of logs and panic messages
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read both credentials from the process environment
    pub fn from_env() -> RegistryResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read both credentials through `lookup`. An unset or empty value is a
    /// [`RegistryError::MissingCredential`].
    pub fn from_lookup<F>(lookup: F) -> RegistryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = required(&lookup, USERNAME_VAR, "the registry username")?;
        let token = required(&lookup, TOKEN_VAR, "a registry access token with write scope")?;
        Ok(Self { username, token })
    }

    /// `<username>/<name>`
    pub fn repo_id(&self, repo_name: &str) -> String {
        format!("{}/{}", self.username, repo_name)
    }
}

fn required<F>(lookup: &F, var: &'static str, hint: &'static str) -> RegistryResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(RegistryError::MissingCredential { var, hint })
}

/// Registry base URL from `HF_ENDPOINT`, or the public hub
pub fn endpoint_from_env() -> String {
    std::env::var(ENDPOINT_VAR)
        .ok()
        .map(|v| v.trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}
