//! Backend API configuration.

use sprout_core::error::{Result, SproutError};
use std::env;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connection settings for the parent portal backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend, without a trailing slash
    pub base_url: String,
    /// Bearer token sent with every request, if the deployment needs one
    pub auth_token: Option<String>,
}

impl ApiConfig {
    /// Creates a config pointed at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            auth_token: None,
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// `SPROUT_API_BASE_URL` defaults to the backend's local dev address;
    /// `SPROUT_API_TOKEN` is optional.
    pub fn try_from_env() -> Result<Self> {
        Self::from_env_values(
            env::var("SPROUT_API_BASE_URL").ok(),
            env::var("SPROUT_API_TOKEN").ok(),
        )
    }

    fn from_env_values(base_url: Option<String>, auth_token: Option<String>) -> Result<Self> {
        let base_url = match base_url {
            Some(value) if value.trim().is_empty() => {
                return Err(SproutError::config("SPROUT_API_BASE_URL is set but empty"));
            }
            Some(value) => value,
            None => DEFAULT_BASE_URL.to_string(),
        };
        Ok(Self {
            auth_token,
            ..Self::new(base_url)
        })
    }

    /// Sets the bearer token after construction.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Joins a path onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let config = ApiConfig::new("http://localhost:8000/");
        assert_eq!(
            config.endpoint("/parent/advisor/chat"),
            "http://localhost:8000/parent/advisor/chat"
        );
        assert_eq!(
            config.endpoint("parent/children"),
            "http://localhost:8000/parent/children"
        );
    }

    #[test]
    fn env_values_default_when_unset_and_reject_an_empty_base_url() {
        let config = ApiConfig::from_env_values(None, Some("tok".to_string())).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.auth_token.as_deref(), Some("tok"));

        let err = ApiConfig::from_env_values(Some("  ".to_string()), None).unwrap_err();
        assert!(matches!(err, SproutError::Config(_)));
    }

    #[test]
    fn auth_token_builder_sets_the_token() {
        let config = ApiConfig::new("http://api.test").with_auth_token("secret");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
    }
}
