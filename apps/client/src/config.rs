//! Client configuration read from the environment (and `.env`).

use uuid::Uuid;

use crate::error::{ClientError, Result};

/// Single shared user used when none is configured.
pub const DEFAULT_USER_ID: Uuid = Uuid::from_u128(1);

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            user_id: DEFAULT_USER_ID,
            user_name: "You".to_string(),
            user_avatar: "🌱".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let backend_url = lookup("LUMI_BACKEND_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.backend_url);
        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "LUMI_BACKEND_URL must be an http(s) URL, got {backend_url}"
            )));
        }

        let user_id = match lookup("LUMI_USER_ID") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ClientError::Config(format!("invalid LUMI_USER_ID: {raw}")))?,
            None => defaults.user_id,
        };

        Ok(Self {
            backend_url,
            user_id,
            user_name: lookup("LUMI_USER_NAME").unwrap_or(defaults.user_name),
            user_avatar: lookup("LUMI_USER_AVATAR").unwrap_or(defaults.user_avatar),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ClientConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_the_local_user() {
        let config = config_from(&[]).unwrap();
        assert_eq!(
            config.user_id.to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn trims_trailing_slash() {
        let config = config_from(&[("LUMI_BACKEND_URL", "https://lumi.example.com/")]).unwrap();
        assert_eq!(config.backend_url, "https://lumi.example.com");
    }

    #[test]
    fn rejects_bad_user_id() {
        let err = config_from(&[("LUMI_USER_ID", "nobody")]).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn rejects_non_http_url() {
        assert!(config_from(&[("LUMI_BACKEND_URL", "localhost:3000")]).is_err());
    }
}
