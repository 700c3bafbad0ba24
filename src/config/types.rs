// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! Defines the structure of file-based and resolved configuration,
//! supporting JSON and YAML formats.

use serde::{Deserialize, Serialize};

use crate::orchestrate::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS};
use crate::remote::jules::{DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Configuration as written in a config file.
/// Every field is optional; missing fields fall through to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Jules API key. Prefer the JULES_API_KEY environment variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API version path segment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Request timeout in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Session creation retry settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryConfig>,
}

/// Retry settings for session creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Total attempts, including the first one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Delay unit in milliseconds; attempt n waits n times this
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_delay_ms: Option<u64>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub api_version: String,
    pub timeout_ms: u64,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_SECS * 1000,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

impl ResolvedConfig {
    /// Copy of this config that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api_key = self.api_key.as_ref().map(|key| mask_secret(key));
        copy
    }
}

/// Keep the last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_config_camel_case() {
        let config: WorkspaceConfig = serde_json::from_str(
            r#"{"baseUrl": "http://localhost:8080", "timeoutMs": 1000, "retry": {"maxAttempts": 5}}"#,
        )
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.timeout_ms, Some(1000));
        assert_eq!(config.retry.unwrap().max_attempts, Some(5));
    }

    #[test]
    fn test_resolved_defaults() {
        let config = ResolvedConfig::default();
        assert_eq!(config.base_url, "https://jules.googleapis.com");
        assert_eq!(config.api_version, "v1alpha");
        assert_eq!(config.timeout_ms, 60_000);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_base_delay_ms, 1000);
    }

    #[test]
    fn test_redacted_masks_key() {
        let config = ResolvedConfig {
            api_key: Some("secret-key-1234".to_string()),
            ..Default::default()
        };
        assert_eq!(config.redacted().api_key.as_deref(), Some("****1234"));
        assert_eq!(mask_secret("abc"), "****");
    }
}
