// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration merging.
//!
//! Handles merging configurations from different sources with proper precedence.

use super::types::{ResolvedConfig, WorkspaceConfig};

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "JULES_API_KEY";
/// Environment variable overriding the API host.
pub const ENV_BASE_URL: &str = "JULES_API_BASE_URL";
/// Environment variable overriding the API version.
pub const ENV_API_VERSION: &str = "JULES_API_VERSION";

/// CLI options that can override configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub api_version: Option<String>,
    pub timeout_ms: Option<u64>,
}

/// Settings taken from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOptions {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub api_version: Option<String>,
}

impl EnvOptions {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            api_key: get(ENV_API_KEY),
            base_url: get(ENV_BASE_URL),
            api_version: get(ENV_API_VERSION),
        }
    }
}

/// Merge multiple configurations with precedence.
///
/// Precedence (highest to lowest):
/// 1. CLI options
/// 2. Environment variables
/// 3. Local config (.maestro.local.json)
/// 4. Workspace config (.maestro.json)
/// 5. Global config (~/.maestro/config.json)
/// 6. Default values
pub fn merge_config(
    global: Option<WorkspaceConfig>,
    workspace: Option<WorkspaceConfig>,
    local: Option<WorkspaceConfig>,
    env: EnvOptions,
    cli: CliOptions,
) -> ResolvedConfig {
    let mut result = ResolvedConfig::default();

    for config in [global, workspace, local].into_iter().flatten() {
        apply_workspace_config(&mut result, &config);
    }

    apply_env_options(&mut result, env);
    apply_cli_options(&mut result, cli);

    result
}

fn apply_workspace_config(result: &mut ResolvedConfig, config: &WorkspaceConfig) {
    if config.api_key.is_some() {
        result.api_key = config.api_key.clone();
    }

    if let Some(ref base_url) = config.base_url {
        result.base_url = base_url.clone();
    }

    if let Some(ref api_version) = config.api_version {
        result.api_version = api_version.clone();
    }

    if let Some(timeout_ms) = config.timeout_ms {
        result.timeout_ms = timeout_ms;
    }

    if let Some(ref retry) = config.retry {
        if let Some(attempts) = retry.max_attempts {
            result.retry_attempts = attempts.max(1);
        }
        if let Some(delay) = retry.base_delay_ms {
            result.retry_base_delay_ms = delay;
        }
    }
}

fn apply_env_options(result: &mut ResolvedConfig, env: EnvOptions) {
    if env.api_key.is_some() {
        result.api_key = env.api_key;
    }
    if let Some(base_url) = env.base_url {
        result.base_url = base_url;
    }
    if let Some(api_version) = env.api_version {
        result.api_version = api_version;
    }
}

fn apply_cli_options(result: &mut ResolvedConfig, cli: CliOptions) {
    if cli.api_key.is_some() {
        result.api_key = cli.api_key;
    }
    if let Some(base_url) = cli.base_url {
        result.base_url = base_url;
    }
    if let Some(api_version) = cli.api_version {
        result.api_version = api_version;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        result.timeout_ms = timeout_ms;
    }
}
