// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration module for Maestro.
//!
//! Handles loading and merging of configuration from multiple sources:
//! - Global config: ~/.maestro/config.json
//! - Workspace config: .maestro.json, .maestro/config.json, or maestro.config.yaml
//! - Local config: .maestro.local.json (gitignored, for personal overrides)
//! - Environment: JULES_API_KEY, JULES_API_BASE_URL, JULES_API_VERSION
//! - CLI options: command-line arguments
//!
//! Configuration is merged with precedence (CLI > env > local > workspace > global > defaults).

mod loader;
mod merger;
mod types;

pub use loader::{
    get_global_config_path, load_config_file, load_global_config, load_local_config,
    load_workspace_config, CONFIG_FILES, GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILE, LOCAL_CONFIG_FILE,
};

pub use merger::{
    merge_config, CliOptions, EnvOptions, ENV_API_KEY, ENV_API_VERSION, ENV_BASE_URL,
};

pub use types::{ResolvedConfig, RetryConfig, WorkspaceConfig};

use crate::error::ConfigError;
use std::path::Path;

/// Load and merge all configuration sources for a workspace.
///
/// This is the main entry point for configuration loading.
pub fn load_config(workspace_root: &Path, cli_options: CliOptions) -> Result<ResolvedConfig, ConfigError> {
    let global = load_global_config()?;
    let workspace = load_workspace_config(workspace_root)?;
    let local = load_local_config(workspace_root)?;

    Ok(merge_config(global, workspace, local, EnvOptions::from_env(), cli_options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_local_overrides_workspace() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".maestro.json"),
            r#"{"apiVersion": "v1beta", "timeoutMs": 5000}"#,
        )
        .unwrap();
        std::fs::write(temp.path().join(LOCAL_CONFIG_FILE), r#"{"timeoutMs": 100}"#).unwrap();

        let config = load_config(temp.path(), CliOptions::default()).unwrap();
        assert_eq!(config.timeout_ms, 100);
    }

    #[test]
    fn test_load_config_cli_override() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".maestro.json"), r#"{"timeoutMs": 5000}"#).unwrap();

        let cli = CliOptions {
            timeout_ms: Some(42),
            ..Default::default()
        };
        let config = load_config(temp.path(), cli).unwrap();
        assert_eq!(config.timeout_ms, 42); // CLI wins
    }
}
