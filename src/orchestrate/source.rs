// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Source identifiers of the form `sources/github/{owner}/{repo}`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::OrchestratorError;

static SOURCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sources/github/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$").unwrap());

/// A validated GitHub source reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub owner: String,
    pub repo: String,
}

impl SourceRef {
    /// Parse and validate a source identifier.
    pub fn parse(source: &str) -> Result<Self, OrchestratorError> {
        let captures = SOURCE_REGEX.captures(source).ok_or_else(|| {
            OrchestratorError::validation(format!(
                "Invalid source format: {}. Expected: sources/github/owner/repo",
                source
            ))
        })?;
        Ok(Self {
            owner: captures[1].to_string(),
            repo: captures[2].to_string(),
        })
    }
}
