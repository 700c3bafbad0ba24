// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shared memory and branch namespace used for handoff between workers.
//!
//! Branches here are nominal lanes of work. No content, diff, or history is
//! tracked; a merge only checks that both lanes exist.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use serde::Serialize;
use tracing::debug;

use crate::error::CoordinationError;

/// The branch every namespace starts with. It can never be deleted.
pub const MAIN_BRANCH: &str = "main";

/// Outcome of a successful merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub source: String,
    pub target: String,
}

/// Process-lifetime key/value memory plus the set of known branches.
#[derive(Debug)]
pub struct CoordinationStore {
    memory: RwLock<HashMap<String, String>>,
    branches: RwLock<HashSet<String>>,
}

impl Default for CoordinationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinationStore {
    /// Create a store seeded with the `main` branch.
    pub fn new() -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            branches: RwLock::new(HashSet::from([MAIN_BRANCH.to_string()])),
        }
    }

    /// Insert or overwrite a memory entry.
    pub fn store(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        debug!(key = %key, "Storing coordination memory");
        self.memory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.into());
    }

    /// Read a memory entry. `None` means the key was never stored.
    pub fn read(&self, key: &str) -> Option<String> {
        self.memory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// All memory keys, sorted.
    pub fn memory_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .memory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Create `name` from `base`.
    pub fn create_branch(&self, name: &str, base: &str) -> Result<(), CoordinationError> {
        let mut branches = self.branches.write().unwrap_or_else(PoisonError::into_inner);
        if branches.contains(name) {
            return Err(CoordinationError::BranchExists(name.to_string()));
        }
        if !branches.contains(base) {
            return Err(CoordinationError::BaseBranchMissing(base.to_string()));
        }
        branches.insert(name.to_string());
        debug!(branch = name, base, "Created branch");
        Ok(())
    }

    /// Record a merge of `source` into `target`. Both must exist.
    pub fn merge_branch(&self, source: &str, target: &str) -> Result<MergeReport, CoordinationError> {
        let branches = self.branches.read().unwrap_or_else(PoisonError::into_inner);
        if !branches.contains(source) {
            return Err(CoordinationError::BranchNotFound(source.to_string()));
        }
        if !branches.contains(target) {
            return Err(CoordinationError::BranchNotFound(target.to_string()));
        }
        Ok(MergeReport {
            source: source.to_string(),
            target: target.to_string(),
        })
    }

    /// Remove a branch. `main` is protected.
    pub fn delete_branch(&self, name: &str) -> Result<(), CoordinationError> {
        if name == MAIN_BRANCH {
            return Err(CoordinationError::ProtectedBranch(name.to_string()));
        }
        let mut branches = self.branches.write().unwrap_or_else(PoisonError::into_inner);
        if !branches.remove(name) {
            return Err(CoordinationError::BranchNotFound(name.to_string()));
        }
        debug!(branch = name, "Deleted branch");
        Ok(())
    }

    /// Known branch names, sorted for stable output.
    pub fn list_branches(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .branches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Check whether a branch exists.
    pub fn has_branch(&self, name: &str) -> bool {
        self.branches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }
}
