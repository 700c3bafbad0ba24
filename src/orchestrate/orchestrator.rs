// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Worker orchestrator.
//!
//! The orchestrator owns the authoritative local registry of worker sessions.
//! It composes role prompts, creates remote sessions under a retry policy,
//! mirrors remote status into the registry, and fronts the coordination store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  WorkerOrchestrator                   │
//! │  ┌──────────────┐  ┌──────────────┐  ┌─────────────┐ │
//! │  │   registry   │  │ coordination │  │ RetryPolicy │ │
//! │  │ id → session │  │ memory/branch│  │  (create)   │ │
//! │  └──────────────┘  └──────────────┘  └─────────────┘ │
//! └───────────────────────────┬──────────────────────────┘
//!                             │ SessionClient
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │ remote task service │
//!                  └─────────────────────┘
//! ```
//!
//! Locks are never held across a remote call. Two concurrent creations that
//! receive the same session id resolve last-writer-wins.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::ResolvedConfig;
use crate::coordination::{CoordinationStore, MergeReport, MAIN_BRANCH};
use crate::error::OrchestratorError;
use crate::remote::{ActivityInfo, CreateSessionRequest, SharedSessionClient, SourceInfo};
use crate::roles::{compose_prompt, Role};

use super::retry::RetryPolicy;
use super::source::SourceRef;
use super::templates;
use super::types::{
    EstimateResult, RoleRequest, WorkerSession, MAX_ACTIVITY_LIMIT, MAX_STREAM_ACTIVITIES,
};

type Result<T> = std::result::Result<T, OrchestratorError>;

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OrchestratorError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn require_range(field: &str, value: u32, max: u32) -> Result<()> {
    if value == 0 || value > max {
        return Err(OrchestratorError::validation(format!(
            "{} must be between 1 and {}, got {}",
            field, max, value
        )));
    }
    Ok(())
}

/// Coordinates remote worker sessions under named roles.
pub struct WorkerOrchestrator {
    /// Remote session client.
    client: SharedSessionClient,
    /// Tracked sessions by id.
    workers: RwLock<HashMap<String, WorkerSession>>,
    /// Shared memory and branch namespace.
    coordination: CoordinationStore,
    /// Retry policy for session creation.
    retry: RetryPolicy,
}

impl WorkerOrchestrator {
    /// Create an orchestrator with the default retry policy.
    pub fn new(client: SharedSessionClient) -> Self {
        Self {
            client,
            workers: RwLock::new(HashMap::new()),
            coordination: CoordinationStore::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Create an orchestrator whose retry policy comes from configuration.
    pub fn from_config(client: SharedSessionClient, config: &ResolvedConfig) -> Self {
        Self::new(client).with_retry_policy(RetryPolicy::new(
            config.retry_attempts,
            Duration::from_millis(config.retry_base_delay_ms),
        ))
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    // ========================================================================
    // Worker lifecycle
    // ========================================================================

    /// Create a worker and start tracking it.
    ///
    /// The remote call is retried under the orchestrator's [`RetryPolicy`];
    /// inputs are validated first and never retried.
    #[instrument(skip(self, request), fields(title = %request.title, role = %request.role))]
    pub async fn create_worker(&self, request: RoleRequest) -> Result<String> {
        require_non_empty("task", &request.task)?;
        require_non_empty("title", &request.title)?;
        require_non_empty("branch", &request.branch)?;
        let source = SourceRef::parse(&request.source)?;
        debug!(owner = %source.owner, repo = %source.repo, "Validated source");

        let role = Role::coerce(&request.role);
        if role.as_str() != request.role {
            debug!(requested = %request.role, "Unrecognized role, using FREELANCER");
        }

        let parent = match role {
            Role::Crew => request.parent_session_id.filter(|p| !p.trim().is_empty()),
            _ => None,
        };
        if role == Role::Crew && parent.is_none() {
            warn!("Crew worker created without a parent session id");
        }

        let create = CreateSessionRequest {
            prompt: compose_prompt(role, parent.as_deref(), &request.task),
            source: request.source,
            title: request.title.clone(),
            branch: request.branch,
        };

        let client = self.client.as_ref();
        let create = &create;
        let session = self
            .retry
            .run("create_session", |_attempt| client.create_session(create))
            .await?;

        let session_id = session.session_id.clone();
        let worker = WorkerSession::new(session.session_id, request.title, role, parent, session.status);

        let replaced = self.workers.write().await.insert(session_id.clone(), worker);
        if replaced.is_some() {
            warn!(session_id = %session_id, "Replaced an existing worker record");
        }

        info!(session_id = %session_id, role = %role, "Created worker");
        Ok(session_id)
    }

    /// Send a follow-up message to a tracked worker.
    #[instrument(skip(self, text))]
    pub async fn send_message(&self, session_id: &str, text: &str) -> Result<()> {
        require_non_empty("message", text)?;
        self.ensure_tracked(session_id).await?;

        self.client.send_message(session_id, text).await?;
        self.touch(session_id).await;
        Ok(())
    }

    /// Recent activities of a tracked worker (`limit` in 1..=100).
    #[instrument(skip(self))]
    pub async fn get_activities(&self, session_id: &str, limit: u32) -> Result<Vec<ActivityInfo>> {
        require_range("limit", limit, MAX_ACTIVITY_LIMIT)?;
        self.ensure_tracked(session_id).await?;

        let activities = self.client.list_activities(session_id, limit).await?;
        self.touch(session_id).await;
        Ok(activities)
    }

    /// Collect up to `max` activities (1..=200), following page tokens.
    #[instrument(skip(self))]
    pub async fn stream_activities(&self, session_id: &str, max: u32) -> Result<Vec<ActivityInfo>> {
        require_range("max_activities", max, MAX_STREAM_ACTIVITIES)?;
        self.ensure_tracked(session_id).await?;

        let mut collected: Vec<ActivityInfo> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let remaining = max - collected.len() as u32;
            let page = self
                .client
                .list_activities_page(session_id, remaining.min(MAX_ACTIVITY_LIMIT), page_token.take())
                .await?;

            let received = page.activities.len();
            collected.extend(page.activities.into_iter().take(remaining as usize));

            match page.next_page_token {
                Some(token) if received > 0 && collected.len() < max as usize => {
                    page_token = Some(token);
                }
                _ => break,
            }
        }

        self.touch(session_id).await;
        debug!(count = collected.len(), "Collected activities");
        Ok(collected)
    }

    /// Current view of a worker, or `None` if it is not tracked.
    ///
    /// The remote status is refreshed on a best-effort basis. A failed refresh
    /// is logged and the cached record is returned.
    #[instrument(skip(self))]
    pub async fn get_worker_status(&self, session_id: &str) -> Option<WorkerSession> {
        if !self.workers.read().await.contains_key(session_id) {
            return None;
        }

        match self.client.get_session(session_id).await {
            Ok(info) => {
                if let Some(worker) = self.workers.write().await.get_mut(session_id) {
                    if let Some(status) = info.status {
                        worker.status = status;
                    }
                    worker.touch();
                }
            }
            Err(err) => {
                warn!(session_id, error = %err, "Failed to refresh worker status");
            }
        }

        self.workers.read().await.get(session_id).cloned()
    }

    /// Delete a worker remotely, then stop tracking it.
    ///
    /// A failed remote delete leaves the local record in place.
    #[instrument(skip(self))]
    pub async fn delete_worker(&self, session_id: &str) -> Result<()> {
        self.ensure_tracked(session_id).await?;

        self.client.delete_session(session_id).await?;
        self.workers.write().await.remove(session_id);

        info!(session_id, "Deleted worker");
        Ok(())
    }

    /// Cached record of a tracked worker, without contacting the service.
    pub async fn worker(&self, session_id: &str) -> Option<WorkerSession> {
        self.workers.read().await.get(session_id).cloned()
    }

    /// Snapshot of every tracked worker, oldest first.
    pub async fn list_workers(&self) -> Vec<WorkerSession> {
        let mut workers: Vec<WorkerSession> = self.workers.read().await.values().cloned().collect();
        workers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        workers
    }

    /// Repositories available on the remote service.
    pub async fn list_sources(&self) -> Result<Vec<SourceInfo>> {
        Ok(self.client.list_sources().await?)
    }

    // ========================================================================
    // Convenience workers
    // ========================================================================

    /// Start an Evaluator that estimates `task`.
    pub async fn estimate_work(&self, task: &str, source: &str) -> Result<EstimateResult> {
        require_non_empty("task_description", task)?;
        let request = RoleRequest::new(templates::estimation_prompt(task), source, templates::ESTIMATION_TITLE)
            .with_role(Role::Evaluator.as_str());
        let session_id = self.create_worker(request).await?;
        Ok(EstimateResult {
            session_id,
            estimation_type: Role::Evaluator,
        })
    }

    /// Start a Freelancer that generates code.
    pub async fn generate_code(
        &self,
        prompt: &str,
        source: &str,
        language: &str,
        context: Option<&BTreeMap<String, String>>,
    ) -> Result<String> {
        require_non_empty("prompt", prompt)?;
        require_non_empty("language", language)?;
        let request = RoleRequest::new(
            templates::generation_prompt(prompt, language, context),
            source,
            templates::generation_title(prompt),
        );
        self.create_worker(request).await
    }

    /// Start a Freelancer that fixes a bug.
    pub async fn fix_bug(
        &self,
        source: &str,
        error_description: &str,
        expected_behavior: &str,
        code_context: Option<&str>,
    ) -> Result<String> {
        require_non_empty("error_description", error_description)?;
        require_non_empty("expected_behavior", expected_behavior)?;
        let request = RoleRequest::new(
            templates::bug_fix_prompt(error_description, expected_behavior, code_context),
            source,
            templates::bug_fix_title(error_description),
        );
        self.create_worker(request).await
    }

    /// Start an Evaluator that reviews code.
    pub async fn review_code(
        &self,
        source: &str,
        code: &str,
        language: &str,
        focus_areas: &[String],
    ) -> Result<String> {
        require_non_empty("code", code)?;
        require_non_empty("language", language)?;
        let request = RoleRequest::new(
            templates::review_prompt(code, language, focus_areas),
            source,
            templates::review_title(language),
        )
        .with_role(Role::Evaluator.as_str());
        self.create_worker(request).await
    }

    // ========================================================================
    // Coordination
    // ========================================================================

    pub fn store_memory(&self, key: &str, value: &str) -> Result<()> {
        require_non_empty("key", key)?;
        self.coordination.store(key, value);
        Ok(())
    }

    pub fn read_memory(&self, key: &str) -> Result<Option<String>> {
        require_non_empty("key", key)?;
        Ok(self.coordination.read(key))
    }

    pub fn list_memory_keys(&self) -> Vec<String> {
        self.coordination.memory_keys()
    }

    /// Create `name` from `base` (defaults to `main`).
    pub fn create_branch(&self, name: &str, base: Option<&str>) -> Result<()> {
        require_non_empty("branch_name", name)?;
        Ok(self.coordination.create_branch(name, base.unwrap_or(MAIN_BRANCH))?)
    }

    pub fn merge_branch(&self, source: &str, target: &str) -> Result<MergeReport> {
        require_non_empty("source_branch", source)?;
        require_non_empty("target_branch", target)?;
        Ok(self.coordination.merge_branch(source, target)?)
    }

    pub fn delete_branch(&self, name: &str) -> Result<()> {
        require_non_empty("branch_name", name)?;
        Ok(self.coordination.delete_branch(name)?)
    }

    pub fn list_branches(&self) -> Vec<String> {
        self.coordination.list_branches()
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn ensure_tracked(&self, session_id: &str) -> Result<()> {
        require_non_empty("session_id", session_id)?;
        if self.workers.read().await.contains_key(session_id) {
            Ok(())
        } else {
            Err(OrchestratorError::WorkerNotFound(session_id.to_string()))
        }
    }

    async fn touch(&self, session_id: &str) {
        if let Some(worker) = self.workers.write().await.get_mut(session_id) {
            worker.touch();
        }
    }
}
