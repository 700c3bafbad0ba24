// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Gateway to the remote task-execution service.
//!
//! The orchestrator only talks to the service through the [`SessionClient`]
//! trait, so tests can swap in a mock and alternative backends can be added
//! without touching orchestration logic.
//!
//! - [`jules::JulesClient`] - Jules REST API over HTTPS
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use maestro::remote::JulesClient;
//!
//! let client = JulesClient::from_config(&config)?;
//! let sources = client.list_sources().await?;
//! ```

pub mod jules;
mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RemoteError;

pub use jules::JulesClient;
pub use types::{ActivityInfo, ActivityPage, CreateSessionRequest, SessionInfo, SourceInfo};

/// Shared session client handle.
pub type SharedSessionClient = Arc<dyn SessionClient>;

/// Typed session operations exposed by the remote service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Create a session and return its identity.
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<SessionInfo, RemoteError>;

    /// Fetch the current state of a session.
    async fn get_session(&self, session_id: &str) -> Result<SessionInfo, RemoteError>;

    /// Send a follow-up message to a session.
    async fn send_message(&self, session_id: &str, text: &str) -> Result<(), RemoteError>;

    /// Fetch one page of a session's activity history.
    async fn list_activities_page(
        &self,
        session_id: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<ActivityPage, RemoteError>;

    /// List the repositories the service can work on.
    async fn list_sources(&self) -> Result<Vec<SourceInfo>, RemoteError>;

    /// Delete a session.
    async fn delete_session(&self, session_id: &str) -> Result<(), RemoteError>;

    /// Fetch at most `limit` activities from the first page.
    ///
    /// Ordering is whatever the service returns.
    async fn list_activities(&self, session_id: &str, limit: u32) -> Result<Vec<ActivityInfo>, RemoteError> {
        let mut page = self.list_activities_page(session_id, limit, None).await?;
        page.activities.truncate(limit as usize);
        Ok(page.activities)
    }
}
