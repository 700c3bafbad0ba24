// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Records tracked and returned by the orchestrator.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::roles::Role;

/// Status recorded when the service reports none.
pub const DEFAULT_STATUS: &str = "created";

/// Maximum activities returned by a single listing.
pub const MAX_ACTIVITY_LIMIT: u32 = 100;

/// Default activities returned by a listing.
pub const DEFAULT_ACTIVITY_LIMIT: u32 = 10;

/// Maximum activities collected by a streaming read.
pub const MAX_STREAM_ACTIVITIES: u32 = 200;

/// Default activities collected by a streaming read.
pub const DEFAULT_STREAM_ACTIVITIES: u32 = 50;

/// Local view of one remote worker session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSession {
    /// Identifier assigned by the remote service.
    pub session_id: String,
    pub title: String,
    pub role: Role,
    /// Set only for Crew workers created with an explicit parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_session_id: Option<String>,
    /// Mirrored from the remote service; never interpreted locally.
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}

impl WorkerSession {
    pub fn new(
        session_id: impl Into<String>,
        title: impl Into<String>,
        role: Role,
        parent_session_id: Option<String>,
        status: Option<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            title: title.into(),
            role,
            parent_session_id,
            status: status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            created_at: Utc::now(),
            last_activity: None,
        }
    }

    /// Record a successful interaction.
    pub fn touch(&mut self) {
        self.last_activity = Some(Utc::now());
    }
}

/// Parameters for creating a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRequest {
    pub task: String,
    pub source: String,
    pub title: String,
    pub branch: String,
    /// Raw role tag; unrecognized tags become Freelancer.
    pub role: String,
    pub parent_session_id: Option<String>,
}

impl RoleRequest {
    /// A Freelancer request on `main`.
    pub fn new(task: impl Into<String>, source: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            source: source.into(),
            title: title.into(),
            branch: crate::coordination::MAIN_BRANCH.to_string(),
            role: Role::Freelancer.as_str().to_string(),
            parent_session_id: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_parent(mut self, parent_session_id: impl Into<String>) -> Self {
        self.parent_session_id = Some(parent_session_id.into());
        self
    }
}

/// Result of an estimation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResult {
    pub session_id: String,
    pub estimation_type: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_session_defaults() {
        let session = WorkerSession::new("s1", "Title", Role::Crew, Some("p1".to_string()), None);
        assert_eq!(session.status, "created");
        assert!(session.last_activity.is_none());

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["role"], "CREW");
        assert_eq!(json["parentSessionId"], "p1");
        assert!(json.get("lastActivity").is_none());
    }

    #[test]
    fn test_touch_sets_last_activity() {
        let mut session = WorkerSession::new("s1", "T", Role::Freelancer, None, Some("QUEUED".to_string()));
        assert_eq!(session.status, "QUEUED");
        session.touch();
        assert!(session.last_activity.unwrap() >= session.created_at);
    }

    #[test]
    fn test_role_request_builder() {
        let request = RoleRequest::new("task", "sources/github/a/b", "T")
            .with_branch("feature")
            .with_role("CREW")
            .with_parent("p");
        assert_eq!(request.branch, "feature");
        assert_eq!(request.role, "CREW");
        assert_eq!(request.parent_session_id.as_deref(), Some("p"));
        assert_eq!(RoleRequest::new("t", "s", "x").role, "FREELANCER");
    }
}
