// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Canonical records returned by a session client, and the raw wire shapes
//! they are normalized from.
//!
//! The remote API is loose about field naming (`createTime` vs `create_time`,
//! `sessionId` vs `name`), so every response is converted into one of the
//! records below as soon as it is received.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

// ============================================================================
// Canonical records
// ============================================================================

/// Parameters for creating a remote session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionRequest {
    /// Full prompt, including the role instructions.
    pub prompt: String,
    /// Source identifier (`sources/github/{owner}/{repo}`).
    pub source: String,
    /// Human-readable title.
    pub title: String,
    /// Starting branch for the session.
    pub branch: String,
}

/// Identity and state of a remote session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// One entry of a session's activity history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub originator: String,
    pub create_time: String,
    pub title: String,
    pub description: String,
}

/// A page of activities plus the token for the next page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPage {
    pub activities: Vec<ActivityInfo>,
    pub next_page_token: Option<String>,
}

/// A repository the remote service can work on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    /// Resource name, e.g. `sources/github/acme/widgets`.
    pub name: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

// ============================================================================
// Wire shapes
// ============================================================================

/// Session payload as returned by the API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSession {
    #[serde(alias = "session_id")]
    session_id: Option<String>,
    id: Option<String>,
    name: Option<String>,
    status: Option<String>,
    state: Option<String>,
    title: Option<String>,
}

/// Treat an empty string the same as a missing field.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Last path segment of a resource name such as `sessions/abc`.
fn name_tail(name: Option<&str>) -> Option<String> {
    name.and_then(|name| name.rsplit('/').next())
        .filter(|tail| !tail.is_empty())
        .map(str::to_string)
}

impl RawSession {
    /// Resolve the session id, falling back to the last segment of `name`.
    fn resolve_id(&self) -> Option<String> {
        non_empty(self.session_id.clone())
            .or_else(|| non_empty(self.id.clone()))
            .or_else(|| name_tail(self.name.as_deref()))
    }

    /// Convert a payload that must identify its session.
    pub(crate) fn into_info(self) -> Result<SessionInfo, RemoteError> {
        let session_id = self.resolve_id().ok_or(RemoteError::MissingSessionId)?;
        Ok(self.with_id(session_id))
    }

    /// Convert a payload fetched for `requested_id`; a body without an id belongs to it.
    pub(crate) fn into_info_for(self, requested_id: &str) -> SessionInfo {
        let session_id = self.resolve_id().unwrap_or_else(|| requested_id.to_string());
        self.with_id(session_id)
    }

    fn with_id(self, session_id: String) -> SessionInfo {
        SessionInfo {
            session_id,
            status: non_empty(self.status).or_else(|| non_empty(self.state)),
            title: self.title,
        }
    }
}

/// Event members the API uses to encode an activity's kind.
const ACTIVITY_EVENT_KEYS: &[&str] = &[
    "agentMessaged",
    "userMessaged",
    "planGenerated",
    "planApproved",
    "progressUpdated",
    "sessionCompleted",
    "sessionFailed",
];

/// Activity payload as returned by the API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawActivity {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    originator: Option<String>,
    #[serde(alias = "create_time")]
    create_time: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl RawActivity {
    fn event(&self) -> Option<(&'static str, &serde_json::Value)> {
        ACTIVITY_EVENT_KEYS
            .iter()
            .find_map(|key| self.extra.get(*key).map(|value| (*key, value)))
    }

    fn event_field(&self, field: &str) -> Option<String> {
        self.event()
            .and_then(|(_, value)| value.get(field))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    pub(crate) fn into_info(self) -> ActivityInfo {
        let kind = non_empty(self.kind.clone())
            .or_else(|| self.event().map(|(key, _)| key.to_string()))
            .unwrap_or_else(|| "unknown".to_string());
        let title = self.title.clone().or_else(|| self.event_field("title"));
        let description = self
            .description
            .clone()
            .or_else(|| self.event_field("description"));
        let id = non_empty(self.id)
            .or_else(|| name_tail(self.name.as_deref()))
            .unwrap_or_default();

        ActivityInfo {
            id,
            kind,
            originator: non_empty(self.originator).unwrap_or_else(|| "system".to_string()),
            create_time: non_empty(self.create_time)
                .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
        }
    }
}

/// Response body of the activity listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawActivityPage {
    #[serde(default)]
    activities: Vec<RawActivity>,
    #[serde(alias = "next_page_token")]
    next_page_token: Option<String>,
}

impl RawActivityPage {
    pub(crate) fn into_page(self) -> ActivityPage {
        ActivityPage {
            activities: self.activities.into_iter().map(RawActivity::into_info).collect(),
            next_page_token: self.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawGithubRepo {
    owner: Option<String>,
    repo: Option<String>,
}

/// Source payload as returned by the API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSource {
    #[serde(default)]
    name: String,
    id: Option<String>,
    #[serde(alias = "github_repo")]
    github_repo: Option<RawGithubRepo>,
}

impl RawSource {
    pub(crate) fn into_info(self) -> SourceInfo {
        let id = self
            .id
            .unwrap_or_else(|| self.name.rsplit('/').next().unwrap_or_default().to_string());
        let (owner, repo) = match self.github_repo {
            Some(gh) => (gh.owner, gh.repo),
            None => (None, None),
        };
        SourceInfo {
            name: self.name,
            id,
            owner,
            repo,
        }
    }
}

/// Response body of the source listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSourcePage {
    #[serde(default)]
    pub(crate) sources: Vec<RawSource>,
    #[serde(alias = "next_page_token")]
    pub(crate) next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(value: serde_json::Value) -> RawSession {
        serde_json::from_value(value).unwrap()
    }

    fn activity(value: serde_json::Value) -> ActivityInfo {
        serde_json::from_value::<RawActivity>(value).unwrap().into_info()
    }

    #[test]
    fn test_session_id_from_name() {
        let info = session(json!({"name": "sessions/abc123", "state": "QUEUED"}))
            .into_info()
            .unwrap();
        assert_eq!(info.session_id, "abc123");
        assert_eq!(info.status.as_deref(), Some("QUEUED"));
    }

    #[test]
    fn test_session_id_field_variants() {
        let camel = session(json!({"sessionId": "s1"})).into_info().unwrap();
        let snake = session(json!({"session_id": "s2"})).into_info().unwrap();
        let plain = session(json!({"id": "s3", "status": "active"})).into_info().unwrap();
        assert_eq!(camel.session_id, "s1");
        assert_eq!(snake.session_id, "s2");
        assert_eq!(plain.session_id, "s3");
        assert_eq!(plain.status.as_deref(), Some("active"));
    }

    #[test]
    fn test_session_without_id_is_error() {
        let result = session(json!({"status": "created"})).into_info();
        assert!(matches!(result, Err(RemoteError::MissingSessionId)));
    }

    #[test]
    fn test_empty_session_id_falls_back_to_name() {
        let info = session(json!({"sessionId": "", "id": "", "name": "sessions/abc"}))
            .into_info()
            .unwrap();
        assert_eq!(info.session_id, "abc");
    }

    #[test]
    fn test_requested_id_keeps_state() {
        let info = session(json!({"state": "COMPLETED"})).into_info_for("s1");
        assert_eq!(info.session_id, "s1");
        assert_eq!(info.status.as_deref(), Some("COMPLETED"));

        let named = session(json!({"name": "sessions/s2", "status": "", "state": "FAILED"})).into_info_for("s1");
        assert_eq!(named.session_id, "s2");
        assert_eq!(named.status.as_deref(), Some("FAILED"));
    }

    #[test]
    fn test_activity_empty_fields_use_defaults() {
        let info = activity(json!({"id": "", "name": "sessions/s1/activities/a7", "type": "", "originator": "", "createTime": ""}));
        assert_eq!(info.id, "a7");
        assert_eq!(info.kind, "unknown");
        assert_eq!(info.originator, "system");
        assert!(!info.create_time.is_empty());
    }

    #[test]
    fn test_activity_create_time_variants() {
        let camel = activity(json!({"id": "a1", "createTime": "2026-01-01T00:00:00Z"}));
        let snake = activity(json!({"id": "a2", "create_time": "2026-01-02T00:00:00Z"}));
        assert_eq!(camel.create_time, "2026-01-01T00:00:00Z");
        assert_eq!(snake.create_time, "2026-01-02T00:00:00Z");
    }

    #[test]
    fn test_activity_defaults() {
        let info = activity(json!({}));
        assert_eq!(info.id, "");
        assert_eq!(info.kind, "unknown");
        assert_eq!(info.originator, "system");
        assert_eq!(info.title, "");
        assert_eq!(info.description, "");
        assert!(!info.create_time.is_empty());
    }

    #[test]
    fn test_activity_kind_from_event_member() {
        let info = activity(json!({
            "name": "sessions/s1/activities/act-9",
            "originator": "agent",
            "progressUpdated": {"title": "Running tests", "description": "cargo test"}
        }));
        assert_eq!(info.id, "act-9");
        assert_eq!(info.kind, "progressUpdated");
        assert_eq!(info.originator, "agent");
        assert_eq!(info.title, "Running tests");
        assert_eq!(info.description, "cargo test");
    }

    #[test]
    fn test_activity_explicit_type_wins() {
        let info = activity(json!({"type": "message", "planGenerated": {}}));
        assert_eq!(info.kind, "message");
    }

    #[test]
    fn test_source_from_github_repo() {
        let raw: RawSource = serde_json::from_value(json!({
            "name": "sources/github/acme/widgets",
            "githubRepo": {"owner": "acme", "repo": "widgets"}
        }))
        .unwrap();
        let info = raw.into_info();
        assert_eq!(info.id, "widgets");
        assert_eq!(info.owner.as_deref(), Some("acme"));
        assert_eq!(info.repo.as_deref(), Some("widgets"));
    }

    #[test]
    fn test_activity_serializes_camel_case() {
        let info = activity(json!({"id": "a", "type": "t", "createTime": "now"}));
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["type"], "t");
        assert_eq!(value["createTime"], "now");
    }
}
