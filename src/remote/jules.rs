// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Jules REST API session client.
//!
//! This module provides a [`SessionClient`] implementation backed by the
//! Jules API (`https://jules.googleapis.com/v1alpha`).
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |---|---|
//! | create | `POST /sessions` |
//! | get | `GET /sessions/{id}` |
//! | message | `POST /sessions/{id}:sendMessage` |
//! | activities | `GET /sessions/{id}/activities?pageSize=N` |
//! | sources | `GET /sources` |
//! | delete | `DELETE /sessions/{id}` |
//!
//! Every non-2xx response is mapped onto a [`RemoteError`] kind; transport
//! failures become [`RemoteError::Network`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ResolvedConfig;
use crate::error::{ConfigError, RemoteError};

use super::types::{RawActivityPage, RawSession, RawSourcePage};
use super::{ActivityPage, CreateSessionRequest, SessionClient, SessionInfo, SourceInfo};

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://jules.googleapis.com";

/// Default API version path segment.
pub const DEFAULT_API_VERSION: &str = "v1alpha";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Upper bound on source pages followed in one listing.
const MAX_SOURCE_PAGES: usize = 50;

/// Jules API client.
pub struct JulesClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for JulesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JulesClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl JulesClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Jules API key
    /// * `base_url` - API host, e.g. `https://jules.googleapis.com`
    /// * `api_version` - Version path segment, e.g. `v1alpha`
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        api_version: &str,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                api_version.trim_matches('/')
            ),
        })
    }

    /// Create a client from resolved configuration.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingField("apiKey (or JULES_API_KEY)".to_string()))?;

        Self::new(
            api_key,
            &config.base_url,
            &config.api_version,
            Duration::from_millis(config.timeout_ms),
        )
        .map_err(|e| ConfigError::InvalidValue {
            field: "baseUrl".to_string(),
            message: e.to_string(),
        })
    }

    /// The versioned base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and map failures onto [`RemoteError`].
    async fn execute(&self, request: RequestBuilder, resource: &str) -> Result<Response, RemoteError> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        debug!(resource, status = status.as_u16(), "Jules API response");
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!(resource, error = %err, "Failed to read error response body");
                String::new()
            }
        };
        Err(classify_error(status.as_u16(), &body, resource))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SessionClient for JulesClient {
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<SessionInfo, RemoteError> {
        let body = CreateSessionBody {
            prompt: &request.prompt,
            source_context: SourceContext {
                source: &request.source,
                github_repo_context: GithubRepoContext {
                    starting_branch: &request.branch,
                },
            },
            title: &request.title,
        };

        let response = self
            .execute(self.client.post(self.url("sessions")).json(&body), "sessions")
            .await?;
        Self::decode::<RawSession>(response).await?.into_info()
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionInfo, RemoteError> {
        let resource = format!("sessions/{}", session_id);
        let response = self.execute(self.client.get(self.url(&resource)), &resource).await?;
        Ok(Self::decode::<RawSession>(response).await?.into_info_for(session_id))
    }

    async fn send_message(&self, session_id: &str, text: &str) -> Result<(), RemoteError> {
        let resource = format!("sessions/{}", session_id);
        let url = self.url(&format!("{}:sendMessage", resource));
        self.execute(self.client.post(url).json(&MessageBody { prompt: text }), &resource)
            .await?;
        Ok(())
    }

    async fn list_activities_page(
        &self,
        session_id: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<ActivityPage, RemoteError> {
        let resource = format!("sessions/{}", session_id);
        let mut request = self
            .client
            .get(self.url(&format!("{}/activities", resource)))
            .query(&[("pageSize", page_size.to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = self.execute(request, &resource).await?;
        Ok(Self::decode::<RawActivityPage>(response).await?.into_page())
    }

    async fn list_sources(&self) -> Result<Vec<SourceInfo>, RemoteError> {
        let mut sources = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_SOURCE_PAGES {
            let mut request = self.client.get(self.url("sources"));
            if let Some(token) = page_token.take() {
                request = request.query(&[("pageToken", token)]);
            }

            let response = self.execute(request, "sources").await?;
            let page = Self::decode::<RawSourcePage>(response).await?;
            sources.extend(page.sources.into_iter().map(|s| s.into_info()));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(sources),
            }
        }

        warn!(
            pages = MAX_SOURCE_PAGES,
            count = sources.len(),
            "Source listing hit the page limit; returning a partial list"
        );

        Ok(sources)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), RemoteError> {
        let resource = format!("sessions/{}", session_id);
        self.execute(self.client.delete(self.url(&resource)), &resource)
            .await?;
        Ok(())
    }
}

// ============================================================================
// Error mapping
// ============================================================================

/// Google-style error envelope.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Pull a readable message out of an error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) if !err.error.message.is_empty() => err.error.message,
        _ => body.trim().to_string(),
    }
}

/// Map an HTTP failure onto a [`RemoteError`] kind.
fn classify_error(status: u16, body: &str, resource: &str) -> RemoteError {
    match status {
        401 | 403 => RemoteError::Auth(format!(
            "Invalid API key. Please check your JULES_API_KEY environment variable. ({})",
            error_message(body)
        )),
        404 => RemoteError::NotFound(resource.to_string()),
        429 => RemoteError::RateLimited(error_message(body)),
        s if s >= 500 => RemoteError::ServiceUnavailable {
            status: s,
            message: error_message(body),
        },
        s => RemoteError::request(s, body.to_string()),
    }
}

fn map_transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Network(format!("request timed out: {}", err))
    } else if err.is_connect() {
        RemoteError::Network(format!(
            "cannot connect to Jules API, check your network connection: {}",
            err
        ))
    } else {
        RemoteError::Network(err.to_string())
    }
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionBody<'a> {
    prompt: &'a str,
    source_context: SourceContext<'a>,
    title: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceContext<'a> {
    source: &'a str,
    github_repo_context: GithubRepoContext<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GithubRepoContext<'a> {
    starting_branch: &'a str,
}

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    prompt: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> JulesClient {
        JulesClient::new("test-key", &server.uri(), "v1alpha", Duration::from_secs(5)).unwrap()
    }

    fn request() -> CreateSessionRequest {
        CreateSessionRequest {
            prompt: "do the thing".to_string(),
            source: "sources/github/acme/widgets".to_string(),
            title: "Thing".to_string(),
            branch: "main".to_string(),
        }
    }

    #[test]
    fn test_classify_error() {
        assert!(matches!(classify_error(401, "", "sessions"), RemoteError::Auth(_)));
        assert!(matches!(classify_error(403, "", "sessions"), RemoteError::Auth(_)));
        assert!(matches!(classify_error(429, "", "sessions"), RemoteError::RateLimited(_)));
        assert!(matches!(
            classify_error(503, "", "sessions"),
            RemoteError::ServiceUnavailable { status: 503, .. }
        ));
        assert!(matches!(classify_error(404, "", "sessions/x"), RemoteError::NotFound(_)));
        match classify_error(400, "bad source", "sessions") {
            RemoteError::Request { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad source");
            }
            other => panic!("Expected Request error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(error_message(body), "Quota exceeded");
        assert_eq!(error_message("  plain text "), "plain text");
    }

    #[test]
    fn test_base_url_joins_version() {
        let client = JulesClient::new("k", "https://example.com/", "/v1alpha/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://example.com/v1alpha");
        assert_eq!(client.url("/sessions"), "https://example.com/v1alpha/sessions");
    }

    #[tokio::test]
    async fn test_create_session_sends_body_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1alpha/sessions"))
            .and(header("X-Goog-Api-Key", "test-key"))
            .and(body_partial_json(json!({
                "prompt": "do the thing",
                "title": "Thing",
                "sourceContext": {
                    "source": "sources/github/acme/widgets",
                    "githubRepoContext": {"startingBranch": "main"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "sessions/123",
                "state": "QUEUED"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let info = client_for(&server).await.create_session(&request()).await.unwrap();
        assert_eq!(info.session_id, "123");
        assert_eq!(info.status.as_deref(), Some("QUEUED"));
    }

    #[tokio::test]
    async fn test_create_session_without_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1alpha/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "QUEUED"})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.create_session(&request()).await.unwrap_err();
        assert!(matches!(err, RemoteError::MissingSessionId));
    }

    #[tokio::test]
    async fn test_create_session_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1alpha/sessions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.create_session(&request()).await.unwrap_err();
        assert!(matches!(err, RemoteError::Auth(_)));
    }

    #[tokio::test]
    async fn test_get_session_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/sessions/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_session("missing").await.unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(ref r) if r == "sessions/missing"));
    }

    #[tokio::test]
    async fn test_get_session_state_only_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/sessions/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "COMPLETED"})))
            .mount(&server)
            .await;

        let info = client_for(&server).await.get_session("s1").await.unwrap();
        assert_eq!(info.session_id, "s1");
        assert_eq!(info.status.as_deref(), Some("COMPLETED"));
    }

    #[tokio::test]
    async fn test_send_message_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1alpha/sessions/s1:sendMessage"))
            .and(body_partial_json(json!({"prompt": "hello"})))
            .respond_with(ResponseTemplate::new(400).set_body_string("session is closed"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.send_message("s1", "hello").await.unwrap_err();
        match err {
            RemoteError::Request { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "session is closed");
            }
            other => panic!("Expected Request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_activities_truncates_to_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/sessions/s1/activities"))
            .and(query_param("pageSize", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "activities": [
                    {"id": "a1", "createTime": "2026-01-01T00:00:00Z", "originator": "agent"},
                    {"id": "a2", "create_time": "2026-01-02T00:00:00Z"},
                    {"id": "a3"}
                ],
                "nextPageToken": "next"
            })))
            .mount(&server)
            .await;

        let activities = client_for(&server).await.list_activities("s1", 2).await.unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].originator, "agent");
        assert_eq!(activities[1].create_time, "2026-01-02T00:00:00Z");
    }

    #[tokio::test]
    async fn test_list_sources_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/sources"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sources": [{"name": "sources/github/acme/gadgets"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/sources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sources": [{"name": "sources/github/acme/widgets", "id": "github/acme/widgets"}],
                "nextPageToken": "p2"
            })))
            .mount(&server)
            .await;

        let sources = client_for(&server).await.list_sources().await.unwrap();
        let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["sources/github/acme/widgets", "sources/github/acme/gadgets"]);
    }

    #[tokio::test]
    async fn test_list_sources_stops_at_page_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/sources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sources": [{"name": "sources/github/acme/widgets"}],
                "nextPageToken": "more"
            })))
            .expect(MAX_SOURCE_PAGES as u64)
            .mount(&server)
            .await;

        let sources = client_for(&server).await.list_sources().await.unwrap();
        assert_eq!(sources.len(), MAX_SOURCE_PAGES);
    }

    #[tokio::test]
    async fn test_empty_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/sessions/s1"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_session("s1").await.unwrap_err();
        assert!(matches!(
            err,
            RemoteError::ServiceUnavailable { status: 502, ref message } if message.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_delete_session_errors() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1alpha/sessions/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1alpha/sessions/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1alpha/sessions/ok"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(matches!(client.delete_session("gone").await, Err(RemoteError::NotFound(_))));
        assert!(matches!(
            client.delete_session("broken").await,
            Err(RemoteError::ServiceUnavailable { status: 500, .. })
        ));
        assert!(client.delete_session("ok").await.is_ok());
    }

    #[tokio::test]
    async fn test_network_error() {
        // Nothing listens on port 9 of the loopback interface.
        let client = JulesClient::new("k", "http://127.0.0.1:9", "v1alpha", Duration::from_secs(2)).unwrap();
        let err = client.get_session("s1").await.unwrap_err();
        assert!(matches!(err, RemoteError::Network(_)));
    }
}
