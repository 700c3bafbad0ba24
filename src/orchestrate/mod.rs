// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Worker orchestration.
//!
//! Workers are remote sessions started with a role-specific instruction block
//! prepended to their task. The [`WorkerOrchestrator`] tracks them locally,
//! retries creation, and exposes the coordination store.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use maestro::orchestrate::{RoleRequest, WorkerOrchestrator};
//! use maestro::remote::JulesClient;
//!
//! let client = JulesClient::from_config(&config)?;
//! let orchestrator = WorkerOrchestrator::from_config(Arc::new(client), &config);
//!
//! let maestro_id = orchestrator
//!     .create_worker(
//!         RoleRequest::new("Ship the auth rewrite", "sources/github/acme/api", "Auth rewrite")
//!             .with_role("MAESTRO"),
//!     )
//!     .await?;
//!
//! let crew_id = orchestrator
//!     .create_worker(
//!         RoleRequest::new("Port the token store", "sources/github/acme/api", "Token store")
//!             .with_branch("crew/token-store")
//!             .with_role("CREW")
//!             .with_parent(&maestro_id),
//!     )
//!     .await?;
//! ```

pub mod orchestrator;
pub mod retry;
pub mod source;
pub mod templates;
pub mod types;

pub use orchestrator::WorkerOrchestrator;
pub use retry::{RetryPolicy, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS};
pub use source::SourceRef;
pub use types::{
    EstimateResult, RoleRequest, WorkerSession, DEFAULT_ACTIVITY_LIMIT, DEFAULT_STATUS,
    DEFAULT_STREAM_ACTIVITIES, MAX_ACTIVITY_LIMIT, MAX_STREAM_ACTIVITIES,
};
