// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Maestro - role-based orchestration of remote coding workers.
//!
//! Workers are sessions on a remote task-execution service (Jules). Each is
//! started with a role instruction block prepended to its task, and tracked
//! locally so follow-up messages, activity reads and deletion can be routed.
//!
//! # Architecture
//!
//! - [`error`] - Error types per layer
//! - [`roles`] - Role tags and prompt composition
//! - [`remote`] - Session client trait and the Jules REST client
//! - [`coordination`] - Shared memory and nominal branch namespace
//! - [`orchestrate`] - Worker registry, retry policy and convenience workers
//! - [`config`] - Configuration loading and merging
//! - [`telemetry`] - Structured logging setup
//! - [`cli`] - Interactive shell commands
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use maestro::config::{load_config, CliOptions};
//! use maestro::orchestrate::{RoleRequest, WorkerOrchestrator};
//! use maestro::remote::JulesClient;
//!
//! let config = load_config(".".as_ref(), CliOptions::default())?;
//! let client = JulesClient::from_config(&config)?;
//! let orchestrator = WorkerOrchestrator::from_config(Arc::new(client), &config);
//!
//! let id = orchestrator
//!     .create_worker(RoleRequest::new("Add pagination", "sources/github/acme/api", "Pagination"))
//!     .await?;
//! ```

pub mod cli;
pub mod config;
pub mod coordination;
pub mod error;
pub mod orchestrate;
pub mod remote;
pub mod roles;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use coordination::{CoordinationStore, MergeReport};
pub use error::{ConfigError, CoordinationError, OrchestratorError, RemoteError, Result};
pub use orchestrate::{RetryPolicy, RoleRequest, WorkerOrchestrator, WorkerSession};
pub use remote::{JulesClient, SessionClient, SharedSessionClient};
pub use roles::{compose_prompt, Role};

/// Maestro version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
