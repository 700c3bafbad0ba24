// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shell commands and their JSON payloads.
//!
//! Every successful command yields an object with `"status": "success"`.
//! Failures are returned as errors and rendered by the shell.

use std::collections::BTreeMap;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use crate::coordination::MAIN_BRANCH;
use crate::orchestrate::{
    RoleRequest, WorkerOrchestrator, DEFAULT_ACTIVITY_LIMIT, DEFAULT_STREAM_ACTIVITIES,
};

/// One parsed shell line.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, name = "maestro", disable_version_flag = true)]
pub struct ReplLine {
    #[command(subcommand)]
    pub command: ReplCommand,
}

/// Commands available in the shell.
#[derive(Debug, Subcommand, PartialEq)]
pub enum ReplCommand {
    /// Create a worker session under a role
    #[command(name = "create-worker")]
    CreateWorker {
        #[arg(long)]
        task: String,
        /// Source identifier, e.g. sources/github/owner/repo
        #[arg(long)]
        source: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = MAIN_BRANCH)]
        branch: String,
        /// MAESTRO, CREW, FREELANCER or EVALUATOR
        #[arg(long, default_value = "FREELANCER")]
        role: String,
        /// Parent session id (CREW only)
        #[arg(long)]
        parent: Option<String>,
    },

    /// Send a follow-up message to a worker
    #[command(name = "send-message")]
    SendMessage { session_id: String, message: String },

    /// Show recent activities of a worker
    Activities {
        session_id: String,
        #[arg(long, default_value_t = DEFAULT_ACTIVITY_LIMIT)]
        limit: u32,
    },

    /// Collect activities across pages
    #[command(name = "stream-activities")]
    StreamActivities {
        session_id: String,
        #[arg(long, default_value_t = DEFAULT_STREAM_ACTIVITIES)]
        max: u32,
    },

    /// Show a worker's status
    Status { session_id: String },

    /// Delete a worker
    #[command(name = "delete-worker")]
    DeleteWorker { session_id: String },

    /// List tracked workers
    Workers,

    /// List available sources
    Sources,

    /// Start an estimation worker
    Estimate {
        #[arg(long)]
        task: String,
        #[arg(long)]
        source: String,
    },

    /// Start a code generation worker
    Generate {
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        source: String,
        #[arg(long, default_value = "typescript")]
        language: String,
        /// Extra context as key=value (repeatable)
        #[arg(long = "context", value_parser = parse_key_val)]
        context: Vec<(String, String)>,
    },

    /// Start a bug fix worker
    #[command(name = "fix-bug")]
    FixBug {
        #[arg(long)]
        source: String,
        #[arg(long)]
        error: String,
        #[arg(long)]
        expected: String,
        #[arg(long)]
        code: Option<String>,
    },

    /// Start a code review worker
    Review {
        #[arg(long)]
        source: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        language: String,
        /// Review focus (repeatable)
        #[arg(long = "focus")]
        focus: Vec<String>,
    },

    /// Store a shared memory entry
    #[command(name = "memory-store")]
    MemoryStore { key: String, value: String },

    /// Read a shared memory entry
    #[command(name = "memory-read")]
    MemoryRead { key: String },

    /// List shared memory keys
    #[command(name = "memory-keys")]
    MemoryKeys,

    /// Create a coordination branch
    #[command(name = "branch-create")]
    BranchCreate {
        name: String,
        #[arg(long, default_value = MAIN_BRANCH)]
        base: String,
    },

    /// Merge one coordination branch into another
    #[command(name = "branch-merge")]
    BranchMerge { source: String, target: String },

    /// Delete a coordination branch
    #[command(name = "branch-delete")]
    BranchDelete { name: String },

    /// List coordination branches
    Branches,

    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.trim().to_string(), value.to_string()))
}

/// Tokenise a shell line and parse it into a command.
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> anyhow::Result<Option<ReplCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let tokens = shlex::split(line).context("Unbalanced quotes in input")?;
    let parsed = ReplLine::try_parse_from(tokens)?;
    Ok(Some(parsed.command))
}

fn success(mut payload: Value) -> Value {
    if let Value::Object(map) = &mut payload {
        map.insert("status".to_string(), json!("success"));
    }
    payload
}

/// Run a command against the orchestrator and build its JSON payload.
///
/// [`ReplCommand::Exit`] is handled by the shell and yields an empty payload here.
pub async fn execute(orchestrator: &WorkerOrchestrator, command: ReplCommand) -> anyhow::Result<Value> {
    let payload = match command {
        ReplCommand::CreateWorker {
            task,
            source,
            title,
            branch,
            role,
            parent,
        } => {
            let mut request = RoleRequest::new(task, source, title)
                .with_branch(branch)
                .with_role(role);
            request.parent_session_id = parent;
            let session_id = orchestrator.create_worker(request).await?;
            let worker = orchestrator.worker(&session_id).await;
            let role = worker.as_ref().map(|w| w.role.as_str()).unwrap_or_default();
            json!({
                "session_id": session_id,
                "message": format!("Worker created successfully. Role: {}. Session ID: {}", role, session_id),
                "worker": worker,
            })
        }
        ReplCommand::SendMessage { session_id, message } => {
            orchestrator.send_message(&session_id, &message).await?;
            json!({ "message": format!("Message sent to {}", session_id) })
        }
        ReplCommand::Activities { session_id, limit } => {
            let activities = orchestrator.get_activities(&session_id, limit).await?;
            json!({ "count": activities.len(), "activities": activities })
        }
        ReplCommand::StreamActivities { session_id, max } => {
            let activities = orchestrator.stream_activities(&session_id, max).await?;
            json!({ "count": activities.len(), "activities": activities })
        }
        ReplCommand::Status { session_id } => {
            let worker = orchestrator
                .get_worker_status(&session_id)
                .await
                .with_context(|| format!("Worker not found: {}", session_id))?;
            json!({ "worker": worker })
        }
        ReplCommand::DeleteWorker { session_id } => {
            orchestrator.delete_worker(&session_id).await?;
            json!({ "message": format!("Worker {} deleted", session_id) })
        }
        ReplCommand::Workers => {
            let workers = orchestrator.list_workers().await;
            json!({ "count": workers.len(), "workers": workers })
        }
        ReplCommand::Sources => {
            let sources = orchestrator.list_sources().await?;
            json!({ "count": sources.len(), "sources": sources })
        }
        ReplCommand::Estimate { task, source } => {
            let result = orchestrator.estimate_work(&task, &source).await?;
            serde_json::to_value(result)?
        }
        ReplCommand::Generate {
            prompt,
            source,
            language,
            context,
        } => {
            let context: BTreeMap<String, String> = context.into_iter().collect();
            let session_id = orchestrator
                .generate_code(&prompt, &source, &language, Some(&context))
                .await?;
            json!({ "session_id": session_id, "message": "Code generation worker created" })
        }
        ReplCommand::FixBug {
            source,
            error,
            expected,
            code,
        } => {
            let session_id = orchestrator
                .fix_bug(&source, &error, &expected, code.as_deref())
                .await?;
            json!({ "session_id": session_id, "message": "Bug fix worker created" })
        }
        ReplCommand::Review {
            source,
            code,
            language,
            focus,
        } => {
            let session_id = orchestrator.review_code(&source, &code, &language, &focus).await?;
            json!({ "session_id": session_id, "message": "Code review worker created" })
        }
        ReplCommand::MemoryStore { key, value } => {
            orchestrator.store_memory(&key, &value)?;
            json!({ "message": format!("Stored value for key: {}", key) })
        }
        ReplCommand::MemoryRead { key } => {
            let value = orchestrator.read_memory(&key)?;
            json!({ "key": key, "found": value.is_some(), "value": value })
        }
        ReplCommand::MemoryKeys => {
            let keys = orchestrator.list_memory_keys();
            json!({ "count": keys.len(), "keys": keys })
        }
        ReplCommand::BranchCreate { name, base } => {
            orchestrator.create_branch(&name, Some(&base))?;
            json!({ "message": format!("Branch '{}' created from '{}'", name, base) })
        }
        ReplCommand::BranchMerge { source, target } => {
            let report = orchestrator.merge_branch(&source, &target)?;
            json!({
                "message": format!("Branch '{}' merged into '{}'", report.source, report.target),
                "merge": report,
            })
        }
        ReplCommand::BranchDelete { name } => {
            orchestrator.delete_branch(&name)?;
            json!({ "message": format!("Branch '{}' deleted", name) })
        }
        ReplCommand::Branches => {
            let branches = orchestrator.list_branches();
            json!({ "count": branches.len(), "branches": branches })
        }
        ReplCommand::Exit => return Ok(Value::Null),
    };
    Ok(success(payload))
}
