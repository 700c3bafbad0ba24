// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Interactive command surface over a long-lived orchestrator.

pub mod commands;
pub mod shell;

pub use commands::{execute, parse_line, ReplCommand, ReplLine};
pub use shell::run_shell;
