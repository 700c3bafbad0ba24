// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Line-oriented shell over one orchestrator instance.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use crate::config::get_global_config_path;
use crate::orchestrate::WorkerOrchestrator;

use super::commands::{execute, parse_line, ReplCommand};

const PROMPT: &str = "maestro> ";
const HISTORY_FILE: &str = "history";

/// Outcome of one shell line.
#[derive(Debug, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Exit,
}

/// Handle a single line: parse, execute, and print the result.
///
/// Errors are printed and never end the session.
pub async fn handle_line(orchestrator: &WorkerOrchestrator, line: &str) -> LineOutcome {
    let command = match parse_line(line) {
        Ok(Some(command)) => command,
        Ok(None) => return LineOutcome::Continue,
        Err(err) => {
            match err.downcast_ref::<clap::Error>() {
                Some(clap_err) => {
                    let _ = clap_err.print();
                }
                None => print_error(&err),
            }
            return LineOutcome::Continue;
        }
    };

    if command == ReplCommand::Exit {
        return LineOutcome::Exit;
    }

    match execute(orchestrator, command).await {
        Ok(payload) => match serde_json::to_string_pretty(&payload) {
            Ok(text) => println!("{}", text),
            Err(err) => print_error(&err.into()),
        },
        Err(err) => print_error(&err),
    }
    LineOutcome::Continue
}

fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);
}

/// Run the interactive shell until `exit`, Ctrl-D, or Ctrl-C.
pub async fn run_shell(orchestrator: &WorkerOrchestrator) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let history = get_global_config_path().and_then(|path| path.parent().map(|dir| dir.join(HISTORY_FILE)));
    if let Some(path) = &history {
        if editor.load_history(path).is_err() {
            debug!(path = %path.display(), "No shell history loaded");
        }
    }

    println!("{}", "Maestro worker shell. Type 'help' for commands, 'exit' to quit.".cyan());

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if handle_line(orchestrator, &line).await == LineOutcome::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(path) = &history {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(err) = editor.save_history(path) {
            debug!(error = %err, "Failed to save shell history");
        }
    }
    Ok(())
}
