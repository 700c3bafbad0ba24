// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Task prompts and titles for the convenience worker operations.

use std::collections::BTreeMap;

/// Maximum number of characters of free text carried into a title.
pub const TITLE_PREFIX_CHARS: usize = 50;

/// Focus areas used when a review request names none.
pub const DEFAULT_REVIEW_FOCUS: &[&str] = &["security", "quality"];

/// Title used for estimation workers.
pub const ESTIMATION_TITLE: &str = "Task Estimation";

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate_title(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

pub fn estimation_prompt(task: &str) -> String {
    format!(
        "Analyze and estimate the following task. Provide effort estimation, complexity assessment, and recommended approach:\n\n{}",
        task
    )
}

pub fn generation_title(prompt: &str) -> String {
    format!("Code Generation: {}", truncate_title(prompt, TITLE_PREFIX_CHARS))
}

/// Prompt for a code generation worker. Context entries are listed in key order.
pub fn generation_prompt(prompt: &str, language: &str, context: Option<&BTreeMap<String, String>>) -> String {
    let mut out = format!("Generate {} code for the following requirements:\n\n{}\n", language, prompt);

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        out.push_str("\nContext:\n");
        for (key, value) in context {
            out.push_str(&format!("- {}: {}\n", key, value));
        }
    }

    out.push_str(&format!(
        "\nRequirements:\n\
         - Follow best practices for {}\n\
         - Include proper error handling\n\
         - Add inline documentation\n\
         - Make the code production-ready",
        language
    ));
    out
}

pub fn bug_fix_title(error_description: &str) -> String {
    format!("Bug Fix: {}", truncate_title(error_description, TITLE_PREFIX_CHARS))
}

pub fn bug_fix_prompt(error_description: &str, expected_behavior: &str, code_context: Option<&str>) -> String {
    let mut out = format!(
        "Fix the following bug:\n\nError Description: {}\n\nExpected Behavior: {}\n",
        error_description, expected_behavior
    );

    if let Some(code) = code_context.filter(|c| !c.trim().is_empty()) {
        out.push_str(&format!("\nCode Context:\n```\n{}\n```\n", code));
    }

    out.push_str(
        "\nRequirements:\n\
         - Identify the root cause\n\
         - Implement a fix\n\
         - Ensure no regression\n\
         - Add tests for the fix",
    );
    out
}

pub fn review_title(language: &str) -> String {
    format!("Code Review: {}", language)
}

/// Prompt for a review worker. An empty focus list falls back to [`DEFAULT_REVIEW_FOCUS`].
pub fn review_prompt(code: &str, language: &str, focus_areas: &[String]) -> String {
    let focus = if focus_areas.is_empty() {
        DEFAULT_REVIEW_FOCUS.join(", ")
    } else {
        focus_areas.join(", ")
    };

    format!(
        "Review the following {language} code:\n\n```{language}\n{code}\n```\n\n\
         Focus Areas: {focus}\n\n\
         Provide assessment on:\n\
         - Code quality and maintainability\n\
         - Security vulnerabilities\n\
         - Performance considerations\n\
         - Best practices adherence\n\
         - Suggested improvements"
    )
}
