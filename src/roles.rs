// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Worker roles and the instruction blocks prepended to every task.

use serde::{Deserialize, Serialize};

/// Placeholder in the Crew template that receives the Maestro's session id.
pub const PARENT_ID_PLACEHOLDER: &str = "{parent_id}";

const MAESTRO_TEMPLATE: &str = "
[SYSTEM: ROLE INSTRUCTIONS]
You are a MAESTRO.
Your goal is to plan, prioritize, and manage the execution of a complex task.

**ORCHESTRATION PROTOCOL (CRITICAL):**
1. **Analyze Dependencies**: Identify independent vs. dependent subtasks.
2. **Group & Sequence**: Create a staged execution plan.
3. **Branching Strategy**: Maintain integration branches and assign Crew branches.
4. **Execution Loop**: Create, spawn, wait, verify, and merge.

You must interface with the human user for major decisions.
";

const CREW_TEMPLATE: &str = "
[SYSTEM: ROLE INSTRUCTIONS]
You are a CREW member.
You report to a Maestro (Session ID: {parent_id}).
Your goal is to execute the specific task assigned to you.
You must report your progress and any blockers to the Maestro.
";

const EVALUATOR_TEMPLATE: &str = "
[SYSTEM: ROLE INSTRUCTIONS]
You are an EVALUATOR.
Your goal is to analyze the task and estimate the effort, complexity, and approach required.
Do not implement the solution yet. Provide a detailed estimation and risk assessment.
";

const FREELANCER_TEMPLATE: &str = "
[SYSTEM: ROLE INSTRUCTIONS]
You are a generic worker (Freelancer).
Execute the task as described.
";

/// Behavioral template assigned to a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Plans, sequences and merges the work of a crew.
    Maestro,
    /// Executes one subtask on behalf of a Maestro.
    Crew,
    /// Generic worker with no coordination duties.
    #[default]
    Freelancer,
    /// Estimates effort without implementing anything.
    Evaluator,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 4] = [Role::Maestro, Role::Crew, Role::Freelancer, Role::Evaluator];

    /// Resolve a caller-supplied role tag.
    ///
    /// Tags must match exactly; anything unrecognized becomes [`Role::Freelancer`].
    pub fn coerce(tag: &str) -> Self {
        match tag {
            "MAESTRO" => Self::Maestro,
            "CREW" => Self::Crew,
            "EVALUATOR" => Self::Evaluator,
            _ => Self::Freelancer,
        }
    }

    /// The canonical upper-case tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maestro => "MAESTRO",
            Self::Crew => "CREW",
            Self::Freelancer => "FREELANCER",
            Self::Evaluator => "EVALUATOR",
        }
    }

    /// The raw instruction template for this role.
    pub fn template(&self) -> &'static str {
        match self {
            Self::Maestro => MAESTRO_TEMPLATE,
            Self::Crew => CREW_TEMPLATE,
            Self::Freelancer => FREELANCER_TEMPLATE,
            Self::Evaluator => EVALUATOR_TEMPLATE,
        }
    }

    /// Build the instruction block for this role.
    ///
    /// A Crew block without a parent keeps the placeholder as-is.
    pub fn instructions(&self, parent_id: Option<&str>) -> String {
        match (self, parent_id) {
            (Self::Crew, Some(parent)) => self.template().replacen(PARENT_ID_PLACEHOLDER, parent, 1),
            _ => self.template().to_string(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compose the full outbound prompt: role block followed by the task text.
pub fn compose_prompt(role: Role, parent_id: Option<&str>, task: &str) -> String {
    format!("{}\n\n[TASK DESCRIPTION]\n{}", role.instructions(parent_id), task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_known_roles() {
        for role in Role::ALL {
            assert_eq!(Role::coerce(role.as_str()), role);
        }
    }

    #[test]
    fn test_coerce_unknown_roles_to_freelancer() {
        assert_eq!(Role::coerce("WIZARD"), Role::Freelancer);
        assert_eq!(Role::coerce(""), Role::Freelancer);
        assert_eq!(Role::coerce("maestro"), Role::Freelancer);
    }

    #[test]
    fn test_crew_prompt_substitutes_parent() {
        let prompt = compose_prompt(Role::Crew, Some("parent-1"), "fix the bug");
        assert!(prompt.contains("Session ID: parent-1"));
        assert!(prompt.contains("CREW"));
        assert!(!prompt.contains(PARENT_ID_PLACEHOLDER));
        assert!(prompt.ends_with("[TASK DESCRIPTION]\nfix the bug"));
    }

    #[test]
    fn test_crew_prompt_without_parent_keeps_placeholder() {
        let prompt = compose_prompt(Role::Crew, None, "task");
        assert!(prompt.contains(PARENT_ID_PLACEHOLDER));
    }

    #[test]
    fn test_parent_ignored_for_other_roles() {
        let prompt = compose_prompt(Role::Maestro, Some("parent-1"), "plan it");
        assert!(!prompt.contains("parent-1"));
        assert!(prompt.contains("You are a MAESTRO."));
    }

    #[test]
    fn test_evaluator_prompt_forbids_implementation() {
        let prompt = compose_prompt(Role::Evaluator, None, "estimate");
        assert!(prompt.contains("Do not implement the solution yet."));
    }

    #[test]
    fn test_role_serde_uppercase() {
        let json = serde_json::to_string(&Role::Evaluator).unwrap();
        assert_eq!(json, "\"EVALUATOR\"");
        let role: Role = serde_json::from_str("\"CREW\"").unwrap();
        assert_eq!(role, Role::Crew);
    }
}
