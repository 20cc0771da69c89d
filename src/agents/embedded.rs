//! Embedded built-in agent definitions.
//!
//! This module contains the built-in agent templates compiled into the binary.
//! They form the registry that every composition starts from.
//!
//! The 7 built-in agents are:
//! - **orchestrator** (primary): autonomous coordinator, never edits files itself
//! - **cartographer** (primary): read-only planner, delegates only to read-only agents
//! - **explorer**: codebase search
//! - **librarian**: library and documentation research
//! - **oracle**: architecture and debugging advisor
//! - **designer**: UI/UX implementation
//! - **fixer**: implementation assistant (inherits the librarian's configured model)

use crate::agents::definitions::{
    AGENT_CARTOGRAPHER, AGENT_DESIGNER, AGENT_EXPLORER, AGENT_FIXER, AGENT_LIBRARIAN,
    AGENT_NAMES, AGENT_ORACLE, AGENT_ORCHESTRATOR, AgentSpec,
};
use crate::agents::permissions::RoleLock;

// Embedded prompt content (included at compile time)
const ORCHESTRATOR_PROMPT: &str = include_str!("embedded/orchestrator.md");
const CARTOGRAPHER_PROMPT: &str = include_str!("embedded/cartographer.md");
const EXPLORER_PROMPT: &str = include_str!("embedded/explorer.md");
const LIBRARIAN_PROMPT: &str = include_str!("embedded/librarian.md");
const ORACLE_PROMPT: &str = include_str!("embedded/oracle.md");
const DESIGNER_PROMPT: &str = include_str!("embedded/designer.md");
const FIXER_PROMPT: &str = include_str!("embedded/fixer.md");

/// Default model per built-in agent.
pub const DEFAULT_MODELS: &[(&str, &str)] = &[
    (AGENT_ORCHESTRATOR, "google/claude-opus-4-5-thinking"),
    (AGENT_CARTOGRAPHER, "google/claude-opus-4-5-thinking"),
    (AGENT_EXPLORER, "cerebras/zai-glm-4.6"),
    (AGENT_LIBRARIAN, "google/gemini-3-flash"),
    (AGENT_ORACLE, "openai/gpt-5.2-codex"),
    (AGENT_DESIGNER, "google/gemini-3-flash"),
    (AGENT_FIXER, "openai/gpt-5.1-codex-mini"),
];

/// Model-fallback dependencies: `(dependent, dependency)`.
///
/// A dependent with no model override of its own inherits the dependency's
/// model when that model was explicitly configured.
pub const MODEL_FALLBACKS: &[(&str, &str)] = &[(AGENT_FIXER, AGENT_LIBRARIAN)];

/// Read-only agents the cartographer may delegate to.
pub const CARTOGRAPHER_DELEGATES: &[&str] = &[AGENT_EXPLORER, AGENT_LIBRARIAN, AGENT_ORACLE];

/// Model used for custom agents that do not name one.
pub const CUSTOM_AGENT_MODEL: &str = "google/gemini-3-flash";

/// Temperature used for custom agents that do not set one.
pub const CUSTOM_AGENT_TEMPERATURE: f64 = 0.2;

/// Get the default model for a built-in agent.
pub fn default_model(name: &str) -> Option<&'static str> {
    DEFAULT_MODELS
        .iter()
        .find(|(agent, _)| *agent == name)
        .map(|(_, model)| *model)
}

/// Get an embedded agent by name.
pub fn get_embedded_agent(name: &str) -> Option<AgentSpec> {
    match name {
        AGENT_ORCHESTRATOR => Some(orchestrator_agent()),
        AGENT_CARTOGRAPHER => Some(cartographer_agent()),
        AGENT_EXPLORER => Some(explorer_agent()),
        AGENT_LIBRARIAN => Some(librarian_agent()),
        AGENT_ORACLE => Some(oracle_agent()),
        AGENT_DESIGNER => Some(designer_agent()),
        AGENT_FIXER => Some(fixer_agent()),
        _ => None,
    }
}

/// Get all embedded agents in canonical order.
pub fn get_all_embedded_agents() -> Vec<AgentSpec> {
    AGENT_NAMES
        .iter()
        .filter_map(|name| get_embedded_agent(name))
        .collect()
}

fn model_for(name: &str) -> &'static str {
    // Every built-in has a row in DEFAULT_MODELS; see test_every_agent_has_default_model
    default_model(name).unwrap_or(CUSTOM_AGENT_MODEL)
}

fn orchestrator_agent() -> AgentSpec {
    AgentSpec::new(
        AGENT_ORCHESTRATOR,
        "AI coding orchestrator that delegates tasks to specialist agents for optimal quality, speed, and cost",
        ORCHESTRATOR_PROMPT,
        model_for(AGENT_ORCHESTRATOR),
        0.1,
    )
    .primary()
    .with_lock(RoleLock::Autonomous)
}

fn cartographer_agent() -> AgentSpec {
    AgentSpec::new(
        AGENT_CARTOGRAPHER,
        "Planning specialist that explores codebases, asks clarifying questions, identifies edge cases, and creates detailed implementation plans (without code) for handoff to the orchestrator",
        CARTOGRAPHER_PROMPT,
        model_for(AGENT_CARTOGRAPHER),
        0.1,
    )
    .primary()
    .with_color("#16A34A")
    .with_lock(RoleLock::ReadOnlyPlanner {
        delegates: CARTOGRAPHER_DELEGATES
            .iter()
            .map(|name| name.to_string())
            .collect(),
    })
}

fn explorer_agent() -> AgentSpec {
    AgentSpec::new(
        AGENT_EXPLORER,
        "Fast codebase search and pattern matching. Use for finding files, locating code patterns, and answering 'where is X?' questions.",
        EXPLORER_PROMPT,
        model_for(AGENT_EXPLORER),
        0.1,
    )
}

fn librarian_agent() -> AgentSpec {
    AgentSpec::new(
        AGENT_LIBRARIAN,
        "External documentation and library research. Use for official docs lookup, GitHub examples, and understanding library internals.",
        LIBRARIAN_PROMPT,
        model_for(AGENT_LIBRARIAN),
        0.1,
    )
}

fn oracle_agent() -> AgentSpec {
    AgentSpec::new(
        AGENT_ORACLE,
        "Strategic technical advisor. Use for architecture decisions, complex debugging, code review, and engineering guidance.",
        ORACLE_PROMPT,
        model_for(AGENT_ORACLE),
        0.1,
    )
}

fn designer_agent() -> AgentSpec {
    AgentSpec::new(
        AGENT_DESIGNER,
        "UI/UX specialist for intentional, polished experiences. Use for user-facing interfaces, responsive layouts, and visual polish.",
        DESIGNER_PROMPT,
        model_for(AGENT_DESIGNER),
        0.7,
    )
}

fn fixer_agent() -> AgentSpec {
    AgentSpec::new(
        AGENT_FIXER,
        "Fast implementation specialist. Use for well-defined code changes, refactors, and bug fixes delegated by the orchestrator.",
        FIXER_PROMPT,
        model_for(AGENT_FIXER),
        0.2,
    )
}
