//! Agent definition types.
//!
//! This module defines the core types shared by the registry and the builder:
//! - `AgentSpec`: Immutable built-in (or validated custom) agent template
//! - `AgentMode`: Whether an agent is directly invocable or delegation-only
//! - `AgentConfig`: Final composed configuration handed to the host runtime

use crate::agents::permissions::{PermissionMap, RoleLock};
use serde::{Deserialize, Serialize};

/// Primary agent: autonomous executor that delegates all work.
pub const AGENT_ORCHESTRATOR: &str = "orchestrator";
/// Primary agent: read-only planner.
pub const AGENT_CARTOGRAPHER: &str = "cartographer";
/// Subagent: codebase search.
pub const AGENT_EXPLORER: &str = "explorer";
/// Subagent: library and documentation research.
pub const AGENT_LIBRARIAN: &str = "librarian";
/// Subagent: strategic advisor.
pub const AGENT_ORACLE: &str = "oracle";
/// Subagent: UI/UX implementation.
pub const AGENT_DESIGNER: &str = "designer";
/// Subagent: implementation assistant.
pub const AGENT_FIXER: &str = "fixer";

/// All built-in agent names in canonical order.
pub const AGENT_NAMES: &[&str] = &[
    AGENT_ORCHESTRATOR,
    AGENT_CARTOGRAPHER,
    AGENT_EXPLORER,
    AGENT_LIBRARIAN,
    AGENT_ORACLE,
    AGENT_DESIGNER,
    AGENT_FIXER,
];

/// Agent classification used by the host to decide visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Directly invocable by the user.
    Primary,
    /// Reachable only through delegation.
    Subagent,
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentMode::Primary => write!(f, "primary"),
            AgentMode::Subagent => write!(f, "subagent"),
        }
    }
}

impl std::str::FromStr for AgentMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(AgentMode::Primary),
            "subagent" => Ok(AgentMode::Subagent),
            _ => Err(crate::Error::InvalidInput(format!(
                "Invalid agent mode: '{}'. Expected 'primary' or 'subagent'.",
                s
            ))),
        }
    }
}

/// Immutable agent template.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpec {
    /// Unique agent name.
    pub name: String,
    /// Human-readable description of the agent's purpose.
    pub description: String,
    /// Optional display color (e.g. `#16A34A`).
    pub color: Option<String>,
    /// Base prompt text.
    pub prompt: String,
    /// Default model identifier.
    pub model: String,
    /// Default sampling temperature.
    pub temperature: f64,
    /// Primary or subagent.
    pub mode: AgentMode,
    /// Non-configurable permission policy.
    pub lock: RoleLock,
    /// Permission entries carried by the template itself.
    pub permission: PermissionMap,
}

impl AgentSpec {
    /// Create a new subagent spec with no role lock.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        prompt: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            color: None,
            prompt: prompt.into(),
            model: model.into(),
            temperature,
            mode: AgentMode::Subagent,
            lock: RoleLock::None,
            permission: PermissionMap::new(),
        }
    }

    /// Mark as a primary agent.
    pub fn primary(mut self) -> Self {
        self.mode = AgentMode::Primary;
        self
    }

    /// Set the role lock.
    pub fn with_lock(mut self, lock: RoleLock) -> Self {
        self.lock = lock;
        self
    }

    /// Set the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set template permission entries.
    pub fn with_permission(mut self, permission: PermissionMap) -> Self {
        self.permission = permission;
        self
    }

    /// Check if this agent is a primary agent.
    pub fn is_primary(&self) -> bool {
        self.mode == AgentMode::Primary
    }

    /// Get a short summary for display.
    pub fn summary(&self) -> String {
        format!(
            "{}: [{}, {}, lock: {}] {}",
            self.name, self.mode, self.model, self.lock, self.description
        )
    }
}

/// Model, temperature, prompt and permissions of a composed agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f64,
    pub prompt: String,
    pub permission: PermissionMap,
}

/// Final composed agent configuration.
///
/// Serializes to the flat record the host runtime expects:
/// `{description?, color?, model, temperature, prompt, permission, mode, mcps}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentConfig {
    /// Agent name (the key in the output mapping).
    #[serde(skip)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub config: AgentSettings,
    pub mode: AgentMode,
    /// Attached resources, passed through uninterpreted.
    pub mcps: Vec<String>,
}

impl AgentConfig {
    /// Check if this agent is a primary agent.
    pub fn is_primary(&self) -> bool {
        self.mode == AgentMode::Primary
    }
}
