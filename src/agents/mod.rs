//! Agent composition.
//!
//! This module turns the built-in agent templates and a caller-supplied
//! override document into the final agent configuration records.
//!
//! ## Built-in Agents
//!
//! | Name         | Mode     | Role lock          | Description                          |
//! |--------------|----------|--------------------|--------------------------------------|
//! | orchestrator | primary  | autonomous         | Delegates work, never edits directly |
//! | cartographer | primary  | read-only planner  | Plans, delegates to read-only agents |
//! | explorer     | subagent | none               | Codebase search                      |
//! | librarian    | subagent | none               | Documentation research               |
//! | oracle       | subagent | none               | Architecture and debugging advice    |
//! | designer     | subagent | none               | UI/UX implementation                 |
//! | fixer        | subagent | none               | Implementation assistant             |
//!
//! ## Composition
//!
//! Each agent runs through the pipeline in [`builder`]:
//!
//! 1. **Overrides** - look up the agent's override record
//! 2. **Model** - override, then inherited dependency model, then default
//! 3. **Prompt** - replacement, or base plus appended text
//! 4. **Permissions** - base, `question = allow`, skill presets, role lock
//! 5. **Classify** - primary or subagent
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roster::agents::{AgentBuilder, Registry};
//! use roster::config::OverrideDocument;
//!
//! let registry = Registry::builtin();
//! let document = OverrideDocument::new();
//! let report = AgentBuilder::new(&registry, &document).build()?;
//! for agent in report.agents.iter() {
//!     println!("{}: {}", agent.name, agent.config.model);
//! }
//! ```

pub mod builder;
pub mod definitions;
pub mod embedded;
pub mod model;
pub mod permissions;
pub mod prompt;
pub mod registry;
pub mod resources;
pub mod skills;

// Re-export commonly used types
pub use builder::{
    AgentBuilder, AgentSet, BuildReport, Diagnostic, DiagnosticKind, PIPELINE_VERSION,
    RejectedAgent, RejectionReason,
};
pub use definitions::{
    AGENT_CARTOGRAPHER, AGENT_DESIGNER, AGENT_EXPLORER, AGENT_FIXER, AGENT_LIBRARIAN,
    AGENT_NAMES, AGENT_ORACLE, AGENT_ORCHESTRATOR, AgentConfig, AgentMode, AgentSettings,
    AgentSpec,
};
pub use embedded::{get_all_embedded_agents, get_embedded_agent};
pub use model::{ModelSource, ResolvedModel, resolve_model};
pub use permissions::{PermissionMap, PermissionValue, RoleLock, Verdict, compose_permissions};
pub use prompt::{
    NoPromptCustomization, PromptCustomization, PromptDirectory, PromptSource, compose_prompt,
};
pub use registry::{CustomAgentDefaults, Registry};
pub use resources::{NoResources, ResourceResolver, ResourceTable};
pub use skills::{NoSkillPresets, SkillPermissions, SkillPresetTable};
