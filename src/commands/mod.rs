//! Command implementations for the roster CLI.
//!
//! This module contains the logic behind each CLI command:
//! - `agents_list` - Registry listing
//! - `agents_show` - Composed configuration of one agent
//! - `build` - Full composed mapping
//! - `config_check` - Diagnostics and rejected custom agents
//! - `config_paths` - Configuration file locations
//!
//! All file I/O happens in [`Composition::load`] before the builder runs.

use crate::agents::{
    AgentBuilder, AgentConfig, AgentSet, BuildReport, Diagnostic, ModelSource, PromptDirectory,
    Registry, RejectedAgent,
};
use crate::config::resolver::PROJECT_DIR;
use crate::config::{ConfigLayer, ConfigPaths, ResolvedConfig, ValueSource, resolve_config};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize output: {}"}}"#, e))
}

/// Find the repository root: the nearest ancestor containing `.roster` or `.git`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_DIR).is_dir() || dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Loaded configuration plus collaborators, ready to compose.
pub struct Composition {
    pub registry: Registry,
    pub resolved: ResolvedConfig,
    pub prompts: PromptDirectory,
}

impl Composition {
    /// Load configuration and prompt customizations.
    ///
    /// Prompt files are looked up for built-in agents and declared custom agents.
    pub fn load(paths: &ConfigPaths) -> Result<Self> {
        let registry = Registry::builtin();
        let resolved = resolve_config(paths)?;

        let prompts = match resolved.prompts_dir {
            Some(ref dir) => {
                let custom_names: Vec<&str> = resolved
                    .config
                    .document
                    .custom_agents
                    .iter()
                    .filter_map(|custom| custom.trimmed_name())
                    .collect();
                PromptDirectory::load(dir, registry.names().chain(custom_names))?
            }
            None => PromptDirectory::default(),
        };

        Ok(Self {
            registry,
            resolved,
            prompts,
        })
    }

    /// Run the builder.
    pub fn build(&self) -> Result<BuildReport> {
        let config = &self.resolved.config;
        AgentBuilder::new(&self.registry, &config.document)
            .with_prompts(&self.prompts)
            .with_skills(&config.skill_presets)
            .with_resources(&config.resources)
            .build()
    }
}

// === agents list ===

#[derive(Serialize)]
pub struct AgentSummary {
    pub name: String,
    pub mode: String,
    pub model: String,
    pub temperature: f64,
    pub lock: String,
    pub description: String,
}

#[derive(Serialize)]
pub struct AgentList {
    pub count: usize,
    pub agents: Vec<AgentSummary>,
}

impl CommandResult for AgentList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("{} built-in agents:", self.count)];
        for agent in &self.agents {
            lines.push(format!(
                "  {} [{}] model: {} temperature: {} lock: {}",
                agent.name, agent.mode, agent.model, agent.temperature, agent.lock
            ));
            lines.push(format!("    {}", agent.description));
        }
        lines.join("\n")
    }
}

/// List built-in agents with their defaults.
pub fn agents_list() -> Result<AgentList> {
    let registry = Registry::builtin();
    let agents: Vec<AgentSummary> = registry
        .specs()
        .iter()
        .map(|spec| AgentSummary {
            name: spec.name.clone(),
            mode: spec.mode.to_string(),
            model: spec.model.clone(),
            temperature: spec.temperature,
            lock: spec.lock.to_string(),
            description: spec.description.clone(),
        })
        .collect();

    Ok(AgentList {
        count: agents.len(),
        agents,
    })
}

// === agents show ===

#[derive(Serialize)]
pub struct AgentShow {
    pub name: String,
    /// Layer the agent's override came from.
    pub source: ValueSource,
    pub model_source: ModelSource,
    pub agent: AgentConfig,
}

impl CommandResult for AgentShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let agent = &self.agent;
        let mut lines = vec![format!("{} ({})", self.name, agent.mode)];
        if let Some(ref description) = agent.description {
            lines.push(format!("  {}", description));
        }
        lines.push(format!(
            "  model: {} ({})",
            agent.config.model, self.model_source
        ));
        lines.push(format!("  temperature: {}", agent.config.temperature));
        lines.push(format!("  config source: {}", self.source));
        if let Some(ref color) = agent.color {
            lines.push(format!("  color: {}", color));
        }
        if !agent.mcps.is_empty() {
            lines.push(format!("  mcps: {}", agent.mcps.join(", ")));
        }
        lines.push("  permissions:".to_string());
        for (capability, value) in agent.config.permission.iter() {
            let value = serde_json::to_string(value).unwrap_or_default();
            lines.push(format!("    {}: {}", capability, value.trim_matches('"')));
        }
        lines.push(format!("  prompt: {} chars", agent.config.prompt.chars().count()));
        lines.join("\n")
    }
}

/// Show the composed configuration of one agent.
pub fn agents_show(paths: &ConfigPaths, name: &str) -> Result<AgentShow> {
    let composition = Composition::load(paths)?;
    let mut report = composition.build()?;

    let agent = report
        .agents
        .get(name)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("agent '{}' (unknown or disabled)", name)))?;
    let model_source = report
        .models
        .remove(name)
        .map(|model| model.source)
        .unwrap_or(ModelSource::Default);

    Ok(AgentShow {
        name: name.to_string(),
        source: composition.resolved.source_for(name),
        model_source,
        agent,
    })
}

// === build ===

pub struct BuildOutput {
    pub agents: AgentSet,
    pub diagnostics: usize,
    pub rejected: usize,
}

impl CommandResult for BuildOutput {
    fn to_json(&self) -> String {
        json(&self.agents)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("{} agents composed:", self.agents.len())];
        for agent in self.agents.iter() {
            lines.push(format!(
                "  {} [{}] {} (temperature {})",
                agent.name, agent.mode, agent.config.model, agent.config.temperature
            ));
        }
        if self.diagnostics > 0 || self.rejected > 0 {
            lines.push(format!(
                "{} warnings, {} rejected custom agents (see `roster config check`)",
                self.diagnostics, self.rejected
            ));
        }
        lines.join("\n")
    }
}

/// Compose the full agent configuration.
///
/// With `strict`, any rejected custom agent fails the command.
pub fn build(paths: &ConfigPaths, strict: bool) -> Result<BuildOutput> {
    let report = Composition::load(paths)?.build()?;
    let diagnostics = report.diagnostics.len();
    let rejected = report.rejected.len();

    let agents = if strict {
        report.into_result()?
    } else {
        report.agents
    };

    Ok(BuildOutput {
        agents,
        diagnostics,
        rejected,
    })
}

// === config check ===

#[derive(Serialize)]
pub struct ConfigCheck {
    pub valid: bool,
    pub layers: Vec<ConfigLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts_dir: Option<PathBuf>,
    pub agents: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub rejected: Vec<RejectedAgent>,
    pub pipeline_version: u32,
}

impl CommandResult for ConfigCheck {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.layers.is_empty() {
            lines.push("No configuration files loaded (using defaults)".to_string());
        } else {
            for layer in &self.layers {
                lines.push(format!("Loaded {} config: {}", layer.source, layer.path.display()));
            }
        }
        if let Some(ref dir) = self.prompts_dir {
            lines.push(format!("Prompt customizations: {}", dir.display()));
        }
        lines.push(format!("{} agents: {}", self.agents.len(), self.agents.join(", ")));

        for diagnostic in &self.diagnostics {
            lines.push(format!("warning: {}", diagnostic));
        }
        for rejected in &self.rejected {
            lines.push(format!("rejected: {}", rejected));
        }

        lines.push(if self.valid {
            "Configuration OK".to_string()
        } else {
            format!("{} custom agents rejected", self.rejected.len())
        });
        lines.join("\n")
    }
}

/// Validate configuration and report diagnostics.
pub fn config_check(paths: &ConfigPaths) -> Result<ConfigCheck> {
    let composition = Composition::load(paths)?;
    let report = composition.build()?;

    Ok(ConfigCheck {
        valid: report.rejected.is_empty(),
        layers: composition.resolved.loaded.clone(),
        prompts_dir: composition.resolved.prompts_dir.clone(),
        agents: report.agents.names().map(str::to_string).collect(),
        diagnostics: report.diagnostics,
        rejected: report.rejected,
        pipeline_version: report.pipeline_version,
    })
}

// === config paths ===

#[derive(Serialize)]
pub struct ConfigPathsResult {
    pub layers: Vec<ConfigLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts_dir: Option<PathBuf>,
}

impl CommandResult for ConfigPathsResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines: Vec<String> = self
            .layers
            .iter()
            .map(|layer| {
                format!(
                    "{}: {}{}",
                    layer.source,
                    layer.path.display(),
                    if layer.exists { "" } else { " (not found)" }
                )
            })
            .collect();
        match self.prompts_dir {
            Some(ref dir) => lines.push(format!("prompts: {}", dir.display())),
            None => lines.push("prompts: (none)".to_string()),
        }
        lines.join("\n")
    }
}

/// Show configuration file locations.
pub fn config_paths(paths: &ConfigPaths) -> Result<ConfigPathsResult> {
    Ok(ConfigPathsResult {
        layers: paths.layers(),
        prompts_dir: paths.prompts_dir(),
    })
}
