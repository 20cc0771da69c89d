//! Agent registry: the immutable table every composition starts from.
//!
//! The registry bundles the built-in agent templates with the static data the
//! builder needs: the primary-role partition, the model-fallback dependencies
//! and the defaults applied to custom agents. It is plain data passed into the
//! builder, so alternative registries can be constructed for tests or embedders.

use crate::agents::definitions::{AgentMode, AgentSpec};
use crate::agents::embedded;
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Defaults applied to custom agents that omit a model or temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAgentDefaults {
    pub model: String,
    pub temperature: f64,
}

impl Default for CustomAgentDefaults {
    fn default() -> Self {
        Self {
            model: embedded::CUSTOM_AGENT_MODEL.to_string(),
            temperature: embedded::CUSTOM_AGENT_TEMPERATURE,
        }
    }
}

/// Immutable registry of agent templates.
#[derive(Debug, Clone)]
pub struct Registry {
    specs: Vec<AgentSpec>,
    fallbacks: BTreeMap<String, String>,
    custom_defaults: CustomAgentDefaults,
}

impl Registry {
    /// Create a registry from explicit data.
    ///
    /// Fails if a name is duplicated or a fallback refers to an unknown agent.
    pub fn new(
        specs: Vec<AgentSpec>,
        fallbacks: impl IntoIterator<Item = (String, String)>,
        custom_defaults: CustomAgentDefaults,
    ) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for spec in &specs {
            if spec.name.trim().is_empty() {
                return Err(Error::InvalidInput(
                    "registry agent name must not be empty".to_string(),
                ));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "duplicate registry agent: {}",
                    spec.name
                )));
            }
        }

        let fallbacks: BTreeMap<String, String> = fallbacks.into_iter().collect();
        for (dependent, dependency) in &fallbacks {
            for name in [dependent, dependency] {
                if !seen.contains(name.as_str()) {
                    return Err(Error::InvalidInput(format!(
                        "model fallback refers to unknown agent: {}",
                        name
                    )));
                }
            }
        }

        let registry = Self {
            specs,
            fallbacks,
            custom_defaults,
        };
        registry.resolution_order()?;
        Ok(registry)
    }

    /// The standard registry of embedded agents.
    pub fn builtin() -> Self {
        Self {
            specs: embedded::get_all_embedded_agents(),
            fallbacks: embedded::MODEL_FALLBACKS
                .iter()
                .map(|(dependent, dependency)| (dependent.to_string(), dependency.to_string()))
                .collect(),
            custom_defaults: CustomAgentDefaults::default(),
        }
    }

    /// Get an agent template by name.
    pub fn get(&self, name: &str) -> Option<&AgentSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// All templates in registry order.
    pub fn specs(&self) -> &[AgentSpec] {
        &self.specs
    }

    /// All agent names in registry order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|spec| spec.name.as_str())
    }

    /// Check whether a name belongs to the registry.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Default model of a registry agent.
    pub fn default_model(&self, name: &str) -> Option<&str> {
        self.get(name).map(|spec| spec.model.as_str())
    }

    /// Names of the primary agents.
    pub fn primary_names(&self) -> impl Iterator<Item = &str> {
        self.specs
            .iter()
            .filter(|spec| spec.is_primary())
            .map(|spec| spec.name.as_str())
    }

    /// Check if a name is a primary agent.
    pub fn is_primary(&self, name: &str) -> bool {
        self.get(name).is_some_and(AgentSpec::is_primary)
    }

    /// Check if a name is a registry subagent.
    pub fn is_subagent(&self, name: &str) -> bool {
        self.get(name).is_some_and(|spec| !spec.is_primary())
    }

    /// Classify an agent name.
    ///
    /// Anything outside the primary set, including custom agents, is a subagent.
    pub fn classify(&self, name: &str) -> AgentMode {
        if self.is_primary(name) {
            AgentMode::Primary
        } else {
            AgentMode::Subagent
        }
    }

    /// The agent whose resolved model `name` falls back to, if declared.
    pub fn fallback_for(&self, name: &str) -> Option<&str> {
        self.fallbacks.get(name).map(String::as_str)
    }

    /// Defaults for custom agents.
    pub fn custom_defaults(&self) -> &CustomAgentDefaults {
        &self.custom_defaults
    }

    /// Templates ordered so that every fallback dependency precedes its dependents.
    ///
    /// Ties keep registry order.
    pub fn resolution_order(&self) -> Result<Vec<&AgentSpec>> {
        let mut ordered: Vec<&AgentSpec> = Vec::with_capacity(self.specs.len());
        let mut pending: Vec<&AgentSpec> = self.specs.iter().collect();

        while !pending.is_empty() {
            let ready = pending
                .iter()
                .position(|spec| match self.fallback_for(&spec.name) {
                    Some(dependency) => ordered.iter().any(|done| done.name == dependency),
                    None => true,
                })
                .ok_or(Error::CycleDetected)?;
            ordered.push(pending.remove(ready));
        }

        Ok(ordered)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
