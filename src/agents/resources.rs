//! Attached resources (MCP servers) per agent.
//!
//! The list is auxiliary metadata for the host; the builder copies it onto the
//! output record without interpreting it.

use crate::config::schema::OverrideDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source of attached resource lists.
pub trait ResourceResolver: Send + Sync {
    /// Resource names attached to an agent.
    fn resolve(&self, agent: &str, document: &OverrideDocument) -> Vec<String>;
}

/// Resolver that attaches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResources;

impl ResourceResolver for NoResources {
    fn resolve(&self, _agent: &str, _document: &OverrideDocument) -> Vec<String> {
        Vec::new()
    }
}

/// Default resource lists per agent, replaced by an override's `mcps` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceTable {
    defaults: BTreeMap<String, Vec<String>>,
}

impl ResourceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: set the default resources for an agent.
    pub fn with_defaults<S: Into<String>>(
        mut self,
        agent: impl Into<String>,
        resources: impl IntoIterator<Item = S>,
    ) -> Self {
        self.set_defaults(agent, resources);
        self
    }

    /// Set the default resources for an agent.
    pub fn set_defaults<S: Into<String>>(
        &mut self,
        agent: impl Into<String>,
        resources: impl IntoIterator<Item = S>,
    ) {
        self.defaults
            .insert(agent.into(), resources.into_iter().map(Into::into).collect());
    }

    /// Merge a later table into this one; later agent entries replace earlier ones.
    pub fn merge(&mut self, other: &ResourceTable) {
        for (agent, resources) in &other.defaults {
            self.defaults.insert(agent.clone(), resources.clone());
        }
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }
}

impl ResourceResolver for ResourceTable {
    fn resolve(&self, agent: &str, document: &OverrideDocument) -> Vec<String> {
        document
            .agent_override(agent)
            .and_then(|o| o.mcps.clone())
            .or_else(|| self.defaults.get(agent).cloned())
            .unwrap_or_default()
    }
}
