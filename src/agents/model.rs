//! Model resolution.
//!
//! The effective model of an agent is, in order:
//! 1. its own override's model
//! 2. its declared fallback dependency's model, when that one was explicitly configured
//! 3. its baseline (the registry default, or the custom agent's own model)

use crate::agents::registry::Registry;
use crate::config::schema::OverrideDocument;
use serde::Serialize;
use std::collections::BTreeMap;

/// Where a resolved model came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "from")]
pub enum ModelSource {
    /// Registry default.
    Default,
    /// Set on the custom agent declaration (or the custom-agent default).
    Custom,
    /// The agent's own override.
    Override,
    /// Inherited from the named dependency agent.
    Inherited(String),
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSource::Default => write!(f, "default"),
            ModelSource::Custom => write!(f, "custom"),
            ModelSource::Override => write!(f, "override"),
            ModelSource::Inherited(from) => write!(f, "inherited:{}", from),
        }
    }
}

/// A model identifier with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedModel {
    pub model: String,
    pub source: ModelSource,
}

impl ResolvedModel {
    /// Create a resolved model.
    pub fn new(model: impl Into<String>, source: ModelSource) -> Self {
        Self {
            model: model.into(),
            source,
        }
    }

    /// Whether the model traces back to a caller override.
    pub fn is_explicit(&self) -> bool {
        matches!(
            self.source,
            ModelSource::Override | ModelSource::Inherited(_)
        )
    }
}

/// Resolve the effective model for `name`.
///
/// `baseline` is what the agent uses when nothing else applies. `resolved`
/// holds the models of agents resolved earlier; declared dependencies must
/// already be present.
pub fn resolve_model(
    document: &OverrideDocument,
    registry: &Registry,
    name: &str,
    baseline: ResolvedModel,
    resolved: &BTreeMap<String, ResolvedModel>,
) -> ResolvedModel {
    if let Some(model) = document.agent_override(name).and_then(|o| o.model()) {
        return ResolvedModel::new(model, ModelSource::Override);
    }

    if let Some(dependency) = registry.fallback_for(name) {
        match resolved.get(dependency) {
            Some(parent) if parent.is_explicit() => {
                tracing::debug!(
                    agent = name,
                    from = dependency,
                    model = %parent.model,
                    "inheriting model from dependency"
                );
                return ResolvedModel::new(
                    parent.model.clone(),
                    ModelSource::Inherited(dependency.to_string()),
                );
            }
            Some(_) => {}
            None => {
                tracing::warn!(
                    agent = name,
                    dependency,
                    "model dependency resolved out of order; using baseline"
                );
            }
        }
    }

    baseline
}
