//! Skill-permission presets.
//!
//! The builder does not know which skills exist. It asks a [`SkillPermissions`]
//! collaborator for the verdicts to merge into an agent's `skill` sub-map,
//! passing the caller's configured skill list when the override supplies one.

use crate::agents::permissions::{Verdict, WILDCARD};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source of skill-permission presets.
pub trait SkillPermissions: Send + Sync {
    /// Skill verdicts for an agent.
    ///
    /// `configured` is the caller's skill list, which replaces the agent's
    /// defaults when present. Returns an empty map when nothing matches.
    fn resolve(&self, agent: &str, configured: Option<&[String]>) -> BTreeMap<String, Verdict>;
}

/// Preset source that never contributes anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSkillPresets;

impl SkillPermissions for NoSkillPresets {
    fn resolve(&self, _agent: &str, _configured: Option<&[String]>) -> BTreeMap<String, Verdict> {
        BTreeMap::new()
    }
}

/// Table of default skill lists per agent.
///
/// Resolution:
/// - the configured list wins over the agent's defaults
/// - a list containing `*` allows every skill
/// - otherwise listed skills are allowed and everything else is denied
/// - an agent with neither defaults nor a configured list gets nothing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillPresetTable {
    defaults: BTreeMap<String, Vec<String>>,
}

impl SkillPresetTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: set the default skills for an agent.
    pub fn with_defaults<S: Into<String>>(
        mut self,
        agent: impl Into<String>,
        skills: impl IntoIterator<Item = S>,
    ) -> Self {
        self.set_defaults(agent, skills);
        self
    }

    /// Set the default skills for an agent.
    pub fn set_defaults<S: Into<String>>(
        &mut self,
        agent: impl Into<String>,
        skills: impl IntoIterator<Item = S>,
    ) {
        self.defaults
            .insert(agent.into(), skills.into_iter().map(Into::into).collect());
    }

    /// Default skills for an agent.
    pub fn defaults_for(&self, agent: &str) -> Option<&[String]> {
        self.defaults.get(agent).map(Vec::as_slice)
    }

    /// Merge a later table into this one; later agent entries replace earlier ones.
    pub fn merge(&mut self, other: &SkillPresetTable) {
        for (agent, skills) in &other.defaults {
            self.defaults.insert(agent.clone(), skills.clone());
        }
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }
}

impl SkillPermissions for SkillPresetTable {
    fn resolve(&self, agent: &str, configured: Option<&[String]>) -> BTreeMap<String, Verdict> {
        let Some(skills) = configured.or_else(|| self.defaults_for(agent)) else {
            return BTreeMap::new();
        };

        let mut verdicts = BTreeMap::new();
        if skills.iter().any(|skill| skill == WILDCARD) {
            verdicts.insert(WILDCARD.to_string(), Verdict::Allow);
            return verdicts;
        }

        verdicts.insert(WILDCARD.to_string(), Verdict::Deny);
        for skill in skills {
            verdicts.insert(skill.clone(), Verdict::Allow);
        }
        verdicts
    }
}
