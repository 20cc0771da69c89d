//! Schema for the agent override document.
//!
//! This module provides:
//! - `AgentOverride`: per-agent partial customization
//! - `CustomAgentSpec`: caller-declared agent
//! - `OverrideDocument`: the document the builder composes from
//! - `RosterConfig`: a configuration file, i.e. an override document plus the
//!   collaborator data (skill presets, resource defaults) that may live beside it
//!
//! All types deserialize from JSON and TOML with snake_case keys; the KDL form
//! is parsed by [`crate::config::kdl`].

use crate::agents::permissions::PermissionMap;
use crate::agents::resources::ResourceTable;
use crate::agents::skills::SkillPresetTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Partial customization of one agent. `None` means "use default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentOverride {
    /// Override model identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Override sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Full prompt replacement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Text appended to the base prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_append: Option<String>,
    /// Skill list replacing the agent's default skills.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    /// Attached resource list replacing the agent's defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcps: Option<Vec<String>>,
    /// Permission entries layered under the baseline and role locks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<PermissionMap>,
}

impl AgentOverride {
    /// Create an empty override.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builder-style: set the temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Builder-style: set the replacement prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Builder-style: set the appended prompt text.
    pub fn with_prompt_append(mut self, append: impl Into<String>) -> Self {
        self.prompt_append = Some(append.into());
        self
    }

    /// Builder-style: set the skill list.
    pub fn with_skills<S: Into<String>>(mut self, skills: impl IntoIterator<Item = S>) -> Self {
        self.skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }

    /// Builder-style: set the attached resources.
    pub fn with_mcps<S: Into<String>>(mut self, mcps: impl IntoIterator<Item = S>) -> Self {
        self.mcps = Some(mcps.into_iter().map(Into::into).collect());
        self
    }

    /// Builder-style: set permission entries.
    pub fn with_permission(mut self, permission: PermissionMap) -> Self {
        self.permission = Some(permission);
        self
    }

    /// The configured model, treating an empty string as unset.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref().filter(|m| !m.is_empty())
    }

    /// Check whether nothing is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge another override into this one.
    ///
    /// Values from `other` win when set. Permission entries are overlaid key
    /// by key rather than replaced.
    pub fn merge(&mut self, other: &AgentOverride) {
        if other.model.is_some() {
            self.model = other.model.clone();
        }
        if other.temperature.is_some() {
            self.temperature = other.temperature;
        }
        if other.prompt.is_some() {
            self.prompt = other.prompt.clone();
        }
        if other.prompt_append.is_some() {
            self.prompt_append = other.prompt_append.clone();
        }
        if other.skills.is_some() {
            self.skills = other.skills.clone();
        }
        if other.mcps.is_some() {
            self.mcps = other.mcps.clone();
        }
        if let Some(ref permission) = other.permission {
            match self.permission {
                Some(ref mut existing) => existing.overlay(permission),
                None => self.permission = Some(permission.clone()),
            }
        }
    }
}

/// Caller-declared agent.
///
/// `name` and `prompt` are mandatory, but optional here so that a malformed
/// entry reaches the builder and is reported there with its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomAgentSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CustomAgentSpec {
    /// Create a custom agent with a name and prompt.
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    /// Builder-style: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder-style: set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builder-style: set the temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The name with surrounding whitespace removed, if non-blank.
    pub fn trimmed_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Caller-supplied override document. Read-only input to the builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideDocument {
    /// Per-agent overrides keyed by agent name.
    pub agents: BTreeMap<String, AgentOverride>,
    /// Agents to leave out of the output.
    pub disabled_agents: Vec<String>,
    /// Caller-declared agents.
    pub custom_agents: Vec<CustomAgentSpec>,
}

impl OverrideDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: add an override.
    pub fn with_override(mut self, name: impl Into<String>, agent: AgentOverride) -> Self {
        self.agents.insert(name.into(), agent);
        self
    }

    /// Builder-style: disable an agent.
    pub fn with_disabled(mut self, name: impl Into<String>) -> Self {
        self.disabled_agents.push(name.into());
        self
    }

    /// Builder-style: add a custom agent.
    pub fn with_custom_agent(mut self, agent: CustomAgentSpec) -> Self {
        self.custom_agents.push(agent);
        self
    }

    /// Look up the override for an agent. Absence is not an error.
    pub fn agent_override(&self, name: &str) -> Option<&AgentOverride> {
        self.agents.get(name)
    }

    /// Check whether an agent is listed as disabled.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_agents.iter().any(|disabled| disabled == name)
    }

    /// Merge a later layer into this document.
    ///
    /// - overrides merge field by field
    /// - disabled agents are unioned
    /// - custom agents replace a same-named entry from an earlier layer in
    ///   place; everything else is appended, so duplicates within one layer
    ///   survive for the builder to reject
    pub fn merge(&mut self, other: &OverrideDocument) {
        for (name, agent) in &other.agents {
            self.agents.entry(name.clone()).or_default().merge(agent);
        }

        for name in &other.disabled_agents {
            if !self.is_disabled(name) {
                self.disabled_agents.push(name.clone());
            }
        }

        let earlier = self.custom_agents.len();
        for custom in &other.custom_agents {
            let existing = custom.trimmed_name().and_then(|name| {
                self.custom_agents[..earlier]
                    .iter_mut()
                    .find(|c| c.trimmed_name() == Some(name))
            });
            match existing {
                Some(slot) => *slot = custom.clone(),
                None => self.custom_agents.push(custom.clone()),
            }
        }
    }
}

/// A configuration file: override document plus collaborator data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    #[serde(flatten)]
    pub document: OverrideDocument,
    /// Default skill lists per agent.
    pub skill_presets: SkillPresetTable,
    /// Default attached resources per agent.
    pub resources: ResourceTable,
}

impl RosterConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a later layer into this configuration.
    pub fn merge(&mut self, other: &RosterConfig) {
        self.document.merge(&other.document);
        self.skill_presets.merge(&other.skill_presets);
        self.resources.merge(&other.resources);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::permissions::Verdict;

    #[test]
    fn test_parse_document_json() {
        let json = r#"{
            "agents": {
                "librarian": {"model": "m1", "skills": ["docs"]},
                "fixer": {}
            },
            "disabled_agents": ["designer"],
            "custom_agents": [{"name": "reviewer", "prompt": "Review code."}]
        }"#;

        let doc: OverrideDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.agent_override("librarian").unwrap().model(), Some("m1"));
        assert!(doc.agent_override("fixer").unwrap().is_empty());
        assert!(doc.agent_override("oracle").is_none());
        assert!(doc.is_disabled("designer"));
        assert_eq!(doc.custom_agents[0].trimmed_name(), Some("reviewer"));
    }

    #[test]
    fn test_parse_empty_document() {
        let doc: OverrideDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, OverrideDocument::default());
    }

    #[test]
    fn test_parse_permission_override() {
        let json = r#"{"agents": {"orchestrator": {"permission": {"edit": "allow", "task": {"*": "allow"}}}}}"#;
        let doc: OverrideDocument = serde_json::from_str(json).unwrap();
        let permission = doc
            .agent_override("orchestrator")
            .unwrap()
            .permission
            .as_ref()
            .unwrap();
        assert_eq!(permission.verdict("edit"), Some(Verdict::Allow));
        assert_eq!(permission.evaluate("task", Some("fixer")), Some(Verdict::Allow));
    }

    #[test]
    fn test_parse_rejects_bad_verdict() {
        let json = r#"{"agents": {"oracle": {"permission": {"bash": "sometimes"}}}}"#;
        assert!(serde_json::from_str::<OverrideDocument>(json).is_err());
    }

    #[test]
    fn test_parse_roster_config_toml() {
        let toml_src = r#"
disabled_agents = ["oracle"]

[agents.explorer]
model = "m2"
temperature = 0.4
prompt_append = "Be brief."

[skill_presets]
librarian = ["docs", "search"]

[resources]
librarian = ["websearch"]

[[custom_agents]]
name = "reviewer"
prompt = "Review."
"#;
        let config: RosterConfig = toml::from_str(toml_src).unwrap();
        let explorer = config.document.agent_override("explorer").unwrap();
        assert_eq!(explorer.model(), Some("m2"));
        assert_eq!(explorer.temperature, Some(0.4));
        assert_eq!(explorer.prompt_append.as_deref(), Some("Be brief."));
        assert!(config.document.is_disabled("oracle"));
        assert_eq!(config.document.custom_agents.len(), 1);
        assert!(!config.skill_presets.is_empty());
        assert!(!config.resources.is_empty());
    }

    #[test]
    fn test_empty_model_is_unset() {
        let agent = AgentOverride::new().with_model("");
        assert_eq!(agent.model(), None);
    }

    #[test]
    fn test_override_merge_later_wins() {
        let mut base = AgentOverride::new()
            .with_model("a")
            .with_temperature(0.1)
            .with_permission(PermissionMap::new().with("bash", Verdict::Ask));
        let later = AgentOverride::new()
            .with_model("b")
            .with_permission(PermissionMap::new().with("webfetch", Verdict::Deny));

        base.merge(&later);

        assert_eq!(base.model(), Some("b"));
        assert_eq!(base.temperature, Some(0.1));
        let permission = base.permission.unwrap();
        assert_eq!(permission.verdict("bash"), Some(Verdict::Ask));
        assert_eq!(permission.verdict("webfetch"), Some(Verdict::Deny));
    }

    #[test]
    fn test_document_merge() {
        let mut system = OverrideDocument::new()
            .with_override("librarian", AgentOverride::new().with_model("sys"))
            .with_disabled("designer")
            .with_custom_agent(CustomAgentSpec::new("reviewer", "old"));
        let project = OverrideDocument::new()
            .with_override("librarian", AgentOverride::new().with_temperature(0.5))
            .with_disabled("designer")
            .with_disabled("oracle")
            .with_custom_agent(CustomAgentSpec::new("reviewer", "new"))
            .with_custom_agent(CustomAgentSpec::new("tester", "test"));

        system.merge(&project);

        let librarian = system.agent_override("librarian").unwrap();
        assert_eq!(librarian.model(), Some("sys"));
        assert_eq!(librarian.temperature, Some(0.5));
        assert_eq!(system.disabled_agents, vec!["designer", "oracle"]);
        assert_eq!(system.custom_agents.len(), 2);
        assert_eq!(system.custom_agents[0].prompt.as_deref(), Some("new"));
        assert_eq!(system.custom_agents[1].trimmed_name(), Some("tester"));
    }

    #[test]
    fn test_document_merge_keeps_duplicates_within_a_layer() {
        let mut resolved = OverrideDocument::new();
        let layer = OverrideDocument::new()
            .with_custom_agent(CustomAgentSpec::new("tester", "First."))
            .with_custom_agent(CustomAgentSpec::new("tester", "Second."));

        resolved.merge(&layer);
        assert_eq!(resolved.custom_agents.len(), 2);
        assert_eq!(resolved.custom_agents[0].prompt.as_deref(), Some("First."));
        assert_eq!(resolved.custom_agents[1].prompt.as_deref(), Some("Second."));

        let project = OverrideDocument::new()
            .with_custom_agent(CustomAgentSpec::new("tester", "Project."));
        resolved.merge(&project);
        assert_eq!(resolved.custom_agents.len(), 2);
        assert_eq!(resolved.custom_agents[0].prompt.as_deref(), Some("Project."));
        assert_eq!(resolved.custom_agents[1].prompt.as_deref(), Some("Second."));
    }

    #[test]
    fn test_trimmed_name() {
        assert_eq!(CustomAgentSpec::new("  x ", "p").trimmed_name(), Some("x"));
        assert_eq!(CustomAgentSpec::new("   ", "p").trimmed_name(), None);
        assert_eq!(CustomAgentSpec::default().trimmed_name(), None);
    }
}
