//! Agent builder: composes the final agent set.
//!
//! Every agent goes through the same versioned pipeline of pure stages,
//! applied as a fold over an [`AgentDraft`]:
//!
//! | Stage       | Effect                                                      |
//! |-------------|-------------------------------------------------------------|
//! | overrides   | attach the override record, temperature and resources       |
//! | model       | resolve the effective model                                 |
//! | prompt      | compose the prompt from base, replacement and append text   |
//! | permissions | layer base, baseline, skill and role-lock permissions        |
//! | classify    | tag the agent as primary or subagent                        |
//!
//! Built-in agents are processed in model-dependency order so that fallback
//! dependencies are resolved first. Disabled agents still run the pipeline
//! (their models may be inherited) but are not emitted. Custom agents follow
//! the built-ins.

use crate::agents::definitions::{AgentConfig, AgentMode, AgentSettings, AgentSpec};
use crate::agents::model::{ModelSource, ResolvedModel, resolve_model};
use crate::agents::permissions::{PermissionMap, compose_permissions};
use crate::agents::prompt::{NoPromptCustomization, PromptSource, compose_prompt};
use crate::agents::registry::Registry;
use crate::agents::resources::{NoResources, ResourceResolver};
use crate::agents::skills::{NoSkillPresets, SkillPermissions};
use crate::config::schema::{AgentOverride, OverrideDocument};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Version of the stage list below. Bump when a stage is added, removed or reordered.
pub const PIPELINE_VERSION: u32 = 2;

/// A pipeline stage.
pub type Stage = fn(&StageContext<'_>, AgentDraft) -> AgentDraft;

/// The composition pipeline, in application order.
pub const PIPELINE: &[(&str, Stage)] = &[
    ("overrides", apply_overrides),
    ("model", apply_model),
    ("prompt", apply_prompt),
    ("permissions", apply_permissions),
    ("classify", apply_classification),
];

/// Shared, read-only inputs available to every stage.
pub struct StageContext<'a> {
    pub registry: &'a Registry,
    pub document: &'a OverrideDocument,
    pub prompts: &'a dyn PromptSource,
    pub skills: &'a dyn SkillPermissions,
    pub resources: &'a dyn ResourceResolver,
    /// Models of agents processed earlier in this build.
    pub resolved_models: &'a BTreeMap<String, ResolvedModel>,
}

/// An agent part-way through the pipeline.
#[derive(Debug, Clone)]
pub struct AgentDraft {
    /// Template the agent starts from.
    pub spec: AgentSpec,
    /// Model used when no override or inheritance applies.
    pub baseline_model: ResolvedModel,
    /// Override record for the agent, once resolved.
    pub agent_override: Option<AgentOverride>,
    pub model: ResolvedModel,
    pub temperature: f64,
    pub prompt: String,
    pub permission: PermissionMap,
    pub mode: AgentMode,
    pub mcps: Vec<String>,
}

impl AgentDraft {
    /// Start a draft for a built-in template.
    pub fn builtin(spec: AgentSpec) -> Self {
        let baseline = ResolvedModel::new(spec.model.clone(), ModelSource::Default);
        Self::from_spec(spec, baseline)
    }

    /// Start a draft for a validated custom agent.
    pub fn custom(spec: AgentSpec) -> Self {
        let baseline = ResolvedModel::new(spec.model.clone(), ModelSource::Custom);
        Self::from_spec(spec, baseline)
    }

    fn from_spec(spec: AgentSpec, baseline_model: ResolvedModel) -> Self {
        Self {
            model: baseline_model.clone(),
            baseline_model,
            agent_override: None,
            temperature: spec.temperature,
            prompt: spec.prompt.clone(),
            permission: spec.permission.clone(),
            mode: spec.mode,
            mcps: Vec::new(),
            spec,
        }
    }

    /// Agent name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Finish the draft.
    pub fn into_config(self) -> AgentConfig {
        AgentConfig {
            description: Some(self.spec.description).filter(|d| !d.is_empty()),
            color: self.spec.color,
            config: AgentSettings {
                model: self.model.model,
                temperature: self.temperature,
                prompt: self.prompt,
                permission: self.permission,
            },
            mode: self.mode,
            mcps: self.mcps,
            name: self.spec.name,
        }
    }
}

fn apply_overrides(ctx: &StageContext<'_>, mut draft: AgentDraft) -> AgentDraft {
    draft.agent_override = ctx.document.agent_override(draft.name()).cloned();
    if let Some(temperature) = draft.agent_override.as_ref().and_then(|o| o.temperature) {
        draft.temperature = temperature;
    }
    if draft.agent_override.is_some() {
        tracing::debug!(agent = draft.name(), "applying override");
    }
    draft.mcps = ctx.resources.resolve(draft.name(), ctx.document);
    draft
}

fn apply_model(ctx: &StageContext<'_>, mut draft: AgentDraft) -> AgentDraft {
    draft.model = resolve_model(
        ctx.document,
        ctx.registry,
        draft.name(),
        draft.baseline_model.clone(),
        ctx.resolved_models,
    );
    draft
}

fn apply_prompt(ctx: &StageContext<'_>, mut draft: AgentDraft) -> AgentDraft {
    let file = ctx.prompts.customization(draft.name());
    let configured = draft.agent_override.as_ref();

    let replacement = configured
        .and_then(|o| o.prompt.as_deref())
        .filter(|p| !p.is_empty())
        .or(file.prompt.as_deref());
    let append = configured
        .and_then(|o| o.prompt_append.as_deref())
        .filter(|p| !p.is_empty())
        .or(file.append_prompt.as_deref());

    draft.prompt = compose_prompt(&draft.spec.prompt, replacement, append);
    draft
}

fn apply_permissions(ctx: &StageContext<'_>, mut draft: AgentDraft) -> AgentDraft {
    let configured = draft.agent_override.as_ref();
    let skills = ctx
        .skills
        .resolve(draft.name(), configured.and_then(|o| o.skills.as_deref()));

    draft.permission = compose_permissions(
        &draft.spec.permission,
        configured.and_then(|o| o.permission.as_ref()),
        &skills,
        &draft.spec.lock,
    );
    if draft.spec.lock.is_locked() {
        tracing::debug!(agent = draft.name(), lock = %draft.spec.lock, "role lock applied");
    }
    draft
}

fn apply_classification(ctx: &StageContext<'_>, mut draft: AgentDraft) -> AgentDraft {
    draft.mode = ctx.registry.classify(draft.name());
    draft
}

/// Kind of a build warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Override for a name that is neither built-in nor a valid custom agent.
    UnknownOverride,
    /// Disabled-agents entry naming no known agent.
    UnknownDisabled,
    /// Disabled-agents entry naming a primary agent.
    PrimaryNotDisableable,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::UnknownOverride => write!(f, "unknown_override"),
            DiagnosticKind::UnknownDisabled => write!(f, "unknown_disabled"),
            DiagnosticKind::PrimaryNotDisableable => write!(f, "primary_not_disableable"),
        }
    }
}

/// A non-fatal build warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub agent: String,
    pub message: String,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, agent: &str) -> Self {
        let message = match kind {
            DiagnosticKind::UnknownOverride => {
                format!("override for unknown agent '{}' ignored", agent)
            }
            DiagnosticKind::UnknownDisabled => {
                format!("cannot disable unknown agent '{}'", agent)
            }
            DiagnosticKind::PrimaryNotDisableable => {
                format!("primary agent '{}' cannot be disabled", agent)
            }
        };
        Self {
            kind,
            agent: agent.to_string(),
            message,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Why a custom agent was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    MissingName,
    MissingPrompt,
    /// Name belongs to a built-in agent.
    ReservedName,
    /// Name already used by an earlier custom agent.
    DuplicateName,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::MissingName => write!(f, "missing name"),
            RejectionReason::MissingPrompt => write!(f, "missing prompt"),
            RejectionReason::ReservedName => write!(f, "name is reserved by a built-in agent"),
            RejectionReason::DuplicateName => write!(f, "duplicate custom agent name"),
        }
    }
}

/// A custom agent entry that was not emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedAgent {
    /// Position in `custom_agents`.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub reason: RejectionReason,
}

impl std::fmt::Display for RejectedAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name {
            Some(ref name) => write!(f, "custom_agents[{}] ({:?}): {}", self.index, name, self.reason),
            None => write!(f, "custom_agents[{}]: {}", self.index, self.reason),
        }
    }
}

/// Composed agents keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AgentSet {
    agents: BTreeMap<String, AgentConfig>,
}

impl AgentSet {
    /// Get an agent by name.
    pub fn get(&self, name: &str) -> Option<&AgentConfig> {
        self.agents.get(name)
    }

    /// Check whether an agent was emitted.
    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// Agent names in key order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    /// Agents in key order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentConfig> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn insert(&mut self, config: AgentConfig) {
        self.agents.insert(config.name.clone(), config);
    }
}

/// Result of a build: the agent set plus everything worth reporting.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub agents: AgentSet,
    pub diagnostics: Vec<Diagnostic>,
    pub rejected: Vec<RejectedAgent>,
    pub pipeline_version: u32,
    /// Resolved model of every processed agent, disabled ones included.
    #[serde(skip)]
    pub models: BTreeMap<String, ResolvedModel>,
}

impl BuildReport {
    /// Whether the build produced no warnings or rejections.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.rejected.is_empty()
    }

    /// Fail if any custom agent was rejected.
    pub fn into_result(self) -> Result<AgentSet> {
        if self.rejected.is_empty() {
            Ok(self.agents)
        } else {
            Err(Error::InvalidCustomAgents(self.rejected))
        }
    }
}

/// Composes the final agent set from a registry and an override document.
pub struct AgentBuilder<'a> {
    registry: &'a Registry,
    document: &'a OverrideDocument,
    prompts: &'a dyn PromptSource,
    skills: &'a dyn SkillPermissions,
    resources: &'a dyn ResourceResolver,
}

impl<'a> AgentBuilder<'a> {
    /// Create a builder with no prompt customizations, skill presets or resources.
    pub fn new(registry: &'a Registry, document: &'a OverrideDocument) -> Self {
        Self {
            registry,
            document,
            prompts: &NoPromptCustomization,
            skills: &NoSkillPresets,
            resources: &NoResources,
        }
    }

    /// Use a prompt customization source.
    pub fn with_prompts(mut self, prompts: &'a dyn PromptSource) -> Self {
        self.prompts = prompts;
        self
    }

    /// Use a skill preset source.
    pub fn with_skills(mut self, skills: &'a dyn SkillPermissions) -> Self {
        self.skills = skills;
        self
    }

    /// Use a resource resolver.
    pub fn with_resources(mut self, resources: &'a dyn ResourceResolver) -> Self {
        self.resources = resources;
        self
    }

    /// Build the agent set.
    ///
    /// Only a cyclic model-fallback table is an error; everything else is
    /// reported in the returned [`BuildReport`].
    pub fn build(&self) -> Result<BuildReport> {
        let order = self.registry.resolution_order()?;
        let (customs, rejected) = self.validate_custom_agents();

        let custom_names: BTreeSet<&str> = customs.iter().map(|spec| spec.name.as_str()).collect();
        let known = |name: &str| self.registry.contains(name) || custom_names.contains(name);

        let mut diagnostics = Vec::new();
        for name in self.document.agents.keys() {
            if !known(name) {
                diagnostics.push(Diagnostic::new(DiagnosticKind::UnknownOverride, name));
            }
        }
        for name in &self.document.disabled_agents {
            if self.registry.is_primary(name) {
                diagnostics.push(Diagnostic::new(DiagnosticKind::PrimaryNotDisableable, name));
            } else if !known(name) {
                diagnostics.push(Diagnostic::new(DiagnosticKind::UnknownDisabled, name));
            }
        }

        for diagnostic in &diagnostics {
            tracing::warn!(kind = %diagnostic.kind, agent = %diagnostic.agent, "{}", diagnostic);
        }

        let drafts = order
            .into_iter()
            .map(|spec| AgentDraft::builtin(spec.clone()))
            .chain(customs.into_iter().map(AgentDraft::custom));

        let mut models = BTreeMap::new();
        let mut agents = AgentSet::default();
        for draft in drafts {
            let draft = self.run_pipeline(draft, &models);
            models.insert(draft.name().to_string(), draft.model.clone());

            if self.is_enabled(draft.name()) {
                agents.insert(draft.into_config());
            } else {
                tracing::debug!(agent = draft.name(), "agent disabled");
            }
        }

        Ok(BuildReport {
            agents,
            diagnostics,
            rejected,
            pipeline_version: PIPELINE_VERSION,
            models,
        })
    }

    fn run_pipeline(
        &self,
        draft: AgentDraft,
        resolved_models: &BTreeMap<String, ResolvedModel>,
    ) -> AgentDraft {
        let ctx = StageContext {
            registry: self.registry,
            document: self.document,
            prompts: self.prompts,
            skills: self.skills,
            resources: self.resources,
            resolved_models,
        };

        PIPELINE.iter().fold(draft, |draft, (stage_name, stage)| {
            tracing::trace!(agent = draft.name(), stage = *stage_name, "running stage");
            stage(&ctx, draft)
        })
    }

    fn is_enabled(&self, name: &str) -> bool {
        self.registry.is_primary(name) || !self.document.is_disabled(name)
    }

    /// Split custom agents into templates and rejections.
    fn validate_custom_agents(&self) -> (Vec<AgentSpec>, Vec<RejectedAgent>) {
        let defaults = self.registry.custom_defaults();
        let mut accepted: Vec<AgentSpec> = Vec::new();
        let mut rejected = Vec::new();

        for (index, custom) in self.document.custom_agents.iter().enumerate() {
            let name = custom.trimmed_name();
            let prompt = custom.prompt.as_deref().filter(|p| !p.trim().is_empty());

            let reason = match (name, prompt) {
                (None, _) => Some(RejectionReason::MissingName),
                (Some(_), None) => Some(RejectionReason::MissingPrompt),
                (Some(name), Some(_)) if self.registry.contains(name) => {
                    Some(RejectionReason::ReservedName)
                }
                (Some(name), Some(_)) if accepted.iter().any(|spec| spec.name == name) => {
                    Some(RejectionReason::DuplicateName)
                }
                _ => None,
            };

            if let Some(reason) = reason {
                let entry = RejectedAgent {
                    index,
                    name: name.map(str::to_string),
                    reason,
                };
                tracing::warn!("rejected custom agent {}", entry);
                rejected.push(entry);
                continue;
            }

            let (Some(name), Some(prompt)) = (name, prompt) else {
                continue;
            };
            let mut spec = AgentSpec::new(
                name,
                custom.description.clone().unwrap_or_default(),
                prompt,
                custom
                    .model
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| defaults.model.clone()),
                custom.temperature.unwrap_or(defaults.temperature),
            );
            spec.color = custom.color.clone();
            accepted.push(spec);
        }

        (accepted, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::definitions::{
        AGENT_CARTOGRAPHER, AGENT_DESIGNER, AGENT_EXPLORER, AGENT_FIXER, AGENT_LIBRARIAN,
        AGENT_NAMES, AGENT_ORACLE, AGENT_ORCHESTRATOR,
    };
    use crate::agents::embedded;
    use crate::agents::permissions::{BASH, EDIT, QUESTION, SKILL, TASK, Verdict, WRITE};
    use crate::agents::prompt::PromptCustomization;
    use crate::agents::resources::ResourceTable;
    use crate::agents::skills::SkillPresetTable;
    use crate::config::schema::CustomAgentSpec;

    fn build(document: &OverrideDocument) -> BuildReport {
        let registry = Registry::builtin();
        AgentBuilder::new(&registry, document).build().unwrap()
    }

    fn hostile_permissions() -> PermissionMap {
        PermissionMap::new()
            .with(EDIT, Verdict::Allow)
            .with(WRITE, Verdict::Allow)
            .with(BASH, Verdict::Allow)
            .with(QUESTION, Verdict::Allow)
            .with_nested(TASK, [("*", Verdict::Allow), (AGENT_FIXER, Verdict::Allow)])
    }

    struct FixedPrompts(PromptCustomization);

    impl PromptSource for FixedPrompts {
        fn customization(&self, agent: &str) -> PromptCustomization {
            if agent == AGENT_ORACLE {
                self.0.clone()
            } else {
                PromptCustomization::default()
            }
        }
    }

    #[test]
    fn test_pipeline_stage_order() {
        let names: Vec<&str> = PIPELINE.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["overrides", "model", "prompt", "permissions", "classify"]
        );
        assert_eq!(PIPELINE_VERSION, 2);
    }

    #[test]
    fn test_default_build_emits_all_builtins() {
        let report = build(&OverrideDocument::new());
        assert!(report.is_clean());
        assert_eq!(report.agents.len(), AGENT_NAMES.len());
        for name in AGENT_NAMES {
            assert!(report.agents.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_unconfigured_prompts_are_verbatim() {
        let report = build(&OverrideDocument::new());
        for spec in embedded::get_all_embedded_agents() {
            let agent = report.agents.get(&spec.name).unwrap();
            assert_eq!(agent.config.prompt, spec.prompt);
            assert_eq!(agent.config.model, spec.model);
            assert_eq!(agent.config.temperature, spec.temperature);
        }
    }

    #[test]
    fn test_prompt_append() {
        let doc = OverrideDocument::new().with_override(
            AGENT_EXPLORER,
            AgentOverride::new().with_prompt_append("Prefer ripgrep."),
        );
        let report = build(&doc);
        let base = embedded::get_embedded_agent(AGENT_EXPLORER).unwrap().prompt;
        assert_eq!(
            report.agents.get(AGENT_EXPLORER).unwrap().config.prompt,
            format!("{}\n\nPrefer ripgrep.", base)
        );
    }

    #[test]
    fn test_prompt_replacement() {
        let doc = OverrideDocument::new().with_override(
            AGENT_ORACLE,
            AgentOverride::new()
                .with_prompt("Only answer yes or no.")
                .with_prompt_append("ignored"),
        );
        let report = build(&doc);
        assert_eq!(
            report.agents.get(AGENT_ORACLE).unwrap().config.prompt,
            "Only answer yes or no."
        );
    }

    #[test]
    fn test_document_prompt_wins_over_prompt_source() {
        let registry = Registry::builtin();
        let prompts = FixedPrompts(PromptCustomization {
            prompt: Some("from file".to_string()),
            append_prompt: Some("file append".to_string()),
        });

        let empty = OverrideDocument::new();
        let report = AgentBuilder::new(&registry, &empty)
            .with_prompts(&prompts)
            .build()
            .unwrap();
        assert_eq!(report.agents.get(AGENT_ORACLE).unwrap().config.prompt, "from file");

        let doc = OverrideDocument::new()
            .with_override(AGENT_ORACLE, AgentOverride::new().with_prompt("from document"));
        let report = AgentBuilder::new(&registry, &doc)
            .with_prompts(&prompts)
            .build()
            .unwrap();
        assert_eq!(
            report.agents.get(AGENT_ORACLE).unwrap().config.prompt,
            "from document"
        );
    }

    #[test]
    fn test_orchestrator_lock_survives_overrides() {
        let doc = OverrideDocument::new().with_override(
            AGENT_ORCHESTRATOR,
            AgentOverride::new().with_permission(hostile_permissions()),
        );
        let report = build(&doc);
        let permission = &report.agents.get(AGENT_ORCHESTRATOR).unwrap().config.permission;
        assert_eq!(permission.verdict(EDIT), Some(Verdict::Deny));
        assert_eq!(permission.verdict(WRITE), Some(Verdict::Deny));
        assert_eq!(permission.verdict(QUESTION), Some(Verdict::Deny));
        // Unlocked keys keep the override
        assert_eq!(permission.verdict(BASH), Some(Verdict::Allow));
    }

    #[test]
    fn test_cartographer_lock_survives_overrides() {
        let registry = Registry::builtin();
        let skills = SkillPresetTable::new().with_defaults(AGENT_CARTOGRAPHER, ["*"]);
        let doc = OverrideDocument::new().with_override(
            AGENT_CARTOGRAPHER,
            AgentOverride::new().with_permission(hostile_permissions()),
        );
        let report = AgentBuilder::new(&registry, &doc)
            .with_skills(&skills)
            .build()
            .unwrap();

        let permission = &report.agents.get(AGENT_CARTOGRAPHER).unwrap().config.permission;
        assert_eq!(permission.verdict(EDIT), Some(Verdict::Deny));
        assert_eq!(permission.verdict(WRITE), Some(Verdict::Deny));
        assert_eq!(permission.verdict(BASH), Some(Verdict::Deny));
        assert_eq!(permission.verdict(QUESTION), Some(Verdict::Allow));

        let task = permission.nested(TASK).unwrap();
        assert_eq!(task.len(), 4);
        assert_eq!(task.get("*"), Some(&Verdict::Deny));
        for delegate in [AGENT_EXPLORER, AGENT_LIBRARIAN, AGENT_ORACLE] {
            assert_eq!(task.get(delegate), Some(&Verdict::Allow));
        }
        assert_eq!(permission.evaluate(TASK, Some(AGENT_FIXER)), Some(Verdict::Deny));
        assert_eq!(permission.evaluate(SKILL, Some("anything")), Some(Verdict::Allow));
    }

    #[test]
    fn test_subagents_get_question_allow() {
        let report = build(&OverrideDocument::new());
        for name in [AGENT_EXPLORER, AGENT_LIBRARIAN, AGENT_ORACLE, AGENT_DESIGNER, AGENT_FIXER] {
            let permission = &report.agents.get(name).unwrap().config.permission;
            assert_eq!(permission.verdict(QUESTION), Some(Verdict::Allow));
        }
    }

    #[test]
    fn test_skill_presets_and_configured_skills() {
        let registry = Registry::builtin();
        let skills = SkillPresetTable::new().with_defaults(AGENT_LIBRARIAN, ["docs"]);
        let doc = OverrideDocument::new()
            .with_override(AGENT_FIXER, AgentOverride::new().with_skills(["git"]));
        let report = AgentBuilder::new(&registry, &doc)
            .with_skills(&skills)
            .build()
            .unwrap();

        let librarian = &report.agents.get(AGENT_LIBRARIAN).unwrap().config.permission;
        assert_eq!(librarian.evaluate(SKILL, Some("docs")), Some(Verdict::Allow));
        assert_eq!(librarian.evaluate(SKILL, Some("git")), Some(Verdict::Deny));

        let fixer = &report.agents.get(AGENT_FIXER).unwrap().config.permission;
        assert_eq!(fixer.evaluate(SKILL, Some("git")), Some(Verdict::Allow));

        let oracle = &report.agents.get(AGENT_ORACLE).unwrap().config.permission;
        assert!(oracle.nested(SKILL).unwrap().is_empty());
    }

    #[test]
    fn test_fixer_inherits_librarian_model() {
        let doc = OverrideDocument::new()
            .with_override(AGENT_LIBRARIAN, AgentOverride::new().with_model("m1"))
            .with_override(AGENT_FIXER, AgentOverride::new());
        let report = build(&doc);
        assert_eq!(report.agents.get(AGENT_LIBRARIAN).unwrap().config.model, "m1");
        assert_eq!(report.agents.get(AGENT_FIXER).unwrap().config.model, "m1");
        assert_eq!(
            report.models[AGENT_FIXER].source,
            ModelSource::Inherited(AGENT_LIBRARIAN.to_string())
        );
    }

    #[test]
    fn test_fixer_keeps_default_with_empty_agents() {
        let report = build(&OverrideDocument::new());
        assert_eq!(
            report.agents.get(AGENT_FIXER).unwrap().config.model,
            embedded::default_model(AGENT_FIXER).unwrap()
        );
    }

    #[test]
    fn test_fixer_inherits_from_disabled_librarian() {
        let doc = OverrideDocument::new()
            .with_override(AGENT_LIBRARIAN, AgentOverride::new().with_model("m1"))
            .with_disabled(AGENT_LIBRARIAN);
        let report = build(&doc);
        assert!(!report.agents.contains(AGENT_LIBRARIAN));
        assert_eq!(report.agents.get(AGENT_FIXER).unwrap().config.model, "m1");
    }

    #[test]
    fn test_disable_removes_exactly_one_agent() {
        let doc = OverrideDocument::new().with_disabled(AGENT_DESIGNER);
        let report = build(&doc);
        assert_eq!(report.agents.len(), AGENT_NAMES.len() - 1);
        assert!(!report.agents.contains(AGENT_DESIGNER));
        assert!(report.is_clean());
    }

    #[test]
    fn test_primary_agents_cannot_be_disabled() {
        let doc = OverrideDocument::new()
            .with_disabled(AGENT_ORCHESTRATOR)
            .with_disabled(AGENT_CARTOGRAPHER)
            .with_disabled("ghost");
        let report = build(&doc);

        assert!(report.agents.contains(AGENT_ORCHESTRATOR));
        assert!(report.agents.contains(AGENT_CARTOGRAPHER));
        let kinds: Vec<DiagnosticKind> = report.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::PrimaryNotDisableable,
                DiagnosticKind::PrimaryNotDisableable,
                DiagnosticKind::UnknownDisabled,
            ]
        );
    }

    #[test]
    fn test_unknown_override_is_reported() {
        let doc = OverrideDocument::new()
            .with_override("librarain", AgentOverride::new().with_model("m1"))
            .with_override("reviewer", AgentOverride::new().with_temperature(0.9))
            .with_custom_agent(CustomAgentSpec::new("reviewer", "Review code."));
        let report = build(&doc);

        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::UnknownOverride);
        assert_eq!(report.diagnostics[0].agent, "librarain");
        assert_eq!(report.agents.get("reviewer").unwrap().config.temperature, 0.9);
    }

    #[test]
    fn test_custom_agent_defaults() {
        let doc = OverrideDocument::new().with_custom_agent(
            CustomAgentSpec::new("  reviewer ", "Review code.").with_description("Reviews diffs"),
        );
        let report = build(&doc);
        let reviewer = report.agents.get("reviewer").unwrap();

        assert_eq!(reviewer.mode, AgentMode::Subagent);
        assert_eq!(reviewer.config.model, embedded::CUSTOM_AGENT_MODEL);
        assert_eq!(reviewer.config.temperature, embedded::CUSTOM_AGENT_TEMPERATURE);
        assert_eq!(reviewer.config.prompt, "Review code.");
        assert_eq!(reviewer.description.as_deref(), Some("Reviews diffs"));
        assert_eq!(reviewer.config.permission.verdict(QUESTION), Some(Verdict::Allow));
        assert_eq!(report.models["reviewer"].source, ModelSource::Custom);
    }

    #[test]
    fn test_custom_agent_explicit_fields_and_override() {
        let mut custom = CustomAgentSpec::new("reviewer", "Review.")
            .with_model("openai/gpt-5.1")
            .with_temperature(0.3);
        custom.color = Some("#FF8800".to_string());
        let doc = OverrideDocument::new()
            .with_custom_agent(custom)
            .with_override("reviewer", AgentOverride::new().with_model("o2"));
        let report = build(&doc);
        let reviewer = report.agents.get("reviewer").unwrap();

        assert_eq!(reviewer.config.model, "o2");
        assert_eq!(reviewer.config.temperature, 0.3);
        assert_eq!(reviewer.color.as_deref(), Some("#FF8800"));
    }

    #[test]
    fn test_custom_agent_rejections() {
        let doc = OverrideDocument::new()
            .with_custom_agent(CustomAgentSpec::new(AGENT_ORACLE, "Impostor."))
            .with_custom_agent(CustomAgentSpec {
                prompt: Some("No name.".to_string()),
                ..Default::default()
            })
            .with_custom_agent(CustomAgentSpec::new("reviewer", "   "))
            .with_custom_agent(CustomAgentSpec::new("tester", "First."))
            .with_custom_agent(CustomAgentSpec::new("tester", "Second."));
        let report = build(&doc);

        let reasons: Vec<(usize, RejectionReason)> =
            report.rejected.iter().map(|r| (r.index, r.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (0, RejectionReason::ReservedName),
                (1, RejectionReason::MissingName),
                (2, RejectionReason::MissingPrompt),
                (4, RejectionReason::DuplicateName),
            ]
        );

        let oracle = report.agents.get(AGENT_ORACLE).unwrap();
        assert_eq!(
            oracle.config.prompt,
            embedded::get_embedded_agent(AGENT_ORACLE).unwrap().prompt
        );
        assert_eq!(report.agents.get("tester").unwrap().config.prompt, "First.");
        assert!(!report.agents.contains("reviewer"));
    }

    #[test]
    fn test_reserved_name_applies_to_disabled_builtins() {
        let doc = OverrideDocument::new()
            .with_disabled(AGENT_DESIGNER)
            .with_custom_agent(CustomAgentSpec::new(AGENT_DESIGNER, "Mine."));
        let report = build(&doc);
        assert!(!report.agents.contains(AGENT_DESIGNER));
        assert_eq!(report.rejected[0].reason, RejectionReason::ReservedName);
    }

    #[test]
    fn test_into_result() {
        assert!(build(&OverrideDocument::new()).into_result().is_ok());

        let doc = OverrideDocument::new().with_custom_agent(CustomAgentSpec::new("x", ""));
        match build(&doc).into_result() {
            Err(Error::InvalidCustomAgents(rejected)) => {
                assert_eq!(rejected.len(), 1);
                assert_eq!(rejected[0].to_string(), r#"custom_agents[0] ("x"): missing prompt"#);
            }
            other => panic!("expected InvalidCustomAgents, got {:?}", other),
        }
    }

    #[test]
    fn test_resources_attached() {
        let registry = Registry::builtin();
        let resources = ResourceTable::new().with_defaults(AGENT_LIBRARIAN, ["websearch"]);
        let doc = OverrideDocument::new()
            .with_override(AGENT_EXPLORER, AgentOverride::new().with_mcps(["grep_app"]));
        let report = AgentBuilder::new(&registry, &doc)
            .with_resources(&resources)
            .build()
            .unwrap();

        assert_eq!(report.agents.get(AGENT_LIBRARIAN).unwrap().mcps, vec!["websearch"]);
        assert_eq!(report.agents.get(AGENT_EXPLORER).unwrap().mcps, vec!["grep_app"]);
        assert!(report.agents.get(AGENT_ORACLE).unwrap().mcps.is_empty());
    }

    #[test]
    fn test_classification() {
        let doc = OverrideDocument::new().with_custom_agent(CustomAgentSpec::new("reviewer", "R."));
        let report = build(&doc);
        for agent in report.agents.iter() {
            let expected = if agent.name == AGENT_ORCHESTRATOR || agent.name == AGENT_CARTOGRAPHER {
                AgentMode::Primary
            } else {
                AgentMode::Subagent
            };
            assert_eq!(agent.mode, expected, "{}", agent.name);
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let doc = OverrideDocument::new()
            .with_override(AGENT_LIBRARIAN, AgentOverride::new().with_model("m1"))
            .with_override(AGENT_EXPLORER, AgentOverride::new().with_prompt_append("x"))
            .with_custom_agent(CustomAgentSpec::new("zeta", "Z."))
            .with_custom_agent(CustomAgentSpec::new("alpha", "A."));

        let first = serde_json::to_string(&build(&doc).agents).unwrap();
        let second = serde_json::to_string(&build(&doc).agents).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_does_not_mutate_input() {
        let doc = OverrideDocument::new()
            .with_override(AGENT_ORCHESTRATOR, AgentOverride::new().with_permission(hostile_permissions()));
        let before = doc.clone();
        let _ = build(&doc);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_agent_set_serializes_as_map() {
        let report = build(&OverrideDocument::new().with_disabled(AGENT_DESIGNER));
        let value = serde_json::to_value(&report.agents).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), AGENT_NAMES.len() - 1);
        assert_eq!(object[AGENT_CARTOGRAPHER]["color"], "#16A34A");
        assert_eq!(object[AGENT_ORCHESTRATOR]["mode"], "primary");
        assert_eq!(object[AGENT_FIXER]["mode"], "subagent");
    }
}
