//! Permission maps and the layered permission composer.
//!
//! A permission map associates a capability (tool) name with either a single
//! [`Verdict`] or a nested map of verdicts. Two capabilities use the nested
//! form:
//! - `skill`: verdicts keyed by skill name
//! - `task`: verdicts keyed by delegate agent name, where `*` is the default
//!
//! The final map for an agent is built from four ordered layers, later layers
//! winning on key conflicts:
//!
//! 1. **Base** - entries already present on the agent record and the
//!    caller's permission overrides
//! 2. **Baseline** - `question = allow`
//! 3. **Skills** - skill presets merged into the `skill` sub-map
//! 4. **Role lock** - fixed entries for locked roles, see [`RoleLock`]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Capability key for the question tool.
pub const QUESTION: &str = "question";
/// Capability key for the edit tool.
pub const EDIT: &str = "edit";
/// Capability key for the write tool.
pub const WRITE: &str = "write";
/// Capability key for shell access.
pub const BASH: &str = "bash";
/// Capability key for the nested skill permissions.
pub const SKILL: &str = "skill";
/// Capability key for the nested task (delegation) permissions.
pub const TASK: &str = "task";
/// Wildcard key inside nested permission maps.
pub const WILDCARD: &str = "*";

/// Permission verdict for a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    Deny,
    Ask,
}

impl Verdict {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Allow => "allow",
            Verdict::Deny => "deny",
            Verdict::Ask => "ask",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Verdict {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" => Ok(Verdict::Allow),
            "deny" => Ok(Verdict::Deny),
            "ask" => Ok(Verdict::Ask),
            _ => Err(crate::Error::InvalidInput(format!(
                "Invalid permission verdict: '{}'. Expected 'allow', 'deny' or 'ask'.",
                s
            ))),
        }
    }
}

/// A permission entry: a single verdict or a nested map of verdicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionValue {
    Verdict(Verdict),
    Nested(BTreeMap<String, Verdict>),
}

impl From<Verdict> for PermissionValue {
    fn from(verdict: Verdict) -> Self {
        PermissionValue::Verdict(verdict)
    }
}

impl From<BTreeMap<String, Verdict>> for PermissionValue {
    fn from(nested: BTreeMap<String, Verdict>) -> Self {
        PermissionValue::Nested(nested)
    }
}

/// Ordered mapping from capability name to permission entry.
///
/// Ordering is by key so that serialized output is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap(BTreeMap<String, PermissionValue>);

impl PermissionMap {
    /// Create an empty permission map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: set a scalar verdict.
    pub fn with(mut self, capability: impl Into<String>, verdict: Verdict) -> Self {
        self.set(capability, verdict);
        self
    }

    /// Builder-style: set a nested entry.
    pub fn with_nested<K, I>(mut self, capability: impl Into<String>, entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Verdict)>,
    {
        let nested = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.0.insert(capability.into(), PermissionValue::Nested(nested));
        self
    }

    /// Set a scalar verdict, replacing any existing entry.
    pub fn set(&mut self, capability: impl Into<String>, verdict: Verdict) {
        self.0.insert(capability.into(), PermissionValue::Verdict(verdict));
    }

    /// Replace a capability with a nested map.
    pub fn set_nested(&mut self, capability: impl Into<String>, nested: BTreeMap<String, Verdict>) {
        self.0.insert(capability.into(), PermissionValue::Nested(nested));
    }

    /// Merge entries key by key into a nested capability.
    ///
    /// Existing nested entries are kept unless replaced. A scalar entry under
    /// the same capability is discarded in favour of the nested map.
    pub fn merge_nested(&mut self, capability: &str, entries: &BTreeMap<String, Verdict>) {
        let mut nested = match self.0.remove(capability) {
            Some(PermissionValue::Nested(existing)) => existing,
            _ => BTreeMap::new(),
        };
        nested.extend(entries.iter().map(|(k, v)| (k.clone(), *v)));
        self.0
            .insert(capability.to_string(), PermissionValue::Nested(nested));
    }

    /// Overlay another map onto this one.
    ///
    /// Scalars replace whatever was there. Nested maps merge key by key into an
    /// existing nested map, or replace a scalar.
    pub fn overlay(&mut self, other: &PermissionMap) {
        for (capability, value) in &other.0 {
            match value {
                PermissionValue::Verdict(verdict) => self.set(capability.clone(), *verdict),
                PermissionValue::Nested(entries) => self.merge_nested(capability, entries),
            }
        }
    }

    /// Get the raw entry for a capability.
    pub fn get(&self, capability: &str) -> Option<&PermissionValue> {
        self.0.get(capability)
    }

    /// Get the scalar verdict for a capability, if it is a scalar.
    pub fn verdict(&self, capability: &str) -> Option<Verdict> {
        match self.0.get(capability) {
            Some(PermissionValue::Verdict(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get the nested map for a capability, if it is nested.
    pub fn nested(&self, capability: &str) -> Option<&BTreeMap<String, Verdict>> {
        match self.0.get(capability) {
            Some(PermissionValue::Nested(map)) => Some(map),
            _ => None,
        }
    }

    /// Evaluate the effective verdict for a capability.
    ///
    /// For nested entries, `target` selects the specific key and falls back to
    /// the `*` wildcard. A scalar entry applies to every target.
    pub fn evaluate(&self, capability: &str, target: Option<&str>) -> Option<Verdict> {
        match self.0.get(capability)? {
            PermissionValue::Verdict(v) => Some(*v),
            PermissionValue::Nested(map) => target
                .and_then(|t| map.get(t))
                .or_else(|| map.get(WILDCARD))
                .copied(),
        }
    }

    /// Check whether a capability has an entry.
    pub fn contains(&self, capability: &str) -> bool {
        self.0.contains_key(capability)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PermissionValue)> {
        self.0.iter()
    }
}

/// Non-configurable permission policy attached to a role.
///
/// Selected once per agent in the registry table. The composer applies it as
/// the final layer, so nothing upstream (presets or caller overrides) can
/// loosen a locked entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RoleLock {
    /// Ordinary agent: no locked entries.
    #[default]
    None,
    /// Unattended executor: never edits files directly and never blocks on a question.
    Autonomous,
    /// Read-only planner: no mutation, no shell, and delegation restricted to
    /// an allow-list of read-only collaborators.
    ReadOnlyPlanner {
        /// Agents the planner may delegate to; everything else is denied.
        delegates: Vec<String>,
    },
}

impl RoleLock {
    /// Apply the locked entries to a permission map.
    pub fn apply(&self, permissions: &mut PermissionMap) {
        match self {
            RoleLock::None => {}
            RoleLock::Autonomous => {
                permissions.set(EDIT, Verdict::Deny);
                permissions.set(WRITE, Verdict::Deny);
                permissions.set(QUESTION, Verdict::Deny);
            }
            RoleLock::ReadOnlyPlanner { delegates } => {
                permissions.set(EDIT, Verdict::Deny);
                permissions.set(WRITE, Verdict::Deny);
                permissions.set(BASH, Verdict::Deny);
                permissions.set(QUESTION, Verdict::Allow);

                let mut task = BTreeMap::new();
                task.insert(WILDCARD.to_string(), Verdict::Deny);
                for delegate in delegates {
                    task.insert(delegate.clone(), Verdict::Allow);
                }
                permissions.set_nested(TASK, task);
            }
        }
    }

    /// Capability keys this lock pins.
    pub fn locked_capabilities(&self) -> &'static [&'static str] {
        match self {
            RoleLock::None => &[],
            RoleLock::Autonomous => &[EDIT, WRITE, QUESTION],
            RoleLock::ReadOnlyPlanner { .. } => &[EDIT, WRITE, BASH, QUESTION, TASK],
        }
    }

    /// Whether this lock pins any entries.
    pub fn is_locked(&self) -> bool {
        !matches!(self, RoleLock::None)
    }

    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            RoleLock::None => "none",
            RoleLock::Autonomous => "autonomous",
            RoleLock::ReadOnlyPlanner { .. } => "read-only-planner",
        }
    }
}

impl std::fmt::Display for RoleLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Compose the final permission map for one agent.
///
/// `base` is the agent record's own entries, `overrides` the caller's
/// permission entries for the agent and `skills` the resolved skill preset.
/// Inputs are borrowed; a fresh map is returned.
pub fn compose_permissions(
    base: &PermissionMap,
    overrides: Option<&PermissionMap>,
    skills: &BTreeMap<String, Verdict>,
    lock: &RoleLock,
) -> PermissionMap {
    // Layer 1: base entries
    let mut permissions = base.clone();
    if let Some(overrides) = overrides {
        permissions.overlay(overrides);
    }

    // Layer 2: baseline
    permissions.set(QUESTION, Verdict::Allow);

    // Layer 3: skill presets
    permissions.merge_nested(SKILL, skills);

    // Layer 4: role lock
    lock.apply(&mut permissions);

    permissions
}
