//! Prompt composition and prompt customization sources.
//!
//! A composed prompt is the base prompt, replaced wholesale when a replacement
//! is configured, or extended with `"\n\n"` plus appended text. Replacement and
//! append text come from the override document first and the
//! [`PromptSource`] collaborator second.

use crate::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Separator inserted between the base prompt and appended text.
pub const APPEND_SEPARATOR: &str = "\n\n";

/// File-based prompt customization for one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptCustomization {
    /// Full replacement for the base prompt.
    pub prompt: Option<String>,
    /// Text appended to the base prompt.
    pub append_prompt: Option<String>,
}

impl PromptCustomization {
    /// Whether neither field is set.
    pub fn is_empty(&self) -> bool {
        self.prompt.is_none() && self.append_prompt.is_none()
    }
}

/// Source of prompt customizations.
pub trait PromptSource: Send + Sync {
    /// Customization for an agent; an empty value means none.
    fn customization(&self, agent: &str) -> PromptCustomization;
}

/// Source with no customizations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPromptCustomization;

impl PromptSource for NoPromptCustomization {
    fn customization(&self, _agent: &str) -> PromptCustomization {
        PromptCustomization::default()
    }
}

/// Prompt customizations read from a directory.
///
/// For each agent, `<dir>/<name>.md` replaces the base prompt and
/// `<dir>/<name>_append.md` is appended to it. Files are read once at load
/// time; missing or blank files count as absent.
#[derive(Debug, Clone, Default)]
pub struct PromptDirectory {
    root: PathBuf,
    entries: BTreeMap<String, PromptCustomization>,
}

impl PromptDirectory {
    /// Load customizations for the given agent names from `root`.
    ///
    /// A missing directory yields an empty source.
    pub fn load<'a>(root: &Path, names: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut entries = BTreeMap::new();

        if root.is_dir() {
            for name in names {
                let customization = PromptCustomization {
                    prompt: read_prompt_file(&root.join(format!("{}.md", name)))?,
                    append_prompt: read_prompt_file(&root.join(format!("{}_append.md", name)))?,
                };
                if !customization.is_empty() {
                    tracing::debug!(agent = name, dir = %root.display(), "loaded prompt customization");
                    entries.insert(name.to_string(), customization);
                }
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            entries,
        })
    }

    /// The directory customizations were loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of agents with at least one customization file.
    pub fn customized_agents(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl PromptSource for PromptDirectory {
    fn customization(&self, agent: &str) -> PromptCustomization {
        self.entries.get(agent).cloned().unwrap_or_default()
    }
}

/// Read a prompt file, trimmed. Missing and blank files are `None`.
fn read_prompt_file(path: &Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let content = content.trim();

    Ok((!content.is_empty()).then(|| content.to_string()))
}

/// Compose a prompt from its base text and optional customization.
///
/// Empty strings count as absent.
pub fn compose_prompt(base: &str, replacement: Option<&str>, append: Option<&str>) -> String {
    let replacement = replacement.filter(|text| !text.is_empty());
    let append = append.filter(|text| !text.is_empty());

    match (replacement, append) {
        (Some(replacement), _) => replacement.to_string(),
        (None, Some(append)) => format!("{}{}{}", base, APPEND_SEPARATOR, append),
        (None, None) => base.to_string(),
    }
}
