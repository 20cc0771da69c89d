//! Layered resolution of roster configuration files.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Explicit file (`--config <path>`), which replaces layers 2 and 3
//! 2. Project file (`<repo>/.roster/agents.{kdl,json,toml}`)
//! 3. System file (`$ROSTER_CONFIG_DIR/agents.*` or `~/.config/roster/agents.*`)
//! 4. Built-in defaults (an empty override document)
//!
//! Within a directory the first existing file in `kdl`, `json`, `toml` order
//! is used.

use crate::config::kdl;
use crate::config::schema::RosterConfig;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable overriding the system configuration directory.
pub const CONFIG_DIR_ENV: &str = "ROSTER_CONFIG_DIR";

/// File stem of configuration files.
pub const CONFIG_FILE_STEM: &str = "agents";

/// Supported configuration file extensions, in lookup order.
pub const CONFIG_EXTENSIONS: &[&str] = &["kdl", "json", "toml"];

/// Per-repository configuration directory.
pub const PROJECT_DIR: &str = ".roster";

/// Prompt customization directory inside the project directory.
pub const PROMPTS_DIR: &str = "prompts";

/// Tracks where a configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// Built-in default
    Default,
    /// System-level configuration file
    System,
    /// Project-level configuration file
    Project,
    /// File passed with `--config`
    Explicit,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::Default => write!(f, "default"),
            ValueSource::System => write!(f, "system"),
            ValueSource::Project => write!(f, "project"),
            ValueSource::Explicit => write!(f, "explicit"),
        }
    }
}

/// A configuration layer location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigLayer {
    pub source: ValueSource,
    pub path: PathBuf,
    pub exists: bool,
}

impl ConfigLayer {
    fn new(source: ValueSource, path: PathBuf) -> Self {
        let exists = path.is_file();
        Self {
            source,
            path,
            exists,
        }
    }
}

/// Locations consulted during resolution.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// System configuration directory, if one can be determined.
    pub system_dir: Option<PathBuf>,
    /// Repository root for project-level files.
    pub repo_root: PathBuf,
    /// Explicit configuration file.
    pub explicit: Option<PathBuf>,
    /// Explicit prompt customization directory.
    pub prompts: Option<PathBuf>,
}

impl ConfigPaths {
    /// Paths for a repository, with the system directory from the environment.
    pub fn for_repo(repo_root: &Path) -> Self {
        Self::new(Self::default_system_dir(), repo_root)
    }

    /// Paths with an explicit system directory.
    pub fn new(system_dir: Option<PathBuf>, repo_root: &Path) -> Self {
        Self {
            system_dir,
            repo_root: repo_root.to_path_buf(),
            explicit: None,
            prompts: None,
        }
    }

    /// Use an explicit configuration file instead of the system and project layers.
    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    /// Use an explicit prompt customization directory.
    pub fn with_prompts(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompts = Some(dir.into());
        self
    }

    /// The system configuration directory: `$ROSTER_CONFIG_DIR`, else `~/.config/roster`.
    pub fn default_system_dir() -> Option<PathBuf> {
        match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => dirs::config_dir().map(|d| d.join("roster")),
        }
    }

    /// The project configuration directory.
    pub fn project_dir(&self) -> PathBuf {
        self.repo_root.join(PROJECT_DIR)
    }

    /// The layers consulted, in application order.
    ///
    /// Directories with no configuration file report the `.kdl` candidate.
    pub fn layers(&self) -> Vec<ConfigLayer> {
        if let Some(ref explicit) = self.explicit {
            return vec![ConfigLayer::new(ValueSource::Explicit, explicit.clone())];
        }

        let mut layers = Vec::new();
        if let Some(ref system_dir) = self.system_dir {
            layers.push(ConfigLayer::new(
                ValueSource::System,
                find_config_file(system_dir),
            ));
        }
        layers.push(ConfigLayer::new(
            ValueSource::Project,
            find_config_file(&self.project_dir()),
        ));
        layers
    }

    /// The prompt customization directory: the explicit one, else the project
    /// `prompts` directory when it exists.
    pub fn prompts_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.prompts {
            return Some(dir.clone());
        }
        let project = self.project_dir().join(PROMPTS_DIR);
        project.is_dir().then_some(project)
    }
}

/// First existing configuration file in `dir`, or the `.kdl` candidate.
fn find_config_file(dir: &Path) -> PathBuf {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", CONFIG_FILE_STEM, ext)))
        .find(|path| path.is_file())
        .unwrap_or_else(|| dir.join(format!("{}.kdl", CONFIG_FILE_STEM)))
}

/// Load a configuration file, choosing the format by extension.
pub fn load_config_file(path: &Path) -> Result<RosterConfig> {
    let content = std::fs::read_to_string(path)?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("kdl") => kdl::parse_config_str(&content, path),
        Some("json") => serde_json::from_str(&content).map_err(|source| Error::Json {
            path: path.display().to_string(),
            source,
        }),
        Some("toml") => toml::from_str(&content).map_err(|source| Error::Toml {
            path: path.display().to_string(),
            source,
        }),
        _ => Err(Error::InvalidInput(format!(
            "Unsupported config format: {}. Expected .kdl, .json or .toml.",
            path.display()
        ))),
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    /// Merged configuration.
    pub config: RosterConfig,
    /// Layers that were loaded, in application order.
    pub loaded: Vec<ConfigLayer>,
    /// Highest-precedence layer that configured each agent override.
    pub agent_sources: BTreeMap<String, ValueSource>,
    /// Prompt customization directory, if any.
    pub prompts_dir: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Where an agent's override came from; `Default` when it has none.
    pub fn source_for(&self, agent: &str) -> ValueSource {
        self.agent_sources
            .get(agent)
            .copied()
            .unwrap_or(ValueSource::Default)
    }

    fn apply(&mut self, layer: ConfigLayer, config: RosterConfig) {
        for name in config.document.agents.keys() {
            self.agent_sources.insert(name.clone(), layer.source);
        }
        self.config.merge(&config);
        self.loaded.push(layer);
    }
}

/// Resolve configuration with full precedence chain.
///
/// A missing system or project file is skipped; a missing explicit file is
/// an error.
pub fn resolve_config(paths: &ConfigPaths) -> Result<ResolvedConfig> {
    let mut resolved = ResolvedConfig {
        prompts_dir: paths.prompts_dir(),
        ..Default::default()
    };

    for layer in paths.layers() {
        if !layer.exists {
            if layer.source == ValueSource::Explicit {
                return Err(Error::NotFound(format!(
                    "config file {}",
                    layer.path.display()
                )));
            }
            continue;
        }

        tracing::debug!(source = %layer.source, path = %layer.path.display(), "loading config layer");
        let config = load_config_file(&layer.path)?;
        resolved.apply(layer, config);
    }

    Ok(resolved)
}
