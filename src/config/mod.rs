//! Configuration loading for roster.
//!
//! A configuration file holds an override document (per-agent overrides,
//! disabled agents, custom agents) plus optional skill presets and resource
//! defaults. Files may be written in KDL, JSON or TOML.
//!
//! ## Locations
//!
//! - System: `$ROSTER_CONFIG_DIR/agents.kdl` or `~/.config/roster/agents.kdl`
//! - Project: `<repo>/.roster/agents.kdl`
//! - Prompts: `<repo>/.roster/prompts/<agent>.md` and `<agent>_append.md`
//!
//! ## Precedence
//!
//! `--config` file > project > system > defaults. Use the [`resolver`] module
//! for layered resolution.

pub mod kdl;
pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_DIR_ENV, ConfigLayer, ConfigPaths, ResolvedConfig, ValueSource, load_config_file,
    resolve_config,
};
pub use schema::{AgentOverride, CustomAgentSpec, OverrideDocument, RosterConfig};
