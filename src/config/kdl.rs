//! KDL parsing for roster configuration files.
//!
//! # KDL Schema
//!
//! ```kdl
//! agent "librarian" {
//!     model "openai/gpt-5.1"
//!     temperature 0.2
//!     prompt "Full replacement prompt"
//!     prompt-append "Extra instructions"
//!     skills "docs" "search"
//!     mcps "websearch" "context7"
//!     permission {
//!         bash "ask"
//!         skill {
//!             git "allow"
//!         }
//!     }
//! }
//!
//! disabled-agents "designer"
//!
//! custom-agent "reviewer" {
//!     description "Reviews diffs"
//!     model "openai/gpt-5.1"
//!     temperature 0.3
//!     prompt "You review code."
//!     color "#FF8800"
//! }
//!
//! skill-presets {
//!     librarian "docs" "search"
//! }
//!
//! resources {
//!     librarian "websearch"
//! }
//! ```
//!
//! Unknown nodes are ignored for forward compatibility. Values of the wrong
//! type are rejected.

use crate::agents::permissions::{PermissionMap, Verdict};
use crate::config::schema::{AgentOverride, CustomAgentSpec, RosterConfig};
use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use std::collections::BTreeMap;
use std::path::Path;

/// Parse a roster configuration from KDL source text.
///
/// `path` is only used in error messages.
pub fn parse_config_str(content: &str, path: &Path) -> Result<RosterConfig> {
    let doc: KdlDocument = content.parse().map_err(|e: kdl::KdlError| Error::Kdl {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_config(&doc)
}

/// Parse a roster configuration from a KDL document.
pub fn parse_config(doc: &KdlDocument) -> Result<RosterConfig> {
    let mut config = RosterConfig::new();

    for node in doc.nodes() {
        match node.name().value() {
            "agent" => {
                let name = string_arg(node)?.ok_or_else(|| {
                    Error::InvalidInput("agent node must have a name argument".to_string())
                })?;
                let agent = parse_agent_node(node)?;
                config
                    .document
                    .agents
                    .entry(name)
                    .or_default()
                    .merge(&agent);
            }
            "disabled-agents" => {
                for name in string_args(node)? {
                    if !config.document.is_disabled(&name) {
                        config.document.disabled_agents.push(name);
                    }
                }
            }
            "custom-agent" => {
                config
                    .document
                    .custom_agents
                    .push(parse_custom_agent_node(node)?);
            }
            "skill-presets" => {
                for child in child_nodes(node) {
                    config
                        .skill_presets
                        .set_defaults(child.name().value(), string_args(child)?);
                }
            }
            "resources" => {
                for child in child_nodes(node) {
                    config
                        .resources
                        .set_defaults(child.name().value(), string_args(child)?);
                }
            }
            _ => {
                // Ignore unknown nodes for forward compatibility
            }
        }
    }

    Ok(config)
}

/// Parse the body of an `agent` block.
fn parse_agent_node(node: &KdlNode) -> Result<AgentOverride> {
    let mut agent = AgentOverride::new();

    for child in child_nodes(node) {
        match child.name().value() {
            "model" => agent.model = string_arg(child)?,
            "temperature" => agent.temperature = float_arg(child)?,
            "prompt" => agent.prompt = string_arg(child)?,
            "prompt-append" => agent.prompt_append = string_arg(child)?,
            "skills" => agent.skills = Some(string_args(child)?),
            "mcps" => agent.mcps = Some(string_args(child)?),
            "permission" => agent.permission = Some(parse_permission_node(child)?),
            _ => {
                // Ignore unknown fields
            }
        }
    }

    Ok(agent)
}

/// Parse a `custom-agent` block. Missing fields stay `None` for the builder to report.
fn parse_custom_agent_node(node: &KdlNode) -> Result<CustomAgentSpec> {
    let mut custom = CustomAgentSpec {
        name: string_arg(node)?,
        ..Default::default()
    };

    for child in child_nodes(node) {
        match child.name().value() {
            "description" => custom.description = string_arg(child)?,
            "model" => custom.model = string_arg(child)?,
            "temperature" => custom.temperature = float_arg(child)?,
            "prompt" => custom.prompt = string_arg(child)?,
            "color" => custom.color = string_arg(child)?,
            _ => {}
        }
    }

    Ok(custom)
}

/// Parse a `permission` block.
///
/// A child with a string argument is a scalar verdict; a child with a block
/// is a nested map of verdicts.
fn parse_permission_node(node: &KdlNode) -> Result<PermissionMap> {
    let mut permission = PermissionMap::new();

    for child in child_nodes(node) {
        let capability = child.name().value();
        if child.children().is_some() {
            let mut nested = BTreeMap::new();
            for entry in child_nodes(child) {
                nested.insert(entry.name().value().to_string(), verdict_arg(entry)?);
            }
            permission.set_nested(capability, nested);
        } else {
            permission.set(capability, verdict_arg(child)?);
        }
    }

    Ok(permission)
}

/// Child nodes of a block, empty if the node has none.
fn child_nodes(node: &KdlNode) -> impl Iterator<Item = &KdlNode> {
    node.children().into_iter().flat_map(|doc| doc.nodes())
}

/// Positional arguments of a node (properties are skipped).
fn args(node: &KdlNode) -> impl Iterator<Item = &KdlEntry> {
    node.entries().iter().filter(|e| e.name().is_none())
}

fn type_error(node: &KdlNode, expected: &str, value: &KdlValue) -> Error {
    Error::InvalidInput(format!(
        "'{}' expects {}, got {}",
        node.name().value(),
        expected,
        value
    ))
}

/// Get the string argument from a node's first entry.
fn string_arg(node: &KdlNode) -> Result<Option<String>> {
    match args(node).next() {
        None => Ok(None),
        Some(entry) => entry
            .value()
            .as_string()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| type_error(node, "a string", entry.value())),
    }
}

/// Get all string arguments of a node.
fn string_args(node: &KdlNode) -> Result<Vec<String>> {
    args(node)
        .map(|entry| {
            entry
                .value()
                .as_string()
                .map(str::to_string)
                .ok_or_else(|| type_error(node, "strings", entry.value()))
        })
        .collect()
}

/// Get a numeric argument from a node's first entry. Integers are accepted.
fn float_arg(node: &KdlNode) -> Result<Option<f64>> {
    match args(node).next() {
        None => Ok(None),
        Some(entry) => {
            let value = entry.value();
            value
                .as_float()
                .or_else(|| value.as_integer().map(|i| i as f64))
                .map(Some)
                .ok_or_else(|| type_error(node, "a number", value))
        }
    }
}

/// Get a verdict from a node's first string argument.
fn verdict_arg(node: &KdlNode) -> Result<Verdict> {
    string_arg(node)?
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "permission '{}' must have a verdict",
                node.name().value()
            ))
        })?
        .parse()
}
