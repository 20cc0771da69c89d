//! Roster - deterministic agent configuration composition.
//!
//! This library turns the built-in agent templates, a caller-supplied override
//! document, skill-permission presets and the static role classification into
//! the final set of agent configuration records consumed by a host runtime.
//! It also provides the configuration loading and CLI plumbing behind the
//! `roster` binary.

pub mod agents;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

use agents::builder::RejectedAgent;

/// Library-level error type for Roster operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse KDL in {path}: {message}")]
    Kdl { path: String, message: String },

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cycle detected in model fallback dependencies")]
    CycleDetected,

    #[error("Invalid custom agents: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    InvalidCustomAgents(Vec<RejectedAgent>),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Roster operations.
pub type Result<T> = std::result::Result<T, Error>;
