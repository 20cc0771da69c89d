//! CLI argument definitions for roster.

use crate::logging::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Version string including the git commit, when known.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("ROSTER_GIT_COMMIT"),
    ")"
);

/// Long version string, adding the build timestamp.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("ROSTER_GIT_COMMIT"),
    ", built ",
    env!("ROSTER_BUILD_TIMESTAMP"),
    ")"
);

/// Roster - compose agent configurations from built-in templates and overrides.
///
/// Start with `roster agents list` to see the built-in agents, then `roster build`
/// to produce the composed configuration.
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version = VERSION, long_version = LONG_VERSION, about = "Compose agent configurations from built-in templates and overrides", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if roster was started in <path> instead of the current directory.
    /// Project configuration is read from <path>/.roster.
    /// Can also be set via ROSTER_REPO environment variable.
    #[arg(short = 'C', long = "repo", global = true, env = "ROSTER_REPO")]
    pub repo_path: Option<PathBuf>,

    /// Read configuration from this file only (.kdl, .json or .toml),
    /// ignoring the system and project files
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory of prompt customizations (<agent>.md, <agent>_append.md)
    #[arg(long = "prompts", global = true)]
    pub prompts: Option<PathBuf>,

    /// Enable debug logging on stderr (ROSTER_LOG takes precedence)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long = "log-format", global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Built-in agent inspection
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },

    /// Compose the full agent configuration
    ///
    /// Prints the name -> configuration mapping consumed by the host runtime.
    Build {
        /// Fail if any custom agent is rejected
        #[arg(long)]
        strict: bool,
    },

    /// Configuration inspection
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Agent subcommands
#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// List built-in agents with their defaults
    List,

    /// Show the composed configuration of one agent
    Show {
        /// Agent name (built-in or custom)
        name: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration and report diagnostics (exit 1 on rejected agents)
    Check,

    /// Show configuration file locations
    Paths,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "roster",
            "build",
            "--strict",
            "-H",
            "--config",
            "agents.kdl",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert!(cli.human_readable);
        assert_eq!(cli.config, Some(PathBuf::from("agents.kdl")));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Build { strict: true }));
    }

    #[test]
    fn test_parse_agent_show() {
        let cli = Cli::try_parse_from(["roster", "agents", "show", "fixer"]).unwrap();
        match cli.command {
            Commands::Agents {
                command: AgentCommands::Show { name },
            } => assert_eq!(name, "fixer"),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
