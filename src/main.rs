//! Roster CLI - compose agent configurations from built-in templates and overrides.

use clap::Parser;
use roster::cli::{AgentCommands, Cli, Commands, ConfigCommands};
use roster::commands::{self, CommandResult};
use roster::config::ConfigPaths;
use roster::logging;
use std::env;
use std::path::PathBuf;
use std::process;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    if let Err(e) = logging::init_logging(cli.log_format, cli.verbose) {
        eprintln!("warning: {}", e);
    }

    // Determine repo path: --repo flag > ROSTER_REPO env > auto-detect > cwd
    let repo_path = resolve_repo_path(cli.repo_path, human);

    let mut paths = ConfigPaths::for_repo(&repo_path);
    if let Some(config) = cli.config {
        paths = paths.with_explicit(config);
    }
    if let Some(prompts) = cli.prompts {
        paths = paths.with_prompts(prompts);
    }

    match run_command(cli.command, &paths, human) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            if human {
                eprintln!("Error: {}", e);
            } else {
                eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
            }
            process::exit(1);
        }
    }
}

/// Resolve the repository path based on explicit flag, environment variable, or auto-detection.
///
/// When an explicit path is provided (via -C/--repo or ROSTER_REPO), it is used literally.
/// Otherwise the nearest ancestor holding `.roster` or `.git` is used, falling back to the
/// current directory.
fn resolve_repo_path(explicit_path: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit_path {
        Some(path) => {
            if !path.exists() {
                let message = format!("Specified repo path does not exist: {}", path.display());
                if human {
                    eprintln!("Error: {}", message);
                } else {
                    eprintln!("{}", serde_json::json!({ "error": message }));
                }
                process::exit(1);
            }
            path
        }
        None => {
            let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            commands::find_repo_root(&cwd).unwrap_or(cwd)
        }
    }
}

/// Run a command. Returns `Ok(false)` when the command succeeded but reported failure.
fn run_command(command: Commands, paths: &ConfigPaths, human: bool) -> roster::Result<bool> {
    match command {
        Commands::Agents { command } => match command {
            AgentCommands::List => output(&commands::agents_list()?, human),
            AgentCommands::Show { name } => output(&commands::agents_show(paths, &name)?, human),
        },
        Commands::Build { strict } => output(&commands::build(paths, strict)?, human),
        Commands::Config { command } => match command {
            ConfigCommands::Check => {
                let result = commands::config_check(paths)?;
                output(&result, human);
                return Ok(result.valid);
            }
            ConfigCommands::Paths => output(&commands::config_paths(paths)?, human),
        },
    }

    Ok(true)
}

/// Print output in JSON or human-readable format.
fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
