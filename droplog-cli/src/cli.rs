//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O, apart from resolving the
//! legacy short flags (`-d`, `-v`) into a subcommand.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::CliError;

/// droplog -- log iptables DROP rules before they drop.
///
/// Without a subcommand, adds a rate-limited LOG rule in front of every
/// commented DROP rule in the tracked chains.
#[derive(Parser, Debug)]
#[command(name = "droplog", about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Path to a droplog.toml configuration file (defaults + env overrides if omitted).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level.
    #[arg(long, global = true, value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Compute the new rule set without applying it.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Delete previously added log rules (same as `droplog delete`).
    #[arg(short = 'd')]
    pub delete: bool,

    /// Print version and build commit (same as `droplog version`).
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Add LOG rules in front of tracked DROP rules (default).
    Create,

    /// Remove every LOG rule previously added by droplog.
    Delete,

    /// Print version and build commit.
    Version,

    /// Inspect configuration.
    Config(ConfigArgs),
}

// ---- config ----

/// Inspect droplog configuration.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Validate the configuration and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, iptables, logging, chains).
        #[arg(long)]
        section: Option<String>,
    },
}

impl Cli {
    /// Resolve the flags and optional subcommand into the command to run.
    ///
    /// `-v` wins over everything else. `-d` selects `delete` and conflicts
    /// with any other explicit subcommand.
    pub fn resolve_command(&self) -> Result<Commands, CliError> {
        if self.version {
            return Ok(Commands::Version);
        }

        match (&self.command, self.delete) {
            (None, false) => Ok(Commands::Create),
            (None, true) | (Some(Commands::Delete), true) => Ok(Commands::Delete),
            (Some(command), false) => Ok(command.clone()),
            (Some(command), true) => Err(CliError::Command(format!(
                "-d cannot be combined with the '{}' subcommand",
                command.name()
            ))),
        }
    }
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Version => "version",
            Self::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("parse succeeded")
    }

    #[test]
    fn test_cli_no_arguments_is_create() {
        let cli = parse(&["droplog"]);
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
        assert_eq!(cli.resolve_command().expect("resolves"), Commands::Create);
    }

    #[test]
    fn test_cli_short_delete_flag() {
        let cli = parse(&["droplog", "-d"]);
        assert!(cli.delete, "delete flag should be set");
        assert_eq!(cli.resolve_command().expect("resolves"), Commands::Delete);
    }

    #[test]
    fn test_cli_delete_subcommand() {
        let cli = parse(&["droplog", "delete"]);
        assert_eq!(cli.resolve_command().expect("resolves"), Commands::Delete);
    }

    #[test]
    fn test_cli_delete_flag_with_delete_subcommand() {
        let cli = parse(&["droplog", "-d", "delete"]);
        assert_eq!(cli.resolve_command().expect("resolves"), Commands::Delete);
    }

    #[test]
    fn test_cli_delete_flag_conflicts_with_create() {
        let cli = parse(&["droplog", "-d", "create"]);
        let err = cli.resolve_command().expect_err("should conflict");
        assert!(err.to_string().contains("create"));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_cli_short_version_flag() {
        let cli = parse(&["droplog", "-v"]);
        assert_eq!(cli.resolve_command().expect("resolves"), Commands::Version);
    }

    #[test]
    fn test_cli_version_wins_over_delete() {
        let cli = parse(&["droplog", "-v", "-d"]);
        assert_eq!(cli.resolve_command().expect("resolves"), Commands::Version);
    }

    #[test]
    fn test_cli_version_subcommand() {
        let cli = parse(&["droplog", "version"]);
        assert_eq!(cli.resolve_command().expect("resolves"), Commands::Version);
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let cli = parse(&[
            "droplog",
            "create",
            "--dry-run",
            "--output",
            "json",
            "-c",
            "/etc/droplog.toml",
            "--log-level",
            "debug",
        ]);
        assert!(cli.dry_run);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/droplog.toml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_rejects_unknown_log_level() {
        let result = Cli::try_parse_from(["droplog", "--log-level", "verbose"]);
        assert!(result.is_err(), "unknown log level should be rejected");
    }

    #[test]
    fn test_cli_rejects_unknown_output_format() {
        let result = Cli::try_parse_from(["droplog", "--output", "yaml"]);
        assert!(result.is_err(), "unknown output format should be rejected");
    }

    #[test]
    fn test_cli_parse_config_validate() {
        let cli = parse(&["droplog", "config", "validate"]);
        match cli.resolve_command().expect("resolves") {
            Commands::Config(args) => assert_eq!(args.action, ConfigAction::Validate),
            other => panic!("expected Config command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = parse(&["droplog", "config", "show", "--section", "chains"]);
        match cli.command {
            Some(Commands::Config(ConfigArgs {
                action: ConfigAction::Show { section },
            })) => assert_eq!(section.as_deref(), Some("chains")),
            other => panic!("expected config show, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_config_requires_action() {
        let result = Cli::try_parse_from(["droplog", "config"]);
        assert!(result.is_err(), "config without action should fail");
    }

    #[test]
    fn test_cli_command_structure_is_valid() {
        Cli::command().debug_assert();
    }
}
