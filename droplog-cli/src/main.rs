//! droplog -- adds rate-limited LOG rules in front of iptables DROP rules
//! so that dropped packets show up in the kernel log, tagged with the rule id.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use droplog_core::config::{DroplogConfig, GeneralConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

/// Exit code for argument errors (same as [`CliError::Command`]).
const USAGE_EXIT_CODE: u8 = 4;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return parse_error_exit(&e),
    };
    let writer = OutputWriter::new(cli.output);

    match run(&cli, &writer).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            error!(error = %e, exit_code = code, "droplog failed");
            eprintln!("error: {e}");
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

/// clap exits with 2 on usage errors, which collides with the apply-failure code.
/// Help output exits 0, every other parse error exits with [`USAGE_EXIT_CODE`].
fn parse_error_exit(e: &clap::Error) -> ExitCode {
    if e.print().is_err() {
        return ExitCode::from(USAGE_EXIT_CODE);
    }
    if e.use_stderr() {
        ExitCode::from(USAGE_EXIT_CODE)
    } else {
        ExitCode::SUCCESS
    }
}

async fn run(cli: &Cli, writer: &OutputWriter) -> Result<(), CliError> {
    let command = cli.resolve_command()?;

    match command {
        Commands::Version => commands::version::execute(writer),
        Commands::Config(args) => {
            let mut general = GeneralConfig::default();
            if let Some(level) = &cli.log_level {
                general.log_level = level.clone();
            }
            logging::init_tracing(&general)?;
            commands::config::execute(args, cli.config.as_deref(), writer).await
        }
        Commands::Create | Commands::Delete => {
            let mut config = DroplogConfig::load_or_default(cli.config.as_deref()).await?;
            if let Some(level) = &cli.log_level {
                config.general.log_level = level.clone();
            }
            logging::init_tracing(&config.general)?;

            info!(
                command = command.name(),
                dry_run = cli.dry_run,
                chains = config.chains.len(),
                "droplog starting"
            );

            if command == Commands::Delete {
                commands::delete::execute(&config, cli.dry_run, writer).await
            } else {
                commands::create::execute(&config, cli.dry_run, writer).await
            }
        }
    }
}
