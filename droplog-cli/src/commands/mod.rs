//! Command handlers -- one module per subcommand

pub mod config;
pub mod create;
pub mod delete;
pub mod version;

use droplog_core::config::DroplogConfig;
use droplog_ruleset::{IptablesRuleSet, LogRuleManager};

use crate::error::CliError;

/// Build a manager backed by iptables-save / iptables-restore.
pub fn build_manager(
    config: &DroplogConfig,
) -> Result<LogRuleManager<IptablesRuleSet>, CliError> {
    let io = IptablesRuleSet::from_config(&config.iptables);
    Ok(LogRuleManager::from_config(io, config)?)
}
