//! `droplog create` command handler

use std::io::Write;

use serde::Serialize;

use droplog_core::config::DroplogConfig;
use droplog_ruleset::{CreateReport, LogRuleManager, RuleSetIo};

use crate::commands::build_manager;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `create` command against the live rule set.
pub async fn execute(
    config: &DroplogConfig,
    dry_run: bool,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let manager = build_manager(config)?;
    let summary = run(&manager, dry_run).await?;
    writer.render(&summary)
}

/// Run the insertion pass through any rule set backend.
pub async fn run<R: RuleSetIo>(
    manager: &LogRuleManager<R>,
    dry_run: bool,
) -> Result<CreateSummary, CliError> {
    let report = manager.create(dry_run).await?;
    Ok(CreateSummary::from(report))
}

/// Result of a `create` run.
#[derive(Debug, Serialize)]
pub struct CreateSummary {
    /// Lines read from the rule set dump
    pub lines_read: usize,
    /// Number of log rules added
    pub added_count: usize,
    /// Log rules added, in rule set order
    pub added: Vec<String>,
    /// Whether the new rule set was applied
    pub applied: bool,
    pub dry_run: bool,
}

impl From<CreateReport> for CreateSummary {
    fn from(report: CreateReport) -> Self {
        Self {
            lines_read: report.lines_read,
            added_count: report.added.len(),
            added: report.added,
            applied: report.applied,
            dry_run: report.dry_run,
        }
    }
}

impl Render for CreateSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for rule in &self.added {
            writeln!(w, "{} {}", "ADD RULE:".green().bold(), rule)?;
        }

        if self.added.is_empty() {
            writeln!(w, "no new log rules, not updating iptables")?;
        } else if self.dry_run {
            writeln!(
                w,
                "{} {} log rule(s) would be added",
                "DRY RUN:".yellow().bold(),
                self.added_count
            )?;
        } else {
            writeln!(w, "{} log rule(s) added", self.added_count)?;
        }

        Ok(())
    }
}
