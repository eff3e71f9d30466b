//! `droplog delete` command handler

use std::io::Write;

use serde::Serialize;

use droplog_core::config::DroplogConfig;
use droplog_ruleset::{DeleteReport, LogRuleManager, RuleSetIo};

use crate::commands::build_manager;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `delete` command against the live rule set.
pub async fn execute(
    config: &DroplogConfig,
    dry_run: bool,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let manager = build_manager(config)?;
    let summary = run(&manager, dry_run).await?;
    writer.render(&summary)
}

/// Run the removal pass through any rule set backend.
pub async fn run<R: RuleSetIo>(
    manager: &LogRuleManager<R>,
    dry_run: bool,
) -> Result<DeleteSummary, CliError> {
    let report = manager.delete(dry_run).await?;
    Ok(DeleteSummary::from(report))
}

/// Result of a `delete` run.
#[derive(Debug, Serialize)]
pub struct DeleteSummary {
    pub lines_read: usize,
    pub removed_count: usize,
    pub removed: Vec<String>,
    pub applied: bool,
    pub dry_run: bool,
}

impl From<DeleteReport> for DeleteSummary {
    fn from(report: DeleteReport) -> Self {
        Self {
            lines_read: report.lines_read,
            removed_count: report.removed.len(),
            removed: report.removed,
            applied: report.applied,
            dry_run: report.dry_run,
        }
    }
}

impl Render for DeleteSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for rule in &self.removed {
            writeln!(w, "{} {}", "DELETE RULE:".red().bold(), rule)?;
        }

        if self.dry_run {
            writeln!(
                w,
                "{} {} log rule(s) would be removed",
                "DRY RUN:".yellow().bold(),
                self.removed_count
            )?;
        } else {
            writeln!(w, "{} log rule(s) removed", self.removed_count)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(summary: &DeleteSummary) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        summary
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_render_removed_rules() {
        let summary = DeleteSummary::from(DeleteReport {
            lines_read: 4,
            removed: vec![r#"-A X -m limit --limit 6/min -j LOG --log-prefix "[DROP WI 1] ""#.to_owned()],
            applied: true,
            dry_run: false,
        });
        let output = render(&summary);
        assert!(output.contains("DELETE RULE: -A X"));
        assert!(output.contains("1 log rule(s) removed"));
    }

    #[test]
    fn test_render_nothing_removed() {
        let summary = DeleteSummary::from(DeleteReport {
            lines_read: 4,
            removed: Vec::new(),
            applied: true,
            dry_run: false,
        });
        assert_eq!(render(&summary).trim(), "0 log rule(s) removed");
    }

    #[test]
    fn test_render_dry_run() {
        let summary = DeleteSummary::from(DeleteReport {
            lines_read: 4,
            removed: vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            applied: false,
            dry_run: true,
        });
        assert!(render(&summary).contains("DRY RUN: 3 log rule(s) would be removed"));
    }
}
