//! `droplog version` command handler

use std::io::Write;

use serde::Serialize;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Build commit, injected at compile time through `DROPLOG_COMMIT_ID`.
pub const COMMIT_ID: &str = match option_env!("DROPLOG_COMMIT_ID") {
    Some(commit) => commit,
    None => "none",
};

/// Execute the `version` command. Never loads configuration.
pub fn execute(writer: &OutputWriter) -> Result<(), CliError> {
    writer.render(&VersionReport::current())
}

#[derive(Debug, Serialize)]
pub struct VersionReport {
    pub version: String,
    pub commit: String,
}

impl VersionReport {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            commit: COMMIT_ID.to_owned(),
        }
    }
}

impl Render for VersionReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "v{}", self.version)?;
        writeln!(w, "commit={}", self.commit)
    }
}
