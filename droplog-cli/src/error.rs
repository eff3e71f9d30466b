//! CLI-specific error types and exit code mapping

use droplog_core::error::{DroplogError, IptablesError};
use droplog_ruleset::RuleSetError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed (bad arguments, unknown section).
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from droplog-core.
    #[error("{0}")]
    Core(#[from] DroplogError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                               |
    /// |------|---------------------------------------|
    /// | 0    | Success                               |
    /// | 1    | Dump failed (could not read rules)    |
    /// | 2    | Apply failed (could not write rules)  |
    /// | 3    | Configuration error                   |
    /// | 4    | Command / output error                |
    /// | 10   | IO error                              |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 3,
            Self::Command(_) | Self::JsonSerialize(_) => 4,
            Self::Io(_) => 10,
            Self::Core(core) => match core {
                DroplogError::Iptables(IptablesError::Dump(_)) => 1,
                DroplogError::Iptables(IptablesError::Apply(_)) => 2,
                DroplogError::Iptables(IptablesError::ChainTable(_)) | DroplogError::Config(_) => 3,
                DroplogError::Io(_) => 10,
            },
        }
    }
}

impl From<RuleSetError> for CliError {
    fn from(e: RuleSetError) -> Self {
        Self::Core(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droplog_core::error::ConfigError;

    #[test]
    fn test_exit_code_dump_failure() {
        let err: CliError = RuleSetError::Dump {
            command: "iptables-save -c".to_owned(),
            reason: "permission denied".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 1, "dump failure should return exit code 1");
        assert!(err.to_string().contains("iptables-save -c"));
    }

    #[test]
    fn test_exit_code_apply_failure() {
        let err: CliError = RuleSetError::Apply {
            command: "iptables-restore -c".to_owned(),
            reason: "line 3 failed".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 2, "apply failure should return exit code 2");
    }

    #[test]
    fn test_exit_code_chain_table_error() {
        let err: CliError = RuleSetError::InvalidChainTable("no chains".to_owned()).into();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 3, "config error should return exit code 3");

        let core: CliError = DroplogError::Config(ConfigError::FileNotFound {
            path: "droplog.toml".to_owned(),
        })
        .into();
        assert_eq!(core.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("test error".to_owned());
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_exit_code_json_serialize_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json")
            .expect_err("should fail parsing");
        let err = CliError::JsonSerialize(json_err);
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        assert_eq!(CliError::Io(io_err).exit_code(), 10);

        let core_io: CliError =
            DroplogError::Io(std::io::Error::new(std::io::ErrorKind::Other, "read")).into();
        assert_eq!(core_io.exit_code(), 10);
    }

    #[test]
    fn test_error_display_config() {
        let err = CliError::Config("invalid TOML syntax".to_owned());
        let display_str = err.to_string();
        assert!(display_str.contains("configuration error"));
        assert!(display_str.contains("invalid TOML syntax"));
    }

    #[test]
    fn test_error_display_command_is_bare() {
        let err = CliError::Command("unknown section: foo".to_owned());
        assert_eq!(err.to_string(), "unknown section: foo");
    }
}
