//! 룰셋 변환 에러 타입
//!
//! [`RuleSetError`]는 룰셋 덤프/적용과 분류기 구성 중 발생하는 에러를 표현합니다.
//! `From<RuleSetError> for DroplogError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use droplog_core::error::{ConfigError, DroplogError, IptablesError};

/// 룰셋 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    /// 현재 룰셋 덤프 실패
    #[error("failed to dump rule set with '{command}': {reason}")]
    Dump {
        /// 실행한 명령
        command: String,
        /// 실패 사유
        reason: String,
    },

    /// 새 룰셋 적용 실패
    #[error("failed to apply rule set with '{command}': {reason}")]
    Apply {
        /// 실행한 명령
        command: String,
        /// 실패 사유
        reason: String,
    },

    /// 추적 체인 테이블이 유효하지 않음
    #[error("invalid chain table: {0}")]
    InvalidChainTable(String),

    /// `--limit` 값이 `<count>/<unit>` 형식이 아님
    #[error("invalid rate limit '{0}': expected <count>/<second|minute|hour|day>")]
    InvalidRateLimit(String),

    /// 분류 패턴 컴파일 실패
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<RuleSetError> for DroplogError {
    fn from(err: RuleSetError) -> Self {
        match err {
            RuleSetError::Dump { .. } => IptablesError::Dump(err.to_string()).into(),
            RuleSetError::Apply { .. } => IptablesError::Apply(err.to_string()).into(),
            RuleSetError::InvalidRateLimit(_) => ConfigError::InvalidValue {
                field: "logging.rate_limit".to_owned(),
                reason: err.to_string(),
            }
            .into(),
            RuleSetError::InvalidChainTable(_) | RuleSetError::Regex(_) => {
                IptablesError::ChainTable(err.to_string()).into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_error_display() {
        let err = RuleSetError::Dump {
            command: "iptables-save -c".to_owned(),
            reason: "permission denied".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("iptables-save -c"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn dump_and_apply_stay_distinct_after_conversion() {
        let dump: DroplogError = RuleSetError::Dump {
            command: "iptables-save".to_owned(),
            reason: "x".to_owned(),
        }
        .into();
        let apply: DroplogError = RuleSetError::Apply {
            command: "iptables-restore".to_owned(),
            reason: "x".to_owned(),
        }
        .into();

        assert!(matches!(dump, DroplogError::Iptables(IptablesError::Dump(_))));
        assert!(matches!(
            apply,
            DroplogError::Iptables(IptablesError::Apply(_))
        ));
    }

    #[test]
    fn rate_limit_error_converts_to_config_error() {
        let err: DroplogError = RuleSetError::InvalidRateLimit("6 /min".to_owned()).into();
        assert!(matches!(
            err,
            DroplogError::Config(ConfigError::InvalidValue { ref field, .. })
                if field == "logging.rate_limit"
        ));
    }

    #[test]
    fn chain_table_error_converts_to_chain_table() {
        let err: DroplogError = RuleSetError::InvalidChainTable("empty".to_owned()).into();
        assert!(matches!(
            err,
            DroplogError::Iptables(IptablesError::ChainTable(_))
        ));
    }
}
