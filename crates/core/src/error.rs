//! 에러 타입 -- 도메인별 에러 정의

/// droplog 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum DroplogError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// iptables 룰셋 입출력 에러
    #[error("iptables error: {0}")]
    Iptables(#[from] IptablesError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// iptables 룰셋 입출력 에러
///
/// 덤프 실패와 적용 실패는 운영자가 구분할 수 있도록 별도 variant로 유지합니다.
#[derive(Debug, thiserror::Error)]
pub enum IptablesError {
    /// 현재 룰셋을 읽지 못함 (iptables-save)
    #[error("dump failed: {0}")]
    Dump(String),

    /// 새 룰셋을 적용하지 못함 (iptables-restore)
    #[error("apply failed: {0}")]
    Apply(String),

    /// 추적 체인 테이블 구성 오류
    #[error("chain table error: {0}")]
    ChainTable(String),
}
