//! 설정 관리 -- droplog.toml 파싱 및 런타임 설정
//!
//! [`DroplogConfig`]는 CLI가 사용하는 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`DROPLOG_IPTABLES_SAVE_COMMAND=ip6tables-save` 형식)
//! 3. 설정 파일 (`droplog.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), droplog_core::error::DroplogError> {
//! use droplog_core::config::DroplogConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = DroplogConfig::load("droplog.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = DroplogConfig::parse("[logging]\nrate_limit = \"10/min\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, DroplogError};
use crate::types::{AdjacencyMode, check_chain_table, default_chain_map, is_valid_rate_limit};

/// 기본 로그 룰 속도 제한
pub const DEFAULT_RATE_LIMIT: &str = "6/min";

/// droplog 통합 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroplogConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// iptables 명령 설정
    #[serde(default)]
    pub iptables: IptablesConfig,
    /// 로그 룰 합성 설정
    #[serde(default)]
    pub logging: LogRuleConfig,
    /// 추적 체인 → 2글자 약어
    #[serde(default = "default_chain_map")]
    pub chains: BTreeMap<String, String>,
}

impl Default for DroplogConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            iptables: IptablesConfig::default(),
            logging: LogRuleConfig::default(),
            chains: default_chain_map(),
        }
    }
}

impl DroplogConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DroplogError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 주어지지 않으면 기본값 + 환경변수로 설정을 구성합니다.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, DroplogError> {
        match path {
            Some(path) => Self::load(path).await,
            None => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DroplogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DroplogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                DroplogError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, DroplogError> {
        toml::from_str(toml_str).map_err(|e| {
            DroplogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `DROPLOG_{SECTION}_{FIELD}`
    /// 체인 테이블은 `DROPLOG_CHAINS=NAME=XX,NAME2=YY` 형식으로 통째로 교체합니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "DROPLOG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "DROPLOG_GENERAL_LOG_FORMAT");

        // iptables
        override_string(
            &mut self.iptables.save_command,
            "DROPLOG_IPTABLES_SAVE_COMMAND",
        );
        override_string(
            &mut self.iptables.restore_command,
            "DROPLOG_IPTABLES_RESTORE_COMMAND",
        );
        override_bool(&mut self.iptables.counters, "DROPLOG_IPTABLES_COUNTERS");
        override_u64(
            &mut self.iptables.timeout_secs,
            "DROPLOG_IPTABLES_TIMEOUT_SECS",
        );

        // Logging
        override_string(&mut self.logging.rate_limit, "DROPLOG_LOGGING_RATE_LIMIT");
        override_adjacency(&mut self.logging.adjacency, "DROPLOG_LOGGING_ADJACENCY");

        // Chains
        override_chain_map(&mut self.chains, "DROPLOG_CHAINS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DroplogError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.iptables.save_command.trim().is_empty() {
            return Err(invalid("iptables.save_command", "must not be empty"));
        }
        if self.iptables.restore_command.trim().is_empty() {
            return Err(invalid("iptables.restore_command", "must not be empty"));
        }
        if self.iptables.timeout_secs == 0 {
            return Err(invalid("iptables.timeout_secs", "must be greater than 0"));
        }

        if !is_valid_rate_limit(&self.logging.rate_limit) {
            return Err(invalid(
                "logging.rate_limit",
                "expected <count>/<second|minute|hour|day> (e.g. 6/min)",
            ));
        }

        // 체인 테이블 검증
        if let Err(issue) = check_chain_table(&self.chains) {
            let field = issue
                .chain()
                .map_or_else(|| "chains".to_owned(), |name| format!("chains.{name}"));
            return Err(invalid(field, issue.to_string()));
        }

        Ok(())
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> DroplogError {
    ConfigError::InvalidValue {
        field: field.into(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// iptables 명령 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IptablesConfig {
    /// 룰셋 덤프 명령
    pub save_command: String,
    /// 룰셋 적용 명령
    pub restore_command: String,
    /// 패킷/바이트 카운터 보존 (`-c`)
    pub counters: bool,
    /// 명령 하나당 최대 실행 시간 (초)
    pub timeout_secs: u64,
}

impl Default for IptablesConfig {
    fn default() -> Self {
        Self {
            save_command: "iptables-save".to_owned(),
            restore_command: "iptables-restore".to_owned(),
            counters: true,
            timeout_secs: 30,
        }
    }
}

/// 로그 룰 합성 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogRuleConfig {
    /// `-m limit --limit` 값
    pub rate_limit: String,
    /// 중복 억제 인접성 모드
    pub adjacency: AdjacencyMode,
}

impl Default for LogRuleConfig {
    fn default() -> Self {
        Self {
            rate_limit: DEFAULT_RATE_LIMIT.to_owned(),
            adjacency: AdjacencyMode::Reset,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_adjacency(target: &mut AdjacencyMode, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match AdjacencyMode::parse(val.trim()) {
            Some(mode) => *target = mode,
            None => warn!(
                env_key,
                value = val.as_str(),
                "unknown adjacency mode in env var, ignoring"
            ),
        }
    }
}

fn override_chain_map(target: &mut BTreeMap<String, String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        let mut parsed = BTreeMap::new();
        for pair in val.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match pair.split_once('=') {
                Some((name, code)) => {
                    parsed.insert(name.trim().to_owned(), code.trim().to_owned());
                }
                None => {
                    warn!(
                        env_key,
                        value = pair,
                        "expected NAME=CODE in chain env var, ignoring whole override"
                    );
                    return;
                }
            }
        }
        *target = parsed;
    }
}
