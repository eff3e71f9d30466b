//! 도메인 타입 -- 워크스페이스 전역에서 사용되는 공통 타입
//!
//! 추적 대상 체인 테이블의 기본값과 이름/약어 검증 규칙,
//! 로그 룰 중복 억제에 쓰이는 인접성 모드를 정의합니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 기본 추적 체인 테이블 (UniFi OS 사용자 체인 → 2글자 약어)
pub const DEFAULT_CHAINS: &[(&str, &str)] = &[
    ("UBIOS_WAN_IN_USER", "WI"),
    ("UBIOS_WAN_OUT_USER", "WO"),
    ("UBIOS_WAN_LOCAL_USER", "WL"),
    ("UBIOS_LAN_IN_USER", "LI"),
    ("UBIOS_LAN_OUT_USER", "LO"),
    ("UBIOS_LAN_LOCAL_USER", "LL"),
    ("UBIOS_GUEST_IN_USER", "GI"),
    ("UBIOS_GUEST_OUT_USER", "GO"),
    ("UBIOS_GUEST_LOCAL_USER", "GL"),
];

/// 기본 체인 테이블을 맵 형태로 반환합니다.
pub fn default_chain_map() -> BTreeMap<String, String> {
    DEFAULT_CHAINS
        .iter()
        .map(|(name, code)| ((*name).to_owned(), (*code).to_owned()))
        .collect()
}

/// 체인 약어는 정확히 ASCII 대문자 2글자여야 합니다.
///
/// 로그 라인 인식 패턴(`[DROP XX <id>] `)이 대문자 2글자만 허용하므로
/// 이 규칙을 벗어난 약어로 만든 로그 룰은 삭제/중복 검사에서 인식되지 않습니다.
pub fn is_valid_chain_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// 체인 이름은 비어 있지 않고 공백을 포함하지 않아야 합니다.
pub fn is_valid_chain_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

/// 체인 테이블 검증 실패 사유
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainTableIssue {
    #[error("at least one chain must be tracked")]
    Empty,

    #[error("invalid chain name '{0}'")]
    InvalidName(String),

    #[error("code '{code}' for '{name}' must be exactly two uppercase letters")]
    InvalidCode { name: String, code: String },

    #[error("code '{code}' is already used by '{first}' (also '{name}')")]
    DuplicateCode {
        name: String,
        code: String,
        first: String,
    },
}

impl ChainTableIssue {
    /// 문제가 된 체인 이름 (테이블 전체 문제라면 `None`)
    pub fn chain(&self) -> Option<&str> {
        match self {
            Self::Empty | Self::InvalidName(_) => None,
            Self::InvalidCode { name, .. } | Self::DuplicateCode { name, .. } => Some(name),
        }
    }
}

/// 체인 테이블 전체를 검증합니다.
///
/// 테이블은 비어 있으면 안 되고, 약어는 서로 겹치지 않아야 합니다.
/// 설정 검증과 룰셋의 `ChainTable` 생성이 모두 이 함수를 사용합니다.
pub fn check_chain_table(entries: &BTreeMap<String, String>) -> Result<(), ChainTableIssue> {
    if entries.is_empty() {
        return Err(ChainTableIssue::Empty);
    }

    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for (name, code) in entries {
        if !is_valid_chain_name(name) {
            return Err(ChainTableIssue::InvalidName(name.clone()));
        }
        if !is_valid_chain_code(code) {
            return Err(ChainTableIssue::InvalidCode {
                name: name.clone(),
                code: code.clone(),
            });
        }
        if let Some(first) = seen.insert(code, name) {
            return Err(ChainTableIssue::DuplicateCode {
                name: name.clone(),
                code: code.clone(),
                first: first.to_owned(),
            });
        }
    }

    Ok(())
}

/// `<count>/<unit>` 형식의 iptables limit 값인지 확인합니다.
///
/// 합성된 로그 라인은 `--limit \S+`로 다시 인식되므로 공백이 섞인 값은 허용하지 않습니다.
pub fn is_valid_rate_limit(value: &str) -> bool {
    let Some((count, unit)) = value.split_once('/') else {
        return false;
    };
    let count_ok = !count.is_empty()
        && count.bytes().all(|b| b.is_ascii_digit())
        && count.parse::<u32>().is_ok_and(|n| n > 0);
    let valid_units = [
        "s", "sec", "second", "m", "min", "minute", "h", "hour", "d", "day",
    ];
    count_ok && valid_units.contains(&unit)
}

/// 직전 로그 라인 플래그의 유지 방식
///
/// 삽입 패스는 "직전 라인이 이미 합성된 로그 룰인가"를 보고 중복 삽입을 막습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyMode {
    /// 추적 체인이 아닌 라인을 만나면 플래그를 초기화합니다.
    #[default]
    Reset,
    /// 추적 체인이 아닌 라인은 무시하고, 같은 체인의 로그 라인만 중복으로 봅니다.
    SameChain,
}

impl AdjacencyMode {
    /// 설정 문자열에서 모드를 파싱합니다.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "reset" => Some(Self::Reset),
            "same_chain" => Some(Self::SameChain),
            _ => None,
        }
    }
}

impl fmt::Display for AdjacencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => write!(f, "reset"),
            Self::SameChain => write!(f, "same_chain"),
        }
    }
}
