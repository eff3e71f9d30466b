//! 추적 체인 테이블 -- 체인 이름 → log-prefix 약어
//!
//! [`ChainTable`]은 생성 후 변경되지 않습니다. 분류기는 이 테이블에 있는
//! 체인 이름만 보고하므로, 약어 조회는 항상 성공합니다.

use std::collections::BTreeMap;

use droplog_core::config::DroplogConfig;
use droplog_core::types::{check_chain_table, default_chain_map};

use crate::error::RuleSetError;

/// 불변 체인 약어 테이블
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTable {
    entries: BTreeMap<String, String>,
}

impl ChainTable {
    /// 테이블을 검증하여 생성합니다.
    ///
    /// - 최소 한 개의 체인
    /// - 체인 이름은 공백 없음
    /// - 약어는 ASCII 대문자 2글자, 서로 중복 없음
    pub fn new(entries: BTreeMap<String, String>) -> Result<Self, RuleSetError> {
        check_chain_table(&entries)
            .map_err(|issue| RuleSetError::InvalidChainTable(issue.to_string()))?;

        Ok(Self { entries })
    }

    /// UniFi OS 사용자 체인 기본 테이블
    pub fn ubios_default() -> Self {
        Self {
            entries: default_chain_map(),
        }
    }

    /// 설정의 `[chains]` 섹션으로 테이블을 생성합니다.
    pub fn from_config(config: &DroplogConfig) -> Result<Self, RuleSetError> {
        Self::new(config.chains.clone())
    }

    /// 체인의 2글자 약어를 반환합니다.
    pub fn abbreviation(&self, chain: &str) -> Option<&str> {
        self.entries.get(chain).map(String::as_str)
    }

    /// 테이블에 등록된 체인 이름을 테이블 소유 문자열로 반환합니다.
    pub fn resolve(&self, chain: &str) -> Option<&str> {
        self.entries.get_key_value(chain).map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (체인, 약어) 쌍을 이름순으로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 라인 매칭용 정규식 alternation (`A|B|C`)
    ///
    /// 각 이름은 이스케이프되며, 긴 이름이 먼저 오도록 정렬합니다.
    pub fn alternation(&self) -> String {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl Default for ChainTable {
    fn default() -> Self {
        Self::ubios_default()
    }
}
