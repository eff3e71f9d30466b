//! 라인 분류기 -- iptables-save 덤프 라인 패턴 인식
//!
//! [`LineClassifier`]는 한 줄의 텍스트에 대해 다음을 판별합니다.
//!
//! - 추적 체인에 대한 append(`-A <chain>`) 라인인지
//! - 숫자 룰 ID 코멘트(`-m comment --comment <digits>`)가 있는지
//! - 타깃이 `-j DROP`인지
//! - 이미 합성된 로그 룰(`[DROP XX <id>] ` prefix)인지
//!
//! 분류는 보수적입니다. 형식이 조금이라도 다르면 "추적 대상 아님"으로 취급하며
//! 에러로 보고하지 않습니다. 정규식은 생성 시 한 번만 컴파일합니다.

use regex::Regex;

use crate::chain::ChainTable;
use crate::error::RuleSetError;

/// 룰 ID 코멘트. 숫자 뒤는 단어 경계여야 합니다.
pub(crate) const COMMENT_PATTERN: &str = r"-m comment --comment ([0-9]+)\b";

/// DROP 타깃. 앞의 공백 한 칸까지 하나의 조각으로 봅니다.
pub(crate) const DROP_PATTERN: &str = r"(?:^|\s)-j DROP\b";

/// 합성 로그 룰. [`crate::synth::log_prefix`]와 형태가 일치해야 합니다.
pub(crate) const LOG_PATTERN: &str =
    r#"-m limit --limit \S+ (?:.* )?-j LOG --log-prefix "\[DROP [A-Z]{2} [0-9]+\] ""#;

/// 한 라인의 분류 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineClass<'a> {
    /// 추적 체인 이름 (테이블 소유)
    pub chain: Option<&'a str>,
    /// 코멘트의 숫자 룰 ID (라인 원문)
    pub rule_id: Option<&'a str>,
    pub is_drop: bool,
    pub is_synthesized_log: bool,
}

impl LineClass<'_> {
    /// 로그 룰 삽입 대상인지: 추적 체인 + 룰 ID + DROP
    pub fn is_drop_candidate(&self) -> bool {
        self.chain.is_some() && self.rule_id.is_some() && self.is_drop
    }
}

/// 덤프 라인 분류기
#[derive(Debug, Clone)]
pub struct LineClassifier {
    table: ChainTable,
    chain_re: Regex,
    comment_re: Regex,
    drop_re: Regex,
    log_re: Regex,
}

impl LineClassifier {
    /// 체인 테이블로 분류기를 생성합니다.
    pub fn new(table: ChainTable) -> Result<Self, RuleSetError> {
        let chain_re = Regex::new(&format!(
            r"(?:^|\s)-A ({})(?:\s|$)",
            table.alternation()
        ))?;
        Ok(Self {
            table,
            chain_re,
            comment_re: Regex::new(COMMENT_PATTERN)?,
            drop_re: Regex::new(DROP_PATTERN)?,
            log_re: Regex::new(LOG_PATTERN)?,
        })
    }

    pub fn table(&self) -> &ChainTable {
        &self.table
    }

    /// 라인이 추적 체인에 대한 append이면 체인 이름을 반환합니다.
    ///
    /// 체인 이름은 토큰 단위로 일치해야 합니다 (`UBIOS_WAN_IN_USER_X`는 불일치).
    pub fn matches_tracked_chain(&self, line: &str) -> Option<&str> {
        let caps = self.chain_re.captures(line)?;
        self.table.resolve(caps.get(1)?.as_str())
    }

    /// 코멘트에 담긴 숫자 룰 ID를 원문 그대로 반환합니다.
    pub fn extract_rule_id<'l>(&self, line: &'l str) -> Option<&'l str> {
        self.comment_re
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// 타깃이 정확히 `DROP`인지 확인합니다 (대소문자 구분).
    pub fn is_drop_action(&self, line: &str) -> bool {
        self.drop_re.is_match(line)
    }

    /// 이전 실행에서 합성된 로그 룰인지 확인합니다.
    pub fn is_synthesized_log_line(&self, line: &str) -> bool {
        self.log_re.is_match(line)
    }

    /// 네 가지 판별을 한 번에 수행합니다.
    pub fn classify<'a>(&'a self, line: &'a str) -> LineClass<'a> {
        LineClass {
            chain: self.matches_tracked_chain(line),
            rule_id: self.extract_rule_id(line),
            is_drop: self.is_drop_action(line),
            is_synthesized_log: self.is_synthesized_log_line(line),
        }
    }
}
