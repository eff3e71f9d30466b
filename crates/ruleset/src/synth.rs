//! 로그 룰 합성기
//!
//! DROP 룰 한 줄에서 코멘트와 DROP 타깃을 제거하고,
//! 속도 제한이 걸린 `LOG` 타깃을 덧붙인 새 룰을 만듭니다.
//!
//! ```text
//! -A UBIOS_WAN_IN_USER -p tcp --dport 22 -m comment --comment 42 -j DROP
//!   =>
//! -A UBIOS_WAN_IN_USER -p tcp --dport 22  -m limit --limit 6/min -j LOG --log-prefix "[DROP WI 42] "
//! ```

use droplog_core::types::is_valid_rate_limit;
use regex::Regex;

use crate::classifier::{COMMENT_PATTERN, DROP_PATTERN};
use crate::error::RuleSetError;

/// log-prefix에 들어갈 룰 ID 최대 길이
///
/// iptables log-prefix는 29바이트로 제한되고, `[DROP XX ` + `] `가 11바이트를 차지합니다.
pub const MAX_RULE_ID_LEN: usize = 14;

/// 룰 ID의 오른쪽 [`MAX_RULE_ID_LEN`]글자만 남깁니다.
pub fn truncate_rule_id(rule_id: &str) -> &str {
    let count = rule_id.chars().count();
    if count <= MAX_RULE_ID_LEN {
        return rule_id;
    }
    let start = rule_id
        .char_indices()
        .nth(count - MAX_RULE_ID_LEN)
        .map_or(0, |(idx, _)| idx);
    &rule_id[start..]
}

/// `[DROP <code> <id>] ` 형태의 log-prefix를 만듭니다.
pub fn log_prefix(code: &str, rule_id: &str) -> String {
    format!("[DROP {} {}] ", code, truncate_rule_id(rule_id))
}

/// 로그 룰 합성기
#[derive(Debug, Clone)]
pub struct LogRuleSynthesizer {
    comment_re: Regex,
    drop_re: Regex,
    rate_limit: String,
}

impl LogRuleSynthesizer {
    /// `rate_limit`은 `-m limit --limit` 인자 그대로 사용됩니다 (예: `6/min`).
    ///
    /// 합성 결과가 다시 로그 룰로 인식되어야 하므로 `<count>/<unit>` 형식이 아니면 거부합니다.
    pub fn new(rate_limit: impl Into<String>) -> Result<Self, RuleSetError> {
        let rate_limit = rate_limit.into();
        if !is_valid_rate_limit(&rate_limit) {
            return Err(RuleSetError::InvalidRateLimit(rate_limit));
        }

        Ok(Self {
            comment_re: Regex::new(COMMENT_PATTERN)?,
            drop_re: Regex::new(DROP_PATTERN)?,
            rate_limit,
        })
    }

    pub fn rate_limit(&self) -> &str {
        &self.rate_limit
    }

    /// DROP 룰로부터 로그 룰을 합성합니다.
    ///
    /// 매칭 조건 부분은 그대로 두고 코멘트/DROP 조각만 제거합니다.
    pub fn synthesize(&self, line: &str, code: &str, rule_id: &str) -> String {
        let without_comment = self.comment_re.replace_all(line, "");
        let bare = self.drop_re.replace_all(&without_comment, "");
        format!(
            "{} -m limit --limit {} -j LOG --log-prefix \"{}\"",
            bare,
            self.rate_limit,
            log_prefix(code, rule_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainTable;
    use crate::classifier::LineClassifier;
    use droplog_core::config::DEFAULT_RATE_LIMIT;

    fn default_synth() -> LogRuleSynthesizer {
        LogRuleSynthesizer::new(DEFAULT_RATE_LIMIT).unwrap()
    }

    #[test]
    fn synthesizes_canonical_log_rule() {
        let synth = default_synth();
        let line = "-A UBIOS_WAN_IN_USER -p tcp --dport 22 -m comment --comment 42 -j DROP";
        assert_eq!(
            synth.synthesize(line, "WI", "42"),
            r#"-A UBIOS_WAN_IN_USER -p tcp --dport 22  -m limit --limit 6/min -j LOG --log-prefix "[DROP WI 42] ""#
        );
    }

    #[test]
    fn keeps_counters_and_match_conditions() {
        let synth = default_synth();
        let line = "[5:300] -A UBIOS_LAN_IN_USER -s 192.168.1.0/24 -d 10.0.0.1/32 -m comment --comment 7 -j DROP";
        let out = synth.synthesize(line, "LI", "7");
        assert!(out.starts_with("[5:300] -A UBIOS_LAN_IN_USER -s 192.168.1.0/24 -d 10.0.0.1/32"));
        assert!(!out.contains("--comment"));
        assert!(!out.contains("-j DROP"));
        assert!(out.ends_with(r#"-j LOG --log-prefix "[DROP LI 7] ""#));
    }

    #[test]
    fn custom_rate_limit() {
        let synth = LogRuleSynthesizer::new("1/s").unwrap();
        let out = synth.synthesize("-A X -m comment --comment 1 -j DROP", "XX", "1");
        assert!(out.contains("-m limit --limit 1/s -j LOG"));
        assert_eq!(synth.rate_limit(), "1/s");
    }

    #[test]
    fn rejects_rate_limit_the_classifier_cannot_read_back() {
        for bad in ["6 /min", "6/ min", "", "fast", "0/min"] {
            assert!(
                matches!(
                    LogRuleSynthesizer::new(bad),
                    Err(RuleSetError::InvalidRateLimit(ref r)) if r == bad
                ),
                "rate limit {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn truncation_keeps_rightmost_fourteen() {
        assert_eq!(truncate_rule_id("42"), "42");
        assert_eq!(truncate_rule_id("12345678901234"), "12345678901234");
        assert_eq!(truncate_rule_id("123456789012345"), "23456789012345");
        assert_eq!(
            truncate_rule_id("30000000000000000001"),
            "00000000000001"
        );
    }

    #[test]
    fn prefix_fits_iptables_limit() {
        let prefix = log_prefix("WI", "999999999999999999999");
        assert_eq!(prefix, "[DROP WI 99999999999999] ");
        assert!(prefix.len() <= 29);
    }

    #[test]
    fn synthesized_output_is_recognized_by_classifier() {
        let classifier = LineClassifier::new(ChainTable::ubios_default()).unwrap();
        let synth = default_synth();
        for (chain, code) in ChainTable::ubios_default().iter() {
            for id in ["1", "42", "30000000000002", "123456789012345678"] {
                let line = format!("-A {chain} -p udp -m comment --comment {id} -j DROP");
                let out = synth.synthesize(&line, code, id);
                assert!(
                    classifier.is_synthesized_log_line(&out),
                    "classifier should recognize {out}"
                );
                assert_eq!(classifier.matches_tracked_chain(&out), Some(chain));
                assert!(!classifier.is_drop_action(&out));
                assert!(classifier.extract_rule_id(&out).is_none());
            }
        }
    }
}
