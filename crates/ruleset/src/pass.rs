//! 삽입 패스 / 삭제 패스
//!
//! 두 패스 모두 라인 시퀀스를 한 번 앞으로 훑으며, 보조 상태는 O(1)입니다.
//! 변환에 관여하지 않은 라인은 순서와 내용이 그대로 유지됩니다.

use tracing::debug;

use droplog_core::types::AdjacencyMode;

use crate::classifier::LineClassifier;
use crate::synth::LogRuleSynthesizer;

/// 삽입 패스 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    /// 로그 룰이 삽입된 전체 라인 시퀀스
    pub lines: Vec<String>,
    /// 새로 합성된 로그 룰 (삽입 순서)
    pub added: Vec<String>,
}

impl InsertOutcome {
    pub fn added_count(&self) -> usize {
        self.added.len()
    }
}

/// 삭제 패스 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// 합성 로그 룰이 제거된 라인 시퀀스
    pub lines: Vec<String>,
    /// 제거된 로그 룰 (원래 순서)
    pub removed: Vec<String>,
}

impl RemoveOutcome {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

/// 추적 체인의 DROP 룰 앞에 로그 룰을 삽입합니다.
///
/// 바로 앞 라인이 이미 합성된 로그 룰이면 삽입하지 않으므로,
/// 결과를 다시 넣어도 추가되는 룰이 없습니다.
/// 룰 ID 코멘트가 없는 DROP 룰은 건너뜁니다.
pub fn insert_log_rules<S: AsRef<str>>(
    lines: &[S],
    classifier: &LineClassifier,
    synthesizer: &LogRuleSynthesizer,
    adjacency: AdjacencyMode,
) -> InsertOutcome {
    let mut outcome = InsertOutcome {
        lines: Vec::with_capacity(lines.len()),
        added: Vec::new(),
    };

    // 직전 라인이 합성 로그 룰이었다면 그 체인
    let mut previous_log: Option<&str> = None;

    for line in lines {
        let line = line.as_ref();
        let class = classifier.classify(line);

        match (class.chain, class.rule_id) {
            (Some(chain), Some(rule_id)) if class.is_drop => {
                let already_logged = match adjacency {
                    AdjacencyMode::Reset => previous_log.is_some(),
                    AdjacencyMode::SameChain => previous_log == Some(chain),
                };

                if already_logged {
                    debug!(chain, rule_id, "log rule already present, skipping");
                } else if let Some(code) = classifier.table().abbreviation(chain) {
                    let log_line = synthesizer.synthesize(line, code, rule_id);
                    outcome.lines.push(log_line.clone());
                    outcome.added.push(log_line);
                }

                // DROP 룰 자체는 로그 룰이 아님
                previous_log = None;
            }
            (Some(chain), rule_id) => {
                if rule_id.is_none() && class.is_drop {
                    debug!(chain, "drop rule without numeric comment, not logged");
                }
                previous_log = class.is_synthesized_log.then_some(chain);
            }
            (None, _) => {
                if adjacency == AdjacencyMode::Reset {
                    previous_log = None;
                }
            }
        }

        outcome.lines.push(line.to_owned());
    }

    outcome
}

/// 합성된 로그 룰을 모두 제거합니다.
pub fn remove_log_rules<S: AsRef<str>>(
    lines: &[S],
    classifier: &LineClassifier,
) -> RemoveOutcome {
    let mut outcome = RemoveOutcome {
        lines: Vec::with_capacity(lines.len()),
        removed: Vec::new(),
    };

    for line in lines {
        let line = line.as_ref();
        if classifier.is_synthesized_log_line(line) {
            outcome.removed.push(line.to_owned());
        } else {
            outcome.lines.push(line.to_owned());
        }
    }

    outcome
}
