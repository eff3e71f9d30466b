//! 로그 룰 관리자 -- 덤프 → 변환 → 적용
//!
//! [`LogRuleManager`]는 [`RuleSetIo`]로 현재 룰셋을 읽고,
//! 삽입/삭제 패스를 적용한 뒤 필요할 때만 결과를 다시 적용합니다.
//!
//! - 생성(create): 추가된 로그 룰이 없으면 적용하지 않습니다.
//! - 삭제(delete): 제거된 룰 수와 관계없이 항상 적용합니다.
//! - `dry_run`이면 어떤 경우에도 적용하지 않습니다.

use tracing::info;

use droplog_core::config::DroplogConfig;
use droplog_core::types::AdjacencyMode;

use crate::chain::ChainTable;
use crate::classifier::LineClassifier;
use crate::error::RuleSetError;
use crate::io::RuleSetIo;
use crate::pass::{insert_log_rules, remove_log_rules};
use crate::synth::LogRuleSynthesizer;

/// 생성 실행 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
    /// 덤프에서 읽은 라인 수
    pub lines_read: usize,
    /// 추가된 로그 룰
    pub added: Vec<String>,
    /// 룰셋을 실제로 적용했는지
    pub applied: bool,
    pub dry_run: bool,
}

/// 삭제 실행 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    /// 덤프에서 읽은 라인 수
    pub lines_read: usize,
    /// 제거된 로그 룰
    pub removed: Vec<String>,
    /// 룰셋을 실제로 적용했는지
    pub applied: bool,
    pub dry_run: bool,
}

/// 로그 룰 생성/삭제 오케스트레이터
pub struct LogRuleManager<R: RuleSetIo> {
    io: R,
    classifier: LineClassifier,
    synthesizer: LogRuleSynthesizer,
    adjacency: AdjacencyMode,
}

impl<R: RuleSetIo> LogRuleManager<R> {
    pub fn new(
        io: R,
        table: ChainTable,
        rate_limit: &str,
        adjacency: AdjacencyMode,
    ) -> Result<Self, RuleSetError> {
        Ok(Self {
            io,
            classifier: LineClassifier::new(table)?,
            synthesizer: LogRuleSynthesizer::new(rate_limit)?,
            adjacency,
        })
    }

    /// 설정의 `[chains]`, `[logging]` 섹션으로 관리자를 구성합니다.
    pub fn from_config(io: R, config: &DroplogConfig) -> Result<Self, RuleSetError> {
        Self::new(
            io,
            ChainTable::from_config(config)?,
            &config.logging.rate_limit,
            config.logging.adjacency,
        )
    }

    pub fn io(&self) -> &R {
        &self.io
    }

    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    /// 추적 체인의 DROP 룰 앞에 로그 룰을 추가합니다.
    pub async fn create(&self, dry_run: bool) -> Result<CreateReport, RuleSetError> {
        info!(dry_run, adjacency = %self.adjacency, "creating iptables log rules");

        let lines = self.io.dump().await?;
        let outcome = insert_log_rules(
            &lines,
            &self.classifier,
            &self.synthesizer,
            self.adjacency,
        );

        for rule in &outcome.added {
            info!(rule = %rule, "add rule");
        }

        let applied = if outcome.added.is_empty() {
            info!("no new log rules, not updating iptables");
            false
        } else if dry_run {
            info!(added = outcome.added_count(), "dry run, not updating iptables");
            false
        } else {
            self.io.apply(&outcome.lines).await?;
            info!(added = outcome.added_count(), "iptables log rules added");
            true
        };

        Ok(CreateReport {
            lines_read: lines.len(),
            added: outcome.added,
            applied,
            dry_run,
        })
    }

    /// 이전에 합성한 로그 룰을 모두 제거합니다.
    pub async fn delete(&self, dry_run: bool) -> Result<DeleteReport, RuleSetError> {
        info!(dry_run, "deleting iptables drop log rules");

        let lines = self.io.dump().await?;
        let outcome = remove_log_rules(&lines, &self.classifier);

        for rule in &outcome.removed {
            info!(rule = %rule, "delete rule");
        }

        let applied = if dry_run {
            info!(removed = outcome.removed_count(), "dry run, not updating iptables");
            false
        } else {
            self.io.apply(&outcome.lines).await?;
            info!(removed = outcome.removed_count(), "iptables log rules deleted");
            true
        };

        Ok(DeleteReport {
            lines_read: lines.len(),
            removed: outcome.removed,
            applied,
            dry_run,
        })
    }
}
