//! droplog 룰셋 변환 크레이트
//!
//! # 모듈 구성
//!
//! - [`chain`]: 추적 체인 → 2글자 약어 테이블
//! - [`classifier`]: 덤프 라인 분류 (체인, 룰 ID, DROP 여부, 합성 로그 여부)
//! - [`synth`]: DROP 룰로부터 속도 제한 LOG 룰 합성
//! - [`pass`]: 삽입 패스 / 삭제 패스
//! - [`io`]: 룰셋 덤프/적용 추상화와 iptables 구현
//! - [`manager`]: 덤프 → 변환 → 적용 오케스트레이션
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! RuleSetIo::dump -> insert_log_rules / remove_log_rules -> RuleSetIo::apply
//!       |                     |                                  |
//!  iptables-save -c   LineClassifier + LogRuleSynthesizer   iptables-restore -c
//! ```

pub mod chain;
pub mod classifier;
pub mod error;
pub mod io;
pub mod manager;
pub mod pass;
pub mod synth;

// --- 주요 타입 re-export ---

pub use chain::ChainTable;
pub use classifier::{LineClass, LineClassifier};
pub use error::RuleSetError;
pub use io::{IptablesRuleSet, RuleSetIo};
pub use manager::{CreateReport, DeleteReport, LogRuleManager};
pub use pass::{InsertOutcome, RemoveOutcome, insert_log_rules, remove_log_rules};
pub use synth::LogRuleSynthesizer;
