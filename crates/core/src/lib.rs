//! droplog 공통 크레이트
//!
//! - [`config`]: `droplog.toml` 파싱, 환경변수 오버라이드, 유효성 검증
//! - [`error`]: 워크스페이스 전역 에러 타입
//! - [`types`]: 추적 체인 테이블 기본값, 인접성 모드 등 공유 도메인 타입

pub mod config;
pub mod error;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, DroplogError, IptablesError};

// 설정
pub use config::DroplogConfig;

// 도메인 타입
pub use types::AdjacencyMode;
