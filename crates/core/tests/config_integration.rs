//! droplog.toml 통합 설정 테스트
//!
//! - droplog.toml.example 파싱 테스트
//! - 파일 로딩 / 환경변수 우선순위 테스트
//! - 잘못된 형식 에러 테스트

use std::io::Write;

use droplog_core::config::DroplogConfig;
use droplog_core::error::{ConfigError, DroplogError};
use droplog_core::types::{AdjacencyMode, default_chain_map};

// =============================================================================
// droplog.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../droplog.toml.example");
    let config = DroplogConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.iptables.save_command, "iptables-save");
    assert_eq!(config.iptables.timeout_secs, 30);
    assert_eq!(config.logging.rate_limit, "6/min");
    assert_eq!(config.logging.adjacency, AdjacencyMode::Reset);
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../droplog.toml.example");
    let config = DroplogConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_chain_table_matches_builtin_default() {
    let content = include_str!("../../../droplog.toml.example");
    let config = DroplogConfig::parse(content).expect("should parse");
    assert_eq!(config.chains, default_chain_map());
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
#[serial_test::serial]
async fn load_reads_file_and_validates() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[iptables]\ntimeout_secs = 5\n\n[chains]\nFORWARD_USER = \"FW\"")
        .expect("write");

    let config = DroplogConfig::load(file.path()).await.expect("should load");
    assert_eq!(config.iptables.timeout_secs, 5);
    assert_eq!(config.chains.len(), 1);
}

#[tokio::test]
#[serial_test::serial]
async fn load_rejects_invalid_chain_code() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[chains]\nUBIOS_WAN_OUT_USER = \"W0\"").expect("write");

    let err = DroplogConfig::load(file.path()).await.unwrap_err();
    assert!(matches!(
        err,
        DroplogError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[tokio::test]
#[serial_test::serial]
async fn env_override_takes_precedence_over_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[iptables]\nsave_command = \"iptables-legacy-save\"").expect("write");

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("DROPLOG_IPTABLES_SAVE_COMMAND", "ip6tables-save") };
    let result = DroplogConfig::load(file.path()).await;
    unsafe { std::env::remove_var("DROPLOG_IPTABLES_SAVE_COMMAND") };

    let config = result.expect("should load");
    assert_eq!(config.iptables.save_command, "ip6tables-save");
}

#[tokio::test]
#[serial_test::serial]
async fn load_or_default_without_path_uses_defaults() {
    let config = DroplogConfig::load_or_default(None)
        .await
        .expect("defaults should validate");
    assert_eq!(config.chains, default_chain_map());
}

#[tokio::test]
async fn load_or_default_with_missing_path_fails() {
    let err = DroplogConfig::load_or_default(Some(std::path::Path::new(
        "/nonexistent/droplog.toml",
    )))
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        DroplogError::Config(ConfigError::FileNotFound { .. })
    ));
}
