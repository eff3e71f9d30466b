//! 룰셋 입출력 추상화
//!
//! [`RuleSetIo`] trait은 "현재 룰셋 덤프"와 "새 룰셋 원자적 적용" 두 가지 외부 연산을
//! 추상화합니다. 운영 코드는 [`IptablesRuleSet`]을, 테스트는 메모리 구현을 사용합니다.
//!
//! ```text
//!   LogRuleManager
//!         |
//!    RuleSetIo (trait)
//!      |        |
//!  Iptables   Mock
//!      |
//!  iptables-save -c / iptables-restore -c
//! ```
//!
//! 덤프 텍스트는 `\n` 기준으로 분리하며 마지막 빈 요소도 유지합니다.
//! 적용 시 다시 `\n`으로 합치므로 변경되지 않은 입력은 바이트 단위로 동일하게 복원됩니다.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use droplog_core::config::IptablesConfig;

use crate::error::RuleSetError;

/// 룰셋 덤프/적용 연산
///
/// 두 연산 모두 외부 프로세스가 끝날 때까지 기다립니다. 재시도는 하지 않습니다.
pub trait RuleSetIo: Send + Sync {
    /// 현재 룰셋을 라인 시퀀스로 덤프합니다.
    ///
    /// 라인은 UTF-8 문자열입니다. 덤프에 UTF-8이 아닌 바이트(예: 다른 인코딩의 코멘트)가
    /// 섞여 있으면 손실 변환 후 그대로 되돌려 쓰는 대신 덤프 실패로 처리합니다.
    ///
    /// # Errors
    ///
    /// 권한 부족, 도구 부재, UTF-8이 아닌 출력일 때 `RuleSetError::Dump`
    fn dump(&self) -> impl Future<Output = Result<Vec<String>, RuleSetError>> + Send;

    /// 라인 시퀀스 전체를 하나의 원자적 연산으로 적용합니다.
    ///
    /// # Errors
    ///
    /// 권한 부족, 도구 부재, 입력 거부 시 `RuleSetError::Apply`
    fn apply(&self, lines: &[String]) -> impl Future<Output = Result<(), RuleSetError>> + Send;
}

/// 덤프 텍스트를 라인으로 분리합니다 (끝의 빈 요소 포함).
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_owned).collect()
}

/// 라인을 적용용 텍스트로 합칩니다.
pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

/// iptables-save / iptables-restore 기반 구현
#[derive(Debug, Clone)]
pub struct IptablesRuleSet {
    save_command: String,
    restore_command: String,
    counters: bool,
    timeout: Duration,
}

impl IptablesRuleSet {
    pub fn new(
        save_command: impl Into<String>,
        restore_command: impl Into<String>,
        counters: bool,
        timeout: Duration,
    ) -> Self {
        Self {
            save_command: save_command.into(),
            restore_command: restore_command.into(),
            counters,
            timeout,
        }
    }

    pub fn from_config(config: &IptablesConfig) -> Self {
        Self::new(
            config.save_command.clone(),
            config.restore_command.clone(),
            config.counters,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn command_line(&self, program: &str) -> String {
        if self.counters {
            format!("{program} -c")
        } else {
            program.to_owned()
        }
    }

    fn build(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        if self.counters {
            cmd.arg("-c");
        }
        cmd.kill_on_drop(true);
        cmd
    }

    async fn run_save(&self) -> Result<Vec<String>, String> {
        let mut cmd = self.build(&self.save_command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| format!("timed out after {}s", self.timeout.as_secs()))?
            .map_err(|e| format!("{e} (did you run as root?)"))?;

        if !output.status.success() {
            return Err(format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| {
                format!(
                    "output is not valid UTF-8 at byte {}; refusing to rewrite the rule set",
                    e.utf8_error().valid_up_to()
                )
            })?;
        Ok(split_lines(&text))
    }

    async fn run_restore(&self, payload: String) -> Result<(), String> {
        let mut cmd = self.build(&self.restore_command);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| format!("{e} (did you run as root?)"))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| "stdin was not captured".to_owned())?;

        // stderr 파이프가 차서 막히지 않도록 입력은 별도 태스크에서 씁니다.
        let writer = tokio::spawn(async move {
            stdin.write_all(payload.as_bytes()).await?;
            stdin.shutdown().await
        });

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| format!("timed out after {}s", self.timeout.as_secs()))?
            .map_err(|e| e.to_string())?;

        let write_result = writer
            .await
            .map_err(|e| format!("stdin writer task failed: {e}"))?;

        if !output.status.success() {
            return Err(format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        write_result.map_err(|e| format!("failed to write rules to stdin: {e}"))
    }
}

impl Default for IptablesRuleSet {
    fn default() -> Self {
        Self::from_config(&IptablesConfig::default())
    }
}

impl RuleSetIo for IptablesRuleSet {
    async fn dump(&self) -> Result<Vec<String>, RuleSetError> {
        let command = self.command_line(&self.save_command);
        debug!(command = %command, "dumping rule set");

        let lines = self
            .run_save()
            .await
            .map_err(|reason| RuleSetError::Dump {
                command: command.clone(),
                reason,
            })?;

        info!(command = %command, lines = lines.len(), "rule set dumped");
        Ok(lines)
    }

    async fn apply(&self, lines: &[String]) -> Result<(), RuleSetError> {
        let command = self.command_line(&self.restore_command);
        debug!(command = %command, lines = lines.len(), "applying rule set");

        self.run_restore(join_lines(lines))
            .await
            .map_err(|reason| RuleSetError::Apply {
                command: command.clone(),
                reason,
            })?;

        info!(command = %command, "rule set applied");
        Ok(())
    }
}
