//! 命令执行器
//!
//! 提供统一的外部命令执行接口，支持：
//! - 实时输出到终端（git / compose 进度）
//! - 可选超时控制（默认不限时）
//! - stdout/stderr 捕获
//! - 可替换的执行后端（测试中使用脚本化实现）

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error};

use crate::domain::outcome::CommandOutcome;

/// 命令执行错误
#[derive(Debug)]
pub enum CommandError {
    /// 命令启动失败（通常是程序不存在）
    SpawnFailed(std::io::Error),
    /// 命令超时
    Timeout(Duration),
    /// 等待命令完成失败
    WaitFailed(std::io::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::SpawnFailed(e) => write!(f, "Failed to spawn command: {}", e),
            CommandError::Timeout(t) => write!(f, "Command timed out after {:?}", t),
            CommandError::WaitFailed(e) => write!(f, "Failed to wait for command: {}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::SpawnFailed(e) | CommandError::WaitFailed(e) => Some(e),
            CommandError::Timeout(_) => None,
        }
    }
}

/// 一次外部命令调用
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
    /// 是否把输出实时转发到终端
    pub stream: bool,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I, work_dir: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            work_dir: work_dir.to_path_buf(),
            stream: false,
        }
    }

    /// 输出实时转发到终端
    pub fn streamed(mut self) -> Self {
        self.stream = true;
        self
    }

    /// 程序名 + 参数，用于匹配和展示
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// 命令执行后端
///
/// 非零退出码不是错误，由调用方通过 `CommandOutcome::success` 判断
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutcome, CommandError>;
}

/// 基于 tokio 子进程的执行器
pub struct SystemExecutor {
    /// None 表示等待命令自然结束
    timeout: Option<Duration>,
}

impl SystemExecutor {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// 执行命令，边读边捕获输出
    ///
    /// `stream` 为 true 时 stdout/stderr 逐行转发到终端；
    /// 超时后子进程会被 kill
    pub async fn run_with_streaming(
        invocation: &Invocation,
        timeout: Option<Duration>,
    ) -> Result<(ExitStatus, String, String), CommandError> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(CommandError::SpawnFailed)?;

        let stream = invocation.stream;
        let stdout_task = child
            .stdout
            .take()
            .map(|out| tokio::spawn(collect_lines(out, stream, false)));
        let stderr_task = child
            .stderr
            .take()
            .map(|err| tokio::spawn(collect_lines(err, stream, true)));

        let status = match timeout {
            Some(limit) => {
                tokio::select! {
                    status = child.wait() => status.map_err(CommandError::WaitFailed)?,
                    _ = tokio::time::sleep(limit) => {
                        error!(command = %invocation, "Command timed out after {:?}", limit);
                        let _ = child.kill().await;
                        return Err(CommandError::Timeout(limit));
                    }
                }
            }
            None => child.wait().await.map_err(CommandError::WaitFailed)?,
        };

        // 等待日志读取完成
        let stdout = match stdout_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        Ok((status, stdout, stderr))
    }
}

/// 逐行读取输出，可选转发到终端
async fn collect_lines<R>(reader: R, echo: bool, to_stderr: bool) -> String
where
    R: AsyncRead + Unpin,
{
    let mut captured = String::new();
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if echo {
            if to_stderr {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }
        captured.push_str(&line);
        captured.push('\n');
    }
    captured
}

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutcome, CommandError> {
        debug!(command = %invocation, work_dir = %invocation.work_dir.display(), "Executing");
        let (status, stdout, stderr) = Self::run_with_streaming(invocation, self.timeout).await?;
        Ok(CommandOutcome {
            exit_code: status.code(),
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp() -> PathBuf {
        std::env::temp_dir()
    }

    #[tokio::test]
    async fn test_run_success_captures_stdout() {
        let executor = SystemExecutor::new(None);
        let outcome = executor
            .run(&Invocation::new("echo", ["hello"], &tmp()))
            .await
            .unwrap();

        assert!(outcome.success());
        assert!(outcome.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_streamed_output_is_still_captured() {
        let executor = SystemExecutor::new(None);
        let outcome = executor
            .run(&Invocation::new("sh", ["-c", "echo out; echo err >&2"], &tmp()).streamed())
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.stdout, "out\n");
        assert_eq!(outcome.stderr, "err\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_outcome() {
        let executor = SystemExecutor::new(None);
        let outcome = executor
            .run(&Invocation::new("sh", ["-c", "echo boom >&2; exit 3"], &tmp()))
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, Some(3));
        assert!(outcome.stderr.contains("boom"));
    }

    #[tokio::test]
    async fn test_slow_command_without_timeout_completes() {
        let executor = SystemExecutor::new(None);
        let outcome = executor
            .run(
                &Invocation::new("sh", ["-c", "echo Pulling ollama layer; sleep 1; exit 0"], &tmp())
                    .streamed(),
            )
            .await
            .unwrap();

        assert!(outcome.success());
        assert!(outcome.stdout.contains("Pulling ollama layer"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let executor = SystemExecutor::new(None);
        let result = executor
            .run(&Invocation::new("nonexistent_command_12345", Vec::<String>::new(), &tmp()))
            .await;

        assert!(matches!(result, Err(CommandError::SpawnFailed(_))));
    }

    #[tokio::test]
    async fn test_explicit_timeout_kills_command() {
        let executor = SystemExecutor::new(Some(Duration::from_millis(50)));
        let result = executor.run(&Invocation::new("sleep", ["5"], &tmp())).await;

        assert!(matches!(result, Err(CommandError::Timeout(_))));
    }

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new("docker", ["compose", "version"], Path::new("/"));
        assert_eq!(inv.to_string(), "docker compose version");
        assert!(!inv.stream);
        assert!(inv.streamed().stream);
    }
}
