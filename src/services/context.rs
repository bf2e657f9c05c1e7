//! 启动上下文
//!
//! 统一的执行上下文，包含配置、命令执行后端和面向操作员的输出

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LaunchConfig;
use crate::domain::CommandOutcome;
use crate::infra::{CommandError, CommandExecutor, Invocation};

/// 单步命令失败
#[derive(Debug)]
pub enum StepError {
    /// 无法执行（程序不存在、超时等）
    Command(CommandError),
    /// 非零退出
    Exit(CommandOutcome),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::Command(e) => write!(f, "{}", e),
            StepError::Exit(outcome) => write!(f, "{}", outcome.diagnostic()),
        }
    }
}

impl std::error::Error for StepError {}

/// 启动执行上下文
#[derive(Clone)]
pub struct LaunchContext {
    pub config: Arc<LaunchConfig>,
    pub executor: Arc<dyn CommandExecutor>,
}

impl LaunchContext {
    pub fn new(config: LaunchConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            config: Arc::new(config),
            executor,
        }
    }

    /// 输出到 stdout
    pub fn log_stdout(&self, content: &str) {
        println!("{}", content);
    }

    /// 输出到 stderr
    pub fn log_stderr(&self, content: &str) {
        eprintln!("{}", content);
    }

    /// 执行命令，打印命令行并转发输出；非零退出视为失败
    pub async fn run<I, S>(&self, program: &str, args: I, work_dir: &Path) -> Result<CommandOutcome, StepError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let invocation = Invocation::new(program, args, work_dir).streamed();
        self.log_stdout(&format!("Running: {}", invocation));
        self.run_quiet(&invocation).await
    }

    /// 执行命令但不打印命令行
    pub async fn run_quiet(&self, invocation: &Invocation) -> Result<CommandOutcome, StepError> {
        let outcome = self
            .executor
            .run(invocation)
            .await
            .map_err(StepError::Command)?;
        if outcome.success() {
            Ok(outcome)
        } else {
            Err(StepError::Exit(outcome))
        }
    }

    /// 固定等待，零时长直接返回
    pub async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.config.root_dir
    }
}
