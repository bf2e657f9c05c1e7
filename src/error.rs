//! 统一错误处理
//!
//! 所有致命错误最终都以 `LaunchError` 返回到 main，打印后以退出码 1 结束

use std::path::PathBuf;

use thiserror::Error;

/// 致命错误
#[derive(Debug, Error)]
pub enum LaunchError {
    /// 依赖工具缺失或无法执行
    #[error("Required program `{tool}` is not available: {reason}")]
    MissingTool { tool: String, reason: String },

    #[error("{} file not found", .path.display())]
    MissingEnvFile { path: PathBuf },

    /// 无法判断 .env 是否存在（权限、路径等问题）
    #[error("Cannot access {}: {source}", .path.display())]
    EnvFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Docker compose file not found: {}", .path.display())]
    MissingComposeFile { path: PathBuf },

    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    EnvCopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// git 操作重试耗尽
    #[error("`{command}` failed after {attempts} attempts: {detail}")]
    GitFailed {
        command: String,
        attempts: u32,
        detail: String,
    },

    /// compose up 重试耗尽
    #[error("Failed to start {stack} services after {attempts} attempts")]
    StackLaunchFailed { stack: String, attempts: u32 },

}

/// 便捷类型别名
pub type LaunchResult<T> = Result<T, LaunchError>;
