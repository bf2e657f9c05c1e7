//! 基础设施模块
//!
//! 封装外部依赖（命令执行、HTTP 就绪探测）

pub mod command;
pub mod readiness;

#[cfg(test)]
pub mod testing;

pub use command::{CommandError, CommandExecutor, Invocation, SystemExecutor};
pub use readiness::ReadinessProbe;
