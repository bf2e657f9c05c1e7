//! 服务层模块
//!
//! 启动流程的各个阶段

pub mod context;
pub mod env_prep;
pub mod fetch;
pub mod launch;
pub mod launcher;
pub mod prereq;
pub mod reclaim;

pub use context::LaunchContext;
pub use launcher::{run, LaunchReport};
