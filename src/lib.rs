//! LocalAI Launcher - 本地 AI 栈启动器
//!
//! 先启动 Supabase 栈，等待其初始化，再启动本地 AI 栈。
//! 两个栈使用同一个 compose 项目名，作为一个整体管理。

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

pub use config::LaunchConfig;
pub use domain::Profile;
pub use error::{LaunchError, LaunchResult};
