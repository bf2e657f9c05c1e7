//! 领域模型模块
//!
//! 纯数据结构，不依赖 tokio

pub mod outcome;
pub mod profile;
pub mod stack;
pub mod stage;

pub use outcome::CommandOutcome;
pub use profile::Profile;
pub use stack::{DeploymentPlan, StackSpec};
pub use stage::{StageRecord, StageStatus};
