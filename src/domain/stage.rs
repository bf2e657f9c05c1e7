//! 启动阶段记录

use chrono::{DateTime, Utc};

/// 阶段状态
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Running,
    Success,
    /// 失败但可继续（如仓库更新失败但本地副本可用）
    Degraded,
    Failed,
    Skipped,
}

impl StageStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            StageStatus::Success => "✓",
            StageStatus::Degraded => "!",
            StageStatus::Failed => "✗",
            StageStatus::Skipped => "⊘",
            StageStatus::Running => "⟳",
            StageStatus::Pending => "○",
        }
    }
}

/// 单个阶段的执行信息
#[derive(Clone, Debug)]
pub struct StageRecord {
    /// 阶段标识 (e.g., "fetch_repository", "launch_primary")
    pub name: String,
    /// 显示名称 (e.g., "Fetch Repository")
    pub display_name: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// 持续时间（毫秒）
    pub duration_ms: Option<i64>,
    pub status: StageStatus,
    pub message: Option<String>,
}

impl StageRecord {
    pub fn new(name: &str, display_name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            started_at: None,
            finished_at: None,
            duration_ms: None,
            status: StageStatus::Pending,
            message: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
        self.status = StageStatus::Running;
    }

    pub fn finish(&mut self, status: StageStatus, message: Option<String>) {
        let now = Utc::now();
        self.finished_at = Some(now);
        self.status = status;
        self.message = message;
        if let Some(started) = self.started_at {
            self.duration_ms = Some((now - started).num_milliseconds());
        }
    }

    pub fn skip(&mut self, reason: Option<String>) {
        self.status = StageStatus::Skipped;
        self.message = reason;
    }

    /// 摘要行，如 `✓ Fetch Repository (120ms)`
    pub fn summary_line(&self) -> String {
        let duration = self
            .duration_ms
            .map(|d| format!("{}ms", d))
            .unwrap_or_else(|| "-".to_string());
        match &self.message {
            Some(msg) => format!("{} {} ({}) - {}", self.status.icon(), self.display_name, duration, msg),
            None => format!("{} {} ({})", self.status.icon(), self.display_name, duration),
        }
    }
}
