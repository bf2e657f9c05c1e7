//! 环境变量配置加载

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::domain::{DeploymentPlan, Profile, StackSpec};

use self::constants::*;

/// 启动配置
#[derive(Clone, Debug)]
pub struct LaunchConfig {
    /// 根目录（包含 .env 与主栈 docker-compose.yml）
    pub root_dir: PathBuf,
    /// compose 项目名（命名空间）
    pub project_name: String,
    /// 依赖仓库配置
    pub repo: RepoConfig,
    /// 外部命令超时（None 表示等待命令自然结束）
    pub command_timeout: Option<Duration>,
    /// 依赖栈就绪探测
    pub readiness: ReadinessConfig,
    /// 固定等待时间
    pub delays: Delays,
}

/// Supabase 仓库配置
#[derive(Clone, Debug)]
pub struct RepoConfig {
    pub url: String,
    /// 克隆到根目录下的目录名
    pub dir_name: String,
    /// 稀疏检出的子目录
    pub sparse_dir: String,
    pub branch: String,
}

/// 就绪探测配置（未配置 URL 时使用固定等待）
#[derive(Clone, Debug)]
pub struct ReadinessConfig {
    pub url: Option<String>,
    pub timeout: Duration,
    pub interval: Duration,
}

/// 各阶段的固定等待
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delays {
    pub git_retry: Duration,
    pub network_removal_settle: Duration,
    pub reclaim_settle: Duration,
    pub dependency_retry: Duration,
    pub primary_retry: Duration,
    pub dependency_cooldown: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            git_retry: Duration::from_secs(GIT_RETRY_DELAY_SECS),
            network_removal_settle: Duration::from_secs(NETWORK_REMOVAL_SETTLE_SECS),
            reclaim_settle: Duration::from_secs(RECLAIM_SETTLE_SECS),
            dependency_retry: Duration::from_secs(DEPENDENCY_RETRY_DELAY_SECS),
            primary_retry: Duration::from_secs(PRIMARY_RETRY_DELAY_SECS),
            dependency_cooldown: Duration::from_secs(DEPENDENCY_COOLDOWN_SECS),
        }
    }
}

impl Delays {
    /// 全部为零（测试用）
    pub fn none() -> Self {
        Self {
            git_retry: Duration::ZERO,
            network_removal_settle: Duration::ZERO,
            reclaim_settle: Duration::ZERO,
            dependency_retry: Duration::ZERO,
            primary_retry: Duration::ZERO,
            dependency_cooldown: Duration::ZERO,
        }
    }
}

impl LaunchConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let root_dir = env::var("LOCALAI_ROOT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let project_name =
            env::var("LOCALAI_PROJECT_NAME").unwrap_or_else(|_| DEFAULT_PROJECT_NAME.to_string());

        let repo = RepoConfig::from_env();

        // 未设置或为 0 时不限时
        let command_timeout = match parse_env_or("LOCALAI_COMMAND_TIMEOUT_SECS", 0) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let readiness = ReadinessConfig::from_env();

        Self {
            root_dir,
            project_name,
            repo,
            command_timeout,
            readiness,
            delays: Delays::default(),
        }
    }

    /// 使用默认值并指定根目录（测试用）
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            repo: RepoConfig::default(),
            command_timeout: None,
            readiness: ReadinessConfig::default(),
            delays: Delays::default(),
        }
    }

    /// 克隆目录，如 `<root>/supabase`
    pub fn repo_dir(&self) -> PathBuf {
        self.root_dir.join(&self.repo.dir_name)
    }

    /// 稀疏检出目录，如 `<root>/supabase/docker`
    pub fn sparse_path(&self) -> PathBuf {
        self.repo_dir().join(&self.repo.sparse_dir)
    }

    /// 根目录下的 .env
    pub fn root_env_file(&self) -> PathBuf {
        self.root_dir.join(ENV_FILE_NAME)
    }

    /// 依赖栈使用的 .env
    pub fn target_env_file(&self) -> PathBuf {
        self.sparse_path().join(ENV_FILE_NAME)
    }

    /// 根据 profile 构建部署计划
    pub fn plan(&self, profile: Profile) -> DeploymentPlan {
        let dependency_compose = Path::new(&self.repo.dir_name)
            .join(&self.repo.sparse_dir)
            .join(COMPOSE_FILE_NAME);

        DeploymentPlan {
            namespace: self.project_name.clone(),
            dependency: StackSpec::new("Supabase", dependency_compose),
            primary: StackSpec::new("local AI", COMPOSE_FILE_NAME).with_profile(profile),
        }
    }
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REPO_URL.to_string(),
            dir_name: DEFAULT_REPO_DIR.to_string(),
            sparse_dir: DEFAULT_SPARSE_DIR.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

impl RepoConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env::var("SUPABASE_REPO_URL").unwrap_or(defaults.url),
            dir_name: env::var("SUPABASE_REPO_DIR").unwrap_or(defaults.dir_name),
            sparse_dir: env::var("SUPABASE_SPARSE_DIR").unwrap_or(defaults.sparse_dir),
            branch: env::var("SUPABASE_BRANCH").unwrap_or(defaults.branch),
        }
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(READINESS_TIMEOUT_SECS),
            interval: Duration::from_secs(READINESS_INTERVAL_SECS),
        }
    }
}

impl ReadinessConfig {
    pub fn from_env() -> Self {
        let url = load_with_fallback("LOCALAI_READINESS_URL", "SUPABASE_READINESS_URL")
            .filter(|s| !s.is_empty());
        let timeout = Duration::from_secs(parse_env_or(
            "LOCALAI_READINESS_TIMEOUT_SECS",
            READINESS_TIMEOUT_SECS,
        ));

        Self {
            url,
            timeout,
            interval: Duration::from_secs(READINESS_INTERVAL_SECS),
        }
    }
}

/// 加载环境变量，支持 fallback
fn load_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    env::var(primary).ok().or_else(|| env::var(fallback).ok())
}

/// 解析数值环境变量，无效值回退到默认值
fn parse_env_or(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!(key = %key, value = %v, "Invalid numeric value, using default {}", default);
            default
        }),
        Err(_) => default,
    }
}

/// 常量
pub mod constants {
    pub const DEFAULT_PROJECT_NAME: &str = "localai";

    pub const DEFAULT_REPO_URL: &str = "https://github.com/supabase/supabase.git";
    pub const DEFAULT_REPO_DIR: &str = "supabase";
    pub const DEFAULT_SPARSE_DIR: &str = "docker";
    pub const DEFAULT_BRANCH: &str = "master";

    pub const ENV_FILE_NAME: &str = ".env";
    pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";

    /// git 操作最大尝试次数
    pub const GIT_MAX_ATTEMPTS: u32 = 3;
    pub const GIT_RETRY_DELAY_SECS: u64 = 5;

    /// compose up 最大尝试次数
    pub const LAUNCH_MAX_ATTEMPTS: u32 = 3;
    pub const DEPENDENCY_RETRY_DELAY_SECS: u64 = 5;
    pub const PRIMARY_RETRY_DELAY_SECS: u64 = 10;

    /// 依赖栈启动后、主栈启动前的等待
    pub const DEPENDENCY_COOLDOWN_SECS: u64 = 15;

    pub const NETWORK_REMOVAL_SETTLE_SECS: u64 = 2;
    /// 回收完成后的等待 (10s + 3s)
    pub const RECLAIM_SETTLE_SECS: u64 = 13;

    pub const READINESS_TIMEOUT_SECS: u64 = 120;
    pub const READINESS_INTERVAL_SECS: u64 = 2;

    /// 启动成功后展示的服务地址
    pub const SERVICE_ENDPOINTS: &[(&str, &str)] = &[
        ("n8n", "http://localhost:5678"),
        ("Open WebUI", "http://localhost:3000"),
        ("Supabase Studio", "http://localhost:8000"),
        ("Flowise", "http://localhost:3001"),
        ("Qdrant Dashboard", "http://localhost:6333"),
    ];

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
