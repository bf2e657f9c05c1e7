//! 部署计划：命名空间与两个 compose 栈的期望状态描述

use std::path::{Path, PathBuf};

use super::profile::Profile;

/// 一个 compose 栈
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackSpec {
    /// 展示名称（如 "Supabase"）
    pub name: String,
    /// compose 文件路径（相对于根目录）
    pub compose_files: Vec<PathBuf>,
    pub profile: Option<Profile>,
}

impl StackSpec {
    pub fn new(name: impl Into<String>, compose_file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            compose_files: vec![compose_file.into()],
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// `docker compose` 之后的参数：`-p <ns> [--profile P] -f <file>... up -d`
    pub fn up_args(&self, namespace: &str) -> Vec<String> {
        let mut args = vec!["compose".to_string(), "-p".to_string(), namespace.to_string()];
        if let Some(profile) = self.profile.and_then(|p| p.compose_profile()) {
            args.push("--profile".to_string());
            args.push(profile.to_string());
        }
        for file in &self.compose_files {
            args.push("-f".to_string());
            args.push(file.to_string_lossy().into_owned());
        }
        args.push("up".to_string());
        args.push("-d".to_string());
        args
    }

    /// 不存在的 compose 文件
    pub fn missing_files(&self, root: &Path) -> Vec<PathBuf> {
        self.compose_files
            .iter()
            .map(|f| root.join(f))
            .filter(|p| !p.is_file())
            .collect()
    }
}

/// 期望的集群状态
///
/// 回收与启动都基于同一份计划，保证两个栈使用相同的命名空间
#[derive(Clone, Debug)]
pub struct DeploymentPlan {
    pub namespace: String,
    /// 先启动的依赖栈
    pub dependency: StackSpec,
    /// 后启动的主栈
    pub primary: StackSpec,
}

impl DeploymentPlan {
    /// 覆盖两个栈的所有 compose 文件（主栈在前）
    pub fn all_compose_files(&self) -> Vec<PathBuf> {
        self.primary
            .compose_files
            .iter()
            .chain(self.dependency.compose_files.iter())
            .cloned()
            .collect()
    }

    /// `docker compose ... down --remove-orphans` 的参数
    pub fn down_args(&self) -> Vec<String> {
        let mut args = vec!["compose".to_string(), "-p".to_string(), self.namespace.clone()];
        for file in self.all_compose_files() {
            args.push("-f".to_string());
            args.push(file.to_string_lossy().into_owned());
        }
        args.push("down".to_string());
        args.push("--remove-orphans".to_string());
        args
    }

    /// compose 默认创建的网络
    pub fn default_network(&self) -> String {
        format!("{}_default", self.namespace)
    }

    /// docker 的名称过滤器
    pub fn name_filter(&self) -> String {
        format!("name={}", self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(profile: Profile) -> DeploymentPlan {
        DeploymentPlan {
            namespace: "localai".to_string(),
            dependency: StackSpec::new("Supabase", "supabase/docker/docker-compose.yml"),
            primary: StackSpec::new("local AI", "docker-compose.yml").with_profile(profile),
        }
    }

    #[test]
    fn test_up_args_with_profile() {
        let plan = plan(Profile::GpuNvidia);
        assert_eq!(
            plan.primary.up_args(&plan.namespace),
            vec!["compose", "-p", "localai", "--profile", "gpu-nvidia", "-f", "docker-compose.yml", "up", "-d"]
        );
    }

    #[test]
    fn test_up_args_profile_none_omits_flag() {
        let plan = plan(Profile::None);
        let args = plan.primary.up_args(&plan.namespace);
        assert!(!args.contains(&"--profile".to_string()));
        assert_eq!(
            plan.dependency.up_args(&plan.namespace),
            vec!["compose", "-p", "localai", "-f", "supabase/docker/docker-compose.yml", "up", "-d"]
        );
    }

    #[test]
    fn test_down_args_cover_both_stacks() {
        let plan = plan(Profile::Cpu);
        assert_eq!(
            plan.down_args(),
            vec![
                "compose",
                "-p",
                "localai",
                "-f",
                "docker-compose.yml",
                "-f",
                "supabase/docker/docker-compose.yml",
                "down",
                "--remove-orphans"
            ]
        );
        assert_eq!(plan.default_network(), "localai_default");
        assert_eq!(plan.name_filter(), "name=localai");
    }
}
