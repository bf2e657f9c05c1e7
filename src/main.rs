//! LocalAI Launcher
//!
//! Usage:
//! - Default (cpu profile): `localai-launcher`
//! - Nvidia GPU: `localai-launcher --profile gpu-nvidia`
//! - Other directory: `localai-launcher --root /srv/local-ai-packaged`

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use localai_launcher::infra::SystemExecutor;
use localai_launcher::services::{self, LaunchContext};
use localai_launcher::{LaunchConfig, Profile};

#[derive(Parser, Debug)]
#[command(name = "localai-launcher")]
#[command(about = "Start the local AI and Supabase services")]
#[command(version)]
struct Cli {
    /// Profile to use for Docker Compose
    #[arg(long, value_enum, default_value_t = Profile::Cpu)]
    profile: Profile,

    /// Directory containing .env and docker-compose.yml (overrides LOCALAI_ROOT_DIR)
    #[arg(long)]
    root: Option<PathBuf>,
}

/// 环境变量配置 + 命令行覆盖
fn build_config(cli: &Cli) -> LaunchConfig {
    let mut config = LaunchConfig::from_env();
    if let Some(root) = &cli.root {
        config.root_dir = root.clone();
    }
    config
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 参数错误在任何副作用之前退出
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = build_config(&cli);
    let executor = Arc::new(SystemExecutor::new(config.command_timeout));
    let ctx = LaunchContext::new(config, executor);

    if let Err(e) = services::run(&ctx, cli.profile).await {
        eprintln!();
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_cpu() {
        let cli = Cli::try_parse_from(["localai-launcher"]).unwrap();
        assert_eq!(cli.profile, Profile::Cpu);
        assert!(cli.root.is_none());
    }

    #[test]
    fn test_accepts_known_profiles() {
        for name in ["cpu", "gpu-nvidia", "gpu-amd", "none"] {
            let cli = Cli::try_parse_from(["localai-launcher", "--profile", name]).unwrap();
            assert_eq!(cli.profile.as_str(), name);
        }
    }

    #[test]
    fn test_rejects_unknown_profile() {
        let err = Cli::try_parse_from(["localai-launcher", "--profile", "invalid-value"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_root_flag_overrides_env() {
        std::env::set_var("LOCALAI_ROOT_DIR", "/from/env");

        let cli = Cli::try_parse_from(["localai-launcher"]).unwrap();
        assert_eq!(build_config(&cli).root_dir, PathBuf::from("/from/env"));

        let cli = Cli::try_parse_from(["localai-launcher", "--root", "/from/flag"]).unwrap();
        let config = build_config(&cli);
        assert_eq!(config.root_dir, PathBuf::from("/from/flag"));
        assert_eq!(config.root_env_file(), PathBuf::from("/from/flag/.env"));
        assert_eq!(
            config.target_env_file(),
            PathBuf::from("/from/flag/supabase/docker/.env")
        );

        std::env::remove_var("LOCALAI_ROOT_DIR");
    }
}
