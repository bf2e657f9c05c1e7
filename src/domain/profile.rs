//! 启动 profile

use std::fmt;

use clap::ValueEnum;

/// 主栈的 compose profile，决定启动哪些可选容器
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    #[default]
    Cpu,
    GpuNvidia,
    GpuAmd,
    /// 不传递 --profile
    None,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Cpu => "cpu",
            Profile::GpuNvidia => "gpu-nvidia",
            Profile::GpuAmd => "gpu-amd",
            Profile::None => "none",
        }
    }

    /// compose 的 `--profile` 值
    pub fn compose_profile(&self) -> Option<&'static str> {
        match self {
            Profile::None => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
