//! 依赖栈 HTTP 就绪探测
//!
//! 轮询健康检查地址，直到返回 2xx 或超出总超时

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{debug, info, warn};

/// 探测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// 第 `attempts` 次请求成功
    Ready { attempts: u32, elapsed: Duration },
    /// 超时仍未就绪
    TimedOut { attempts: u32 },
}

/// 就绪探测器
#[derive(Clone)]
pub struct ReadinessProbe {
    client: Client,
    url: String,
    interval: Duration,
    timeout: Duration,
}

impl ReadinessProbe {
    /// # Arguments
    /// * `url` - 健康检查地址
    /// * `interval` - 两次请求之间的间隔，同时作为单次请求超时
    /// * `timeout` - 总超时
    pub fn new(url: impl Into<String>, interval: Duration, timeout: Duration) -> Self {
        let request_timeout = interval.max(Duration::from_secs(1));
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build HTTP client, using defaults");
                Client::new()
            });

        Self {
            client,
            url: url.into(),
            interval,
            timeout,
        }
    }

    /// 轮询直到就绪或超时
    pub async fn wait_ready(&self) -> ProbeResult {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.client.get(&self.url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let elapsed = started.elapsed();
                    info!(url = %self.url, attempts, ?elapsed, "Dependency is ready");
                    return ProbeResult::Ready { attempts, elapsed };
                }
                Ok(resp) => {
                    debug!(url = %self.url, status = %resp.status(), attempt = attempts, "Dependency not ready yet");
                }
                Err(e) => {
                    debug!(url = %self.url, error = %e, attempt = attempts, "Readiness probe failed");
                }
            }

            if started.elapsed() + self.interval >= self.timeout {
                warn!(url = %self.url, attempts, "Readiness probe timed out after {:?}", self.timeout);
                return ProbeResult::TimedOut { attempts };
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
