//! 重试模块
//!
//! 有界重试执行器: 每次尝试前打一条进度日志, 尝试之间等待策略给定的
//! 间隔, 预算耗尽后把最后一次错误包装成 ConnectionExhausted 上抛。
//! 每次尝试都是全新的连接构建, 尝试之间不保留任何中间状态。

use std::future::Future;
use std::time::Duration;

use glasshouse_errors::{AppError, AppResult};
use tracing::{info, warn};

/// 退避形状
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// 固定间隔(默认行为)
    Constant,
    /// 指数退避(扩展选项, 默认不启用)
    Exponential { multiplier: f64, max_delay: Duration },
}

/// 重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数(含首次)
    pub max_attempts: u32,
    /// 基础间隔
    pub base_delay: Duration,
    /// 退避形状
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(5),
            backoff: Backoff::Constant,
        }
    }
}

impl RetryPolicy {
    /// 固定间隔策略
    pub fn constant(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff: Backoff::Constant,
        }
    }

    /// 指数退避策略
    pub fn exponential(
        max_attempts: u32,
        base_delay: Duration,
        multiplier: f64,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff: Backoff::Exponential {
                multiplier,
                max_delay,
            },
        }
    }

    /// 第 attempt 次尝试(从 1 计)失败后的等待时长
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Constant => self.base_delay,
            Backoff::Exponential {
                multiplier,
                max_delay,
            } => {
                let millis = (self.base_delay.as_millis() as f64
                    * multiplier.powi(attempt.saturating_sub(1) as i32))
                    as u64;
                Duration::from_millis(millis).min(max_delay)
            }
        }
    }
}

/// 带重试的异步操作执行器
///
/// 操作成功立即返回; 失败且还有预算时等待后重来; 预算耗尽时返回
/// ConnectionExhausted, 携带实际尝试次数与最后一次失败原因。
pub async fn retry<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut last_error: Option<AppError> = None;

    for attempt in 1..=policy.max_attempts {
        info!(
            operation = operation_name,
            attempt,
            max_attempts = policy.max_attempts,
            "Attempting to connect"
        );

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(
                        operation = operation_name,
                        attempt, "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(e) => {
                if attempt < policy.max_attempts {
                    let delay = policy.delay_for_attempt(attempt);
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %e,
                        "Attempt failed, no retries left"
                    );
                }
                last_error = Some(e);
            }
        }
    }

    let last = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no attempts were made".to_string());
    Err(AppError::connection_exhausted(policy.max_attempts, last))
}
