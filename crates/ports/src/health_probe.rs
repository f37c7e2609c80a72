//! HealthProbe trait 定义

use async_trait::async_trait;
use glasshouse_common::HealthReport;
use glasshouse_errors::AppResult;

/// 复合健康探测 trait
///
/// 探测所有后端并汇总为一份报告。单个后端不可用不是错误，
/// 只会体现在报告字段里；Err 仅用于探测本身无法执行的情况。
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> AppResult<HealthReport>;
}
