//! 综合健康报告器
//!
//! 两个后端独立复查: 关系库走新建连接的认证往返, 文档库走就绪 PING。
//! 子项失败只记为 false, 不上抛; 两项并发执行, 各自有超时兜底,
//! 报告每次现算, 不落盘。

use std::time::Duration;

use async_trait::async_trait;
use glasshouse_adapter_mysql::{MysqlConfig, authenticate_round_trip};
use glasshouse_adapter_redis::DocumentStore;
use glasshouse_common::HealthReport;
use glasshouse_errors::AppResult;
use glasshouse_ports::HealthProbe;
use tracing::warn;

/// 综合健康报告器
pub struct HealthReporter {
    mysql: MysqlConfig,
    document: DocumentStore,
    check_timeout: Duration,
}

impl HealthReporter {
    pub fn new(mysql: MysqlConfig, document: DocumentStore) -> Self {
        Self {
            mysql,
            document,
            check_timeout: Duration::from_secs(5),
        }
    }

    /// 设置单项检查超时
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self.document = self.document.with_check_timeout(timeout);
        self
    }

    async fn check_mysql(&self) -> bool {
        match tokio::time::timeout(self.check_timeout, authenticate_round_trip(&self.mysql)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "MySQL health sub-check failed");
                false
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.check_timeout.as_secs(),
                    "MySQL health sub-check timed out"
                );
                false
            }
        }
    }
}

#[async_trait]
impl HealthProbe for HealthReporter {
    async fn probe(&self) -> AppResult<HealthReport> {
        let (mysql, redis) = tokio::join!(self.check_mysql(), self.document.check());
        Ok(HealthReport::new(mysql, redis))
    }
}
