//! 综合健康报告类型
//!
//! 两个后端各自一个布尔子项, 整体状态由子项推导, 每次检查现算, 不落盘。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 两个后端都健康时的整体状态
pub const STATUS_OK: &str = "ok";

/// 任一后端不健康时的整体状态
pub const STATUS_DEGRADED: &str = "degraded";

/// 综合健康报告
///
/// `mysql`/`redis` 为各后端的独立检查结果, `status` 恒由两者推导。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub status: String,
    pub mysql: bool,
    pub redis: bool,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    /// 由两个子项检查结果构建报告
    pub fn new(mysql: bool, redis: bool) -> Self {
        Self {
            status: Self::derive_status(mysql, redis).to_string(),
            mysql,
            redis,
            timestamp: Utc::now(),
        }
    }

    /// 推导整体状态
    pub fn derive_status(mysql: bool, redis: bool) -> &'static str {
        if mysql && redis {
            STATUS_OK
        } else {
            STATUS_DEGRADED
        }
    }

    /// 两个后端是否都健康
    pub fn is_ok(&self) -> bool {
        self.mysql && self.redis
    }
}
