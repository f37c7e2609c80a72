//! 统一错误类型定义
//!
//! 所有后端连接、预置和健康检查路径共享同一个错误枚举,
//! 保证启动流程中的错误分类在各层之间传递时不丢失语义。

use thiserror::Error;

/// 应用统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 网络层连接失败(拒绝连接、超时、DNS 解析失败等)
    #[error("network error: {0}")]
    Network(String),

    /// 后端凭据被拒绝
    #[error("authentication error: {0}")]
    Authentication(String),

    /// 重试次数耗尽后的终态错误, 保留最后一次失败原因
    #[error("connection attempts exhausted after {attempts} tries: {last}")]
    ConnectionExhausted { attempts: u32, last: String },

    /// 数据库预置(建库/种子数据)失败
    #[error("provisioning error: {0}")]
    Provisioning(String),

    /// 健康检查子项失败
    #[error("health check error: {0}")]
    HealthCheck(String),

    /// 配置加载或校验失败
    #[error("configuration error: {0}")]
    Config(String),

    /// 写入目标已存在
    #[error("conflict: {0}")]
    Conflict(String),

    /// 请求未授权
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 未分类的内部错误
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// 创建网络错误
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// 创建认证错误
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// 创建重试耗尽错误
    pub fn connection_exhausted(attempts: u32, last: impl Into<String>) -> Self {
        Self::ConnectionExhausted {
            attempts,
            last: last.into(),
        }
    }

    /// 创建预置错误
    pub fn provisioning(msg: impl Into<String>) -> Self {
        Self::Provisioning(msg.into())
    }

    /// 创建健康检查错误
    pub fn health_check(msg: impl Into<String>) -> Self {
        Self::HealthCheck(msg.into())
    }

    /// 创建配置错误
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// 创建冲突错误
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// 创建未授权错误
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// 创建内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Conflict(_) => 409,
            Self::Network(_) => 502,
            Self::ConnectionExhausted { .. } => 503,
            Self::Authentication(_)
            | Self::Provisioning(_)
            | Self::HealthCheck(_)
            | Self::Config(_)
            | Self::Internal(_) => 500,
        }
    }

    /// 错误是否属于连接类故障(网络或重试耗尽)
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::ConnectionExhausted { .. } | Self::Authentication(_)
        )
    }
}

/// 应用统一结果类型
pub type AppResult<T> = Result<T, AppError>;
