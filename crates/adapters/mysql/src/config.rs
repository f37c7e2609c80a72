//! MySQL 配置模块
//!
//! 提供连接参数、连接池与 SSL 设置, 并负责组装 sqlx 连接选项

use serde::{Deserialize, Serialize};
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use std::time::Duration;

/// SSL 模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    /// 禁用 SSL
    Disabled,
    /// 允许 SSL（如果服务器支持）
    #[default]
    Preferred,
    /// 要求加密但不验证服务端证书。这是面向自签名证书部署的
    /// 显式信任放宽, 必须在配置里写明, 不是默认行为。
    Required,
    /// 验证 CA 证书
    VerifyCa,
    /// 验证完整证书链与主机名
    VerifyIdentity,
}

impl SslMode {
    /// 配置字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disabled => "disabled",
            SslMode::Preferred => "preferred",
            SslMode::Required => "required",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyIdentity => "verify-identity",
        }
    }

    /// 从配置字符串解析, 未知值回落到 Preferred
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "disabled" => SslMode::Disabled,
            "required" => SslMode::Required,
            "verify-ca" | "verify_ca" => SslMode::VerifyCa,
            "verify-identity" | "verify_identity" => SslMode::VerifyIdentity,
            _ => SslMode::Preferred,
        }
    }

    /// 转换为 sqlx 的 SSL 模式
    pub fn to_sqlx(self) -> MySqlSslMode {
        match self {
            SslMode::Disabled => MySqlSslMode::Disabled,
            SslMode::Preferred => MySqlSslMode::Preferred,
            SslMode::Required => MySqlSslMode::Required,
            SslMode::VerifyCa => MySqlSslMode::VerifyCa,
            SslMode::VerifyIdentity => MySqlSslMode::VerifyIdentity,
        }
    }
}

/// MySQL 配置
#[derive(Debug, Clone)]
pub struct MysqlConfig {
    // 基础配置
    /// 主机
    pub host: String,
    /// 端口
    pub port: u16,
    /// 数据库名
    pub database: String,
    /// 用户名
    pub username: String,
    /// 密码
    pub password: Option<String>,
    /// SSL 模式
    pub ssl_mode: SslMode,

    // 连接池配置
    /// 最小连接数
    pub pool_min: u32,
    /// 最大连接数（受限部署可与最小值一起调到 1）
    pub pool_max: u32,
    /// 连接超时
    pub connect_timeout: Duration,
    /// 空闲超时
    pub idle_timeout: Duration,
    /// 获取连接超时
    pub acquire_timeout: Duration,
}

impl Default for MysqlConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            database: "glasshouse_sqldb".to_string(),
            username: "root".to_string(),
            password: None,
            ssl_mode: SslMode::default(),
            pool_min: 1,
            pool_max: 10,
            connect_timeout: Duration::from_secs(20),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl MysqlConfig {
    /// 从组件创建配置
    pub fn from_components(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    /// 设置密码
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// 设置 SSL 模式
    pub fn with_ssl_mode(mut self, mode: SslMode) -> Self {
        self.ssl_mode = mode;
        self
    }

    /// 设置连接池边界
    pub fn with_pool(mut self, min: u32, max: u32) -> Self {
        self.pool_min = min;
        self.pool_max = max;
        self
    }

    /// 设置连接超时
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// 设置空闲超时
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// 设置获取连接超时
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// 组装 sqlx 连接选项（选中目标数据库）
    pub fn connect_options(&self) -> MySqlConnectOptions {
        self.server_options().database(&self.database)
    }

    /// 组装 sqlx 连接选项（不选数据库, 用于建库前的服务器级连接）
    pub fn server_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .ssl_mode(self.ssl_mode.to_sqlx());

        if let Some(ref password) = self.password {
            options = options.password(password);
        }

        options
    }
}
