//! config - 配置加载库
//!
//! 全部配置来自进程环境变量(前缀 `GLASSHOUSE_`, 嵌套段用 `__` 分隔),
//! `.env` 文件由各二进制入口先行加载。除 JWT 密钥外的字段都带演示环境
//! 默认值; 密钥没有默认值, 缺失时加载直接失败。

use figment::{Figment, providers::Env};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 关系库(MySQL)配置
///
/// `pool_min`/`pool_max` 可一起调到 1, 用于资源受限部署的单连接模式。
#[derive(Debug, Clone, Deserialize)]
pub struct MysqlSettings {
    #[serde(default = "default_mysql_host")]
    pub host: String,
    #[serde(default = "default_mysql_port")]
    pub port: u16,
    #[serde(default = "default_mysql_database")]
    pub database: String,
    #[serde(default = "default_mysql_username")]
    pub username: String,
    #[serde(default = "default_mysql_password")]
    pub password: Secret<String>,
    #[serde(default = "default_pool_min")]
    pub pool_min: u32,
    #[serde(default = "default_pool_max")]
    pub pool_max: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// SSL 模式。`required` 只加密不验证服务端证书, 是面向自签名证书
    /// 部署的显式信任放宽, 需要在部署配置里写明才会生效。
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
}

fn default_mysql_host() -> String {
    "127.0.0.1".to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_mysql_database() -> String {
    "glasshouse_sqldb".to_string()
}

fn default_mysql_username() -> String {
    "root".to_string()
}

fn default_mysql_password() -> Secret<String> {
    Secret::new(String::new())
}

fn default_pool_min() -> u32 {
    1
}

fn default_pool_max() -> u32 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    20
}

fn default_idle_timeout_secs() -> u64 {
    600
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_ssl_mode() -> String {
    "preferred".to_string()
}

impl Default for MysqlSettings {
    fn default() -> Self {
        Self {
            host: default_mysql_host(),
            port: default_mysql_port(),
            database: default_mysql_database(),
            username: default_mysql_username(),
            password: default_mysql_password(),
            pool_min: default_pool_min(),
            pool_max: default_pool_max(),
            connect_timeout_secs: default_connect_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            ssl_mode: default_ssl_mode(),
        }
    }
}

/// 文档库(Redis)配置
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSettings {
    #[serde(default = "default_document_url")]
    pub url: Secret<String>,
}

fn default_document_url() -> Secret<String> {
    Secret::new("redis://127.0.0.1:6379".to_string())
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            url: default_document_url(),
        }
    }
}

/// 监听器配置
///
/// REST 与 GraphQL 各占一个端口; SOAP 挂载在 REST 监听器的固定路径下;
/// XML-RPC 监听器由外部协作方启动, 这里只记录其端口用于就绪播报。
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerSettings {
    #[serde(default = "default_listen_host")]
    pub host: String,
    #[serde(default = "default_rest_port")]
    pub rest_port: u16,
    #[serde(default = "default_graphql_port")]
    pub graphql_port: u16,
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_soap_mount")]
    pub soap_mount: String,
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

fn default_rest_port() -> u16 {
    4000
}

fn default_graphql_port() -> u16 {
    4001
}

fn default_rpc_port() -> u16 {
    9090
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_soap_mount() -> String {
    "/userservice".to_string()
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            host: default_listen_host(),
            rest_port: default_rest_port(),
            graphql_port: default_graphql_port(),
            rpc_port: default_rpc_port(),
            api_prefix: default_api_prefix(),
            soap_mount: default_soap_mount(),
        }
    }
}

/// JWT 配置
///
/// `secret` 必须由环境变量提供, 不设默认值。
/// `insecure_demo_verification` 打开后验证器接受 `alg: none` 的无签名
/// 令牌并忽略过期时间 —— 仅用于漏洞演示环境, 默认关闭。
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub secret: Secret<String>,
    #[serde(default = "default_expires_in_secs")]
    pub expires_in_secs: u64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default)]
    pub insecure_demo_verification: bool,
}

fn default_expires_in_secs() -> u64 {
    // 2 天
    172_800
}

fn default_issuer() -> String {
    "glasshouse".to_string()
}

/// 重试策略配置
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default)]
    pub backoff: BackoffKind,
}

/// 退避形状
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// 每次等待固定间隔(默认行为)
    #[default]
    Constant,
    /// 指数退避(扩展选项)
    Exponential,
}

fn default_retry_max_attempts() -> u32 {
    5
}

fn default_retry_base_delay_ms() -> u64 {
    5000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            base_delay_ms: default_retry_base_delay_ms(),
            backoff: BackoffKind::default(),
        }
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub mysql: MysqlSettings,
    #[serde(default)]
    pub document: DocumentSettings,
    #[serde(default)]
    pub listeners: ListenerSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

fn default_app_name() -> String {
    "glasshouse".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从进程环境变量加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Env::prefixed("GLASSHOUSE_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
