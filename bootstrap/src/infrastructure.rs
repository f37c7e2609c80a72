//! 基础设施资源管理
//!
//! 进程内唯一的一组后端句柄由这里创建并持有: 一个关系库连接池、
//! 一个文档库连接、一个令牌服务。句柄向外只发廉价克隆, 不开新池,
//! 也不设模块级全局变量。

use std::sync::Arc;
use std::time::Duration;

use glasshouse_adapter_mysql::{self as mysql, MysqlConfig, SslMode};
use glasshouse_adapter_redis::{DocumentStore, RedisUserStore};
use glasshouse_auth_core::TokenService;
use glasshouse_config::{AppConfig, BackoffKind, MysqlSettings, RetrySettings};
use glasshouse_errors::AppResult;
use secrecy::ExposeSecret;
use sqlx::MySqlPool;
use tracing::{info, warn};

use crate::health::HealthReporter;
use crate::retry::{RetryPolicy, retry};

/// 基础设施资源容器
pub struct Infrastructure {
    config: AppConfig,
    document: DocumentStore,
    mysql_pool: MySqlPool,
    token_service: Arc<TokenService>,
}

impl Infrastructure {
    /// 按固定顺序建立全部后端连接
    ///
    /// 文档库先行(单次尝试, 失败即终止), 关系库随后(经重试器),
    /// 最后构建令牌服务。后面的阶段假定前面的已成功。
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        // 1. 文档库: 单次尝试, 失败直接上抛
        let document = DocumentStore::connect(config.document.url.expose_secret()).await?;

        // 2. 关系库: 带重试
        let mysql_config = mysql_config_from(&config.mysql);
        let policy = retry_policy_from(&config.retry);
        let mysql_pool = retry(&policy, "MySQL connection", || {
            let cfg = mysql_config.clone();
            async move { mysql::connect(&cfg).await }
        })
        .await?;

        // 3. 令牌服务: REST 与 GraphQL 共用同一个签名密钥
        let token_service = Arc::new(TokenService::new(
            config.jwt.secret.expose_secret(),
            config.jwt.expires_in_secs as i64,
            config.jwt.issuer.clone(),
            config.jwt.insecure_demo_verification,
        ));
        if config.jwt.insecure_demo_verification {
            warn!("Insecure demo token verification is ENABLED; do not use outside demo environments");
        }

        info!("Infrastructure connected");

        Ok(Self {
            config: config.clone(),
            document,
            mysql_pool,
            token_service,
        })
    }

    /// 获取应用配置
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取文档库句柄
    pub fn document(&self) -> &DocumentStore {
        &self.document
    }

    /// 获取关系库连接池(克隆共享同一个池)
    pub fn mysql_pool(&self) -> MySqlPool {
        self.mysql_pool.clone()
    }

    /// 获取令牌服务
    pub fn token_service(&self) -> Arc<TokenService> {
        self.token_service.clone()
    }

    /// 构建用户文档存储
    pub fn user_store(&self) -> RedisUserStore {
        RedisUserStore::new(self.document.manager())
    }

    /// 构建综合健康报告器
    pub fn health_reporter(&self) -> HealthReporter {
        HealthReporter::new(mysql_config_from(&self.config.mysql), self.document.clone())
    }
}

/// 由配置段组装关系库连接配置
pub fn mysql_config_from(settings: &MysqlSettings) -> MysqlConfig {
    let mut config = MysqlConfig::from_components(
        settings.host.clone(),
        settings.port,
        settings.database.clone(),
        settings.username.clone(),
    )
    .with_ssl_mode(SslMode::parse(&settings.ssl_mode))
    .with_pool(settings.pool_min, settings.pool_max)
    .with_connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
    .with_idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
    .with_acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs));

    let password = settings.password.expose_secret();
    if !password.is_empty() {
        config = config.with_password(password.clone());
    }

    config
}

/// 由配置段组装重试策略
pub fn retry_policy_from(settings: &RetrySettings) -> RetryPolicy {
    let base_delay = Duration::from_millis(settings.base_delay_ms);
    match settings.backoff {
        BackoffKind::Constant => RetryPolicy::constant(settings.max_attempts, base_delay),
        BackoffKind::Exponential => RetryPolicy::exponential(
            settings.max_attempts,
            base_delay,
            2.0,
            Duration::from_secs(30),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::Backoff;
    use secrecy::Secret;

    #[test]
    fn test_mysql_config_from_settings() {
        let settings = MysqlSettings {
            host: "db.internal".to_string(),
            port: 57343,
            ssl_mode: "required".to_string(),
            pool_min: 1,
            pool_max: 1,
            password: Secret::new("hunter2".to_string()),
            ..MysqlSettings::default()
        };

        let config = mysql_config_from(&settings);
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 57343);
        assert_eq!(config.ssl_mode, SslMode::Required);
        assert_eq!(config.pool_min, 1);
        assert_eq!(config.pool_max, 1);
        assert_eq!(config.password, Some("hunter2".to_string()));
        assert_eq!(config.connect_timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_empty_password_becomes_none() {
        let config = mysql_config_from(&MysqlSettings::default());
        assert_eq!(config.password, None);
    }

    #[test]
    fn test_retry_policy_from_settings() {
        let policy = retry_policy_from(&RetrySettings::default());
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(5000));
        assert_eq!(policy.backoff, Backoff::Constant);

        let exponential = retry_policy_from(&RetrySettings {
            backoff: BackoffKind::Exponential,
            ..RetrySettings::default()
        });
        assert!(matches!(
            exponential.backoff,
            Backoff::Exponential { .. }
        ));
    }
}
