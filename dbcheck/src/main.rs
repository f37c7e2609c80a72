//! glasshouse-dbcheck - 后端连通性探测
//!
//! 独立诊断入口: 对关系库跑一条算术查询和会话超时查询, 对文档库跑
//! PING。任一后端不可达时以非零退出码结束, 便于容器编排的就绪检查。

use glasshouse_adapter_mysql::MysqlConfig;
use glasshouse_adapter_redis::DocumentStore;
use glasshouse_bootstrap::{infrastructure::mysql_config_from, init_runtime};
use glasshouse_config::AppConfig;
use glasshouse_errors::{AppError, AppResult};
use secrecy::ExposeSecret;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // .env 先于配置读取; 文件缺失不算错
    dotenvy::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            // tracing 还没初始化, 只能走标准错误
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_runtime(&config);

    let mysql_ok = check_mysql(&mysql_config_from(&config.mysql)).await;
    let redis_ok = check_document_store(config.document.url.expose_secret()).await;

    if mysql_ok && redis_ok {
        info!("All backends reachable");
    } else {
        error!(mysql = mysql_ok, redis = redis_ok, "One or more backends unreachable");
        std::process::exit(1);
    }
}

async fn check_mysql(config: &MysqlConfig) -> bool {
    match mysql_probe(config).await {
        Ok(()) => true,
        Err(e) if e.is_connection_failure() => {
            error!(error = %e, "Cannot connect to MySQL");
            false
        }
        Err(e) => {
            error!(error = %e, "MySQL probe failed");
            false
        }
    }
}

/// 关系库探测: 连接、算术查询、会话超时查询
async fn mysql_probe(config: &MysqlConfig) -> AppResult<()> {
    let pool = glasshouse_adapter_mysql::connect(config).await?;

    let (result,): (i64,) = sqlx::query_as("SELECT 1 + 1 AS result")
        .fetch_one(&pool)
        .await
        .map_err(|e| AppError::health_check(format!("Arithmetic probe failed: {}", e)))?;
    info!(result, "Arithmetic probe succeeded");

    let (wait_timeout, interactive_timeout): (i64, i64) =
        sqlx::query_as("SELECT @@wait_timeout, @@interactive_timeout")
            .fetch_one(&pool)
            .await
            .map_err(|e| AppError::health_check(format!("Timeout probe failed: {}", e)))?;
    info!(wait_timeout, interactive_timeout, "Session timeouts");

    pool.close().await;
    Ok(())
}

async fn check_document_store(url: &str) -> bool {
    match DocumentStore::connect(url).await {
        Ok(store) => {
            let ok = store.check().await;
            if !ok {
                error!("Document store ping failed");
            }
            store.disconnect();
            ok
        }
        Err(e) => {
            error!(error = %e, "Document store check failed");
            false
        }
    }
}
