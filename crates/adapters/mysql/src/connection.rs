//! MySQL 连接管理
//!
//! 连接在返回前都做一次显式认证往返(`SELECT 1`), 只握手不查询不算成功。
//! 凭据被拒(1044/1045)映射为认证错误, 其余失败映射为网络错误。

use glasshouse_errors::{AppError, AppResult};
use sqlx::Connection;
use sqlx::mysql::{MySqlConnection, MySqlDatabaseError, MySqlPool, MySqlPoolOptions};
use tracing::info;

use crate::config::MysqlConfig;

/// 凭据被拒的 MySQL 错误码(ER_DBACCESS_DENIED_ERROR / ER_ACCESS_DENIED_ERROR)
const ACCESS_DENIED_CODES: [u16; 2] = [1044, 1045];

/// 创建 MySQL 连接池并完成认证往返
pub async fn connect(config: &MysqlConfig) -> AppResult<MySqlPool> {
    let pool = tokio::time::timeout(
        config.connect_timeout,
        MySqlPoolOptions::new()
            .min_connections(config.pool_min)
            .max_connections(config.pool_max)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(config.connect_options()),
    )
    .await
    .map_err(|_| connect_timeout_error(config))?
    .map_err(map_sqlx_error)?;

    // 成功的握手不够, 还要一次查询往返确认凭据可用
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(map_sqlx_error)?;

    info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        pool_min = config.pool_min,
        pool_max = config.pool_max,
        "MySQL connection pool created"
    );

    Ok(pool)
}

/// 检查连接池可用性
pub async fn check_connection(pool: &MySqlPool) -> AppResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

/// 单连接认证往返
///
/// 新建一条连接, 执行 `SELECT 1`, 显式关闭。健康检查与连通性探测
/// 用它来验证"当下还能登录", 而不是复用池里可能早已建好的连接。
pub async fn authenticate_round_trip(config: &MysqlConfig) -> AppResult<()> {
    let mut conn = tokio::time::timeout(
        config.connect_timeout,
        MySqlConnection::connect_with(&config.connect_options()),
    )
    .await
    .map_err(|_| connect_timeout_error(config))?
    .map_err(map_sqlx_error)?;

    let query = sqlx::query("SELECT 1").execute(&mut conn).await;
    let close = conn.close().await;

    query.map_err(map_sqlx_error)?;
    close.map_err(map_sqlx_error)?;
    Ok(())
}

/// 服务器级单连接(不选数据库)
///
/// 预置阶段在目标库尚不存在时也要能登录, 因此这条连接不选库。
/// 调用方负责在用完后 `close()`。
pub async fn connect_server(config: &MysqlConfig) -> AppResult<MySqlConnection> {
    let mut conn = tokio::time::timeout(
        config.connect_timeout,
        MySqlConnection::connect_with(&config.server_options()),
    )
    .await
    .map_err(|_| connect_timeout_error(config))?
    .map_err(map_sqlx_error)?;

    sqlx::query("SELECT 1")
        .execute(&mut conn)
        .await
        .map_err(map_sqlx_error)?;

    info!(host = %config.host, port = config.port, "MySQL server-level connection established");

    Ok(conn)
}

fn connect_timeout_error(config: &MysqlConfig) -> AppError {
    AppError::network(format!(
        "MySQL connect to {}:{} timed out after {}s",
        config.host,
        config.port,
        config.connect_timeout.as_secs()
    ))
}

/// 将 sqlx 错误映射到统一错误分类
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if let Some(mysql) = db.try_downcast_ref::<MySqlDatabaseError>() {
            if ACCESS_DENIED_CODES.contains(&mysql.number()) {
                return AppError::authentication(format!(
                    "MySQL rejected credentials ({}): {}",
                    mysql.number(),
                    mysql.message()
                ));
            }
        }
    }
    AppError::network(format!("MySQL connection failed: {}", e))
}
