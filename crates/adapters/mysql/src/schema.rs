//! 数据库重置与校验
//!
//! 预置专用的破坏性操作: 无条件删库重建。只允许从显式的预置入口调用,
//! 常规服务启动路径不得触达这里。

use glasshouse_errors::{AppError, AppResult};
use sqlx::Connection;
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::Row;
use tracing::{info, warn};

use crate::config::MysqlConfig;
use crate::connection::map_sqlx_error;

/// 删除并重建目标数据库
///
/// 连接必须是服务器级的(未选库, 见 [`crate::connection::connect_server`]),
/// 否则删掉当前库后连接会话进入无库状态, 后续语句行为依赖服务端版本。
pub async fn reset_database(conn: &mut MySqlConnection, database: &str) -> AppResult<()> {
    validate_identifier(database)?;

    info!(database, "Resetting relational database");

    sqlx::query(&format!("DROP DATABASE IF EXISTS `{}`", database))
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            AppError::provisioning(format!("Failed to drop database {}: {}", database, e))
        })?;
    info!(database, "Old database deleted");

    sqlx::query(&format!("CREATE DATABASE `{}`", database))
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            AppError::provisioning(format!("Failed to create database {}: {}", database, e))
        })?;
    info!(database, "Database created");

    Ok(())
}

/// 校验重置后的数据库可选中
///
/// 新建一条选中目标库的连接并确认 `DATABASE()` 返回它, 证明重置后的
/// 库真实存在且当前凭据可用。
pub async fn verify_database(config: &MysqlConfig) -> AppResult<()> {
    let mut conn = MySqlConnection::connect_with(&config.connect_options())
        .await
        .map_err(|e| {
            AppError::provisioning(format!(
                "Failed to reconnect to database {} after reset: {}",
                config.database,
                map_sqlx_error(e)
            ))
        })?;

    let row: Result<MySqlRow, sqlx::Error> =
        sqlx::query("SELECT DATABASE()").fetch_one(&mut conn).await;

    if let Err(e) = conn.close().await {
        warn!(error = %e, "Failed to close verification connection");
    }

    let selected: Option<String> = row
        .map_err(|e| AppError::provisioning(format!("Database verification query failed: {}", e)))?
        .get(0);

    if selected.as_deref() != Some(config.database.as_str()) {
        return Err(AppError::provisioning(format!(
            "Expected database {} to be selected, got {:?}",
            config.database, selected
        )));
    }

    info!(database = %config.database, "Database verified after reset");
    Ok(())
}

/// 校验数据库标识符
///
/// 库名会被拼进 DDL 语句, 只放行字母数字与下划线。
fn validate_identifier(database: &str) -> AppResult<()> {
    let valid = !database.is_empty()
        && database.len() <= 64
        && database
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(AppError::provisioning(format!(
            "Invalid database identifier: {:?}",
            database
        )))
    }
}
