//! MySQL 真实实例集成测试
//!
//! 需要可达的 MySQL, 通过 GLASSHOUSE_TEST_MYSQL_* 环境变量指定;
//! 未设置 GLASSHOUSE_TEST_MYSQL_HOST 时自动跳过。

use glasshouse_adapter_mysql::{
    MysqlConfig, authenticate_round_trip, check_connection, connect, connect_server,
    reset_database, verify_database,
};
use sqlx::Connection;

fn live_config() -> Option<MysqlConfig> {
    let host = std::env::var("GLASSHOUSE_TEST_MYSQL_HOST").ok()?;
    let port = std::env::var("GLASSHOUSE_TEST_MYSQL_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3306);
    let database = std::env::var("GLASSHOUSE_TEST_MYSQL_DATABASE")
        .unwrap_or_else(|_| "glasshouse_test".to_string());
    let username =
        std::env::var("GLASSHOUSE_TEST_MYSQL_USERNAME").unwrap_or_else(|_| "root".to_string());

    let mut config = MysqlConfig::from_components(host, port, database, username);
    if let Ok(password) = std::env::var("GLASSHOUSE_TEST_MYSQL_PASSWORD") {
        config = config.with_password(password);
    }
    Some(config)
}

#[tokio::test]
async fn test_reset_then_connect_round_trip() {
    let Some(config) = live_config() else {
        eprintln!("GLASSHOUSE_TEST_MYSQL_HOST not set, skipping live MySQL test");
        return;
    };

    let mut conn = connect_server(&config).await.expect("server connection");
    reset_database(&mut conn, &config.database)
        .await
        .expect("reset should succeed");
    conn.close().await.expect("close server connection");

    // 重置后的库必须立即可选中、可认证
    verify_database(&config).await.expect("fresh database should be selectable");
    authenticate_round_trip(&config)
        .await
        .expect("authenticate round-trip should succeed");

    let pool = connect(&config).await.expect("pool creation");
    check_connection(&pool).await.expect("pooled check");
    pool.close().await;
}

#[tokio::test]
async fn test_reset_is_repeatable() {
    let Some(config) = live_config() else {
        eprintln!("GLASSHOUSE_TEST_MYSQL_HOST not set, skipping live MySQL test");
        return;
    };

    let mut conn = connect_server(&config).await.expect("server connection");
    reset_database(&mut conn, &config.database)
        .await
        .expect("first reset");
    reset_database(&mut conn, &config.database)
        .await
        .expect("second reset");
    conn.close().await.expect("close server connection");

    verify_database(&config).await.expect("database exists after repeated reset");
}
