//! Redis 真实实例集成测试
//!
//! 需要可达的 Redis, 通过 GLASSHOUSE_TEST_REDIS_URL 指定; 未设置时自动跳过。

use glasshouse_adapter_redis::{DocumentStore, RedisUserStore};
use glasshouse_common::SeedUser;
use glasshouse_errors::AppError;
use glasshouse_ports::UserStore;

fn live_url() -> Option<String> {
    std::env::var("GLASSHOUSE_TEST_REDIS_URL").ok()
}

fn unique_username(prefix: &str) -> &'static str {
    let name = format!(
        "{}_{}_{}",
        prefix,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    );
    Box::leak(name.into_boxed_str())
}

#[tokio::test]
async fn test_connect_check_disconnect() {
    let Some(url) = live_url() else {
        eprintln!("GLASSHOUSE_TEST_REDIS_URL not set, skipping live Redis test");
        return;
    };

    let store = DocumentStore::connect(&url).await.expect("connect");
    assert!(store.is_ready());
    assert!(store.check().await);
    assert!(store.is_ready());
    store.disconnect();
}

#[tokio::test]
async fn test_create_find_and_conflict() {
    let Some(url) = live_url() else {
        eprintln!("GLASSHOUSE_TEST_REDIS_URL not set, skipping live Redis test");
        return;
    };

    let store = DocumentStore::connect(&url).await.expect("connect");
    let users = RedisUserStore::new(store.manager());

    let seed = SeedUser {
        username: unique_username("it_user"),
        password: "letmein",
        admin: true,
    };

    assert!(
        users
            .find_by_username(seed.username)
            .await
            .expect("find")
            .is_none()
    );

    let created = users.create(&seed).await.expect("create");
    assert_eq!(created.username, seed.username);
    assert!(created.admin);
    assert_ne!(created.password_hash, seed.password);

    let found = users
        .find_by_username(seed.username)
        .await
        .expect("find after create")
        .expect("document present");
    assert_eq!(found, created);

    // 重复创建必须报冲突, 不得覆盖
    let duplicate = users.create(&seed).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // 清理
    let mut conn = store.manager();
    let _: () = redis::cmd("DEL")
        .arg(format!("user:{}", seed.username))
        .query_async(&mut conn)
        .await
        .expect("cleanup");
    store.disconnect();
}
