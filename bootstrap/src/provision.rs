//! 数据库预置
//!
//! 一次性 setup 入口的实现: 对关系库做破坏性重置, 对文档库做幂等
//! 种子写入。只能由独立的预置二进制触发, 常规服务启动不会走到这里。

use glasshouse_adapter_mysql as mysql;
use glasshouse_adapter_redis::{DocumentStore, RedisUserStore};
use glasshouse_common::SeedUser;
use glasshouse_config::AppConfig;
use glasshouse_errors::{AppError, AppResult};
use glasshouse_ports::UserStore;
use secrecy::ExposeSecret;
use sqlx::Connection;
use tracing::{info, warn};

use crate::infrastructure::{mysql_config_from, retry_policy_from};
use crate::retry::retry;

/// 执行完整预置流程
///
/// 顺序: 经重试器建立服务器级关系库连接 → 删库重建 → 关闭连接 →
/// 校验新库可选中 → 连接文档库 → 幂等种子写入 → 显式断开。
/// 任一步失败立即上抛, 调用方决定退出码。
pub async fn run(config: &AppConfig) -> AppResult<()> {
    let mysql_config = mysql_config_from(&config.mysql);
    let policy = retry_policy_from(&config.retry);

    // 1. 关系库重置: 连接不选库, 目标库可能还不存在
    let mut conn = retry(&policy, "MySQL server connection", || {
        let cfg = mysql_config.clone();
        async move { mysql::connect_server(&cfg).await }
    })
    .await?;

    let reset = mysql::reset_database(&mut conn, &mysql_config.database).await;
    if let Err(e) = conn.close().await {
        warn!(error = %e, "Failed to close provisioning connection");
    }
    reset?;

    mysql::verify_database(&mysql_config).await?;

    // 2. 文档库种子写入
    let document = DocumentStore::connect(config.document.url.expose_secret()).await?;
    let store = RedisUserStore::new(document.manager());
    let seeded = seed_users(&store, SeedUser::canonical()).await;
    document.disconnect();
    let created = seeded?;

    info!(created, "Provisioning complete");
    Ok(())
}

/// 幂等种子写入
///
/// 逐个按用户名查找, 不存在才创建, 已存在的保持原样不覆盖。
/// 任何持久化失败立即上抛为预置错误, 不做静默的部分写入。
/// 返回本次新建的账号数。
pub async fn seed_users(store: &dyn UserStore, seeds: &[SeedUser]) -> AppResult<u32> {
    let mut created = 0;

    for seed in seeds {
        let existing = store.find_by_username(seed.username).await.map_err(|e| {
            AppError::provisioning(format!("Failed to look up user {}: {}", seed.username, e))
        })?;

        match existing {
            Some(_) => {
                info!(username = seed.username, "User already exists");
            }
            None => {
                store.create(seed).await.map_err(|e| {
                    AppError::provisioning(format!(
                        "Failed to create user {}: {}",
                        seed.username, e
                    ))
                })?;
                info!(username = seed.username, admin = seed.admin, "User created");
                created += 1;
            }
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use glasshouse_common::UserDocument;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 内存版用户存储, 契约对齐真实实现: 已存在的用户名报冲突而不是覆盖
    struct InMemoryUserStore {
        users: Mutex<HashMap<String, UserDocument>>,
        fail_create: bool,
    }

    impl InMemoryUserStore {
        fn new() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
                fail_create: false,
            }
        }

        fn failing() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
                fail_create: true,
            }
        }

        fn len(&self) -> usize {
            self.users.lock().unwrap().len()
        }

        fn get(&self, username: &str) -> Option<UserDocument> {
            self.users.lock().unwrap().get(username).cloned()
        }

        fn insert_raw(&self, document: UserDocument) {
            self.users
                .lock()
                .unwrap()
                .insert(document.username.clone(), document);
        }
    }

    #[async_trait]
    impl UserStore for InMemoryUserStore {
        async fn find_by_username(&self, username: &str) -> AppResult<Option<UserDocument>> {
            Ok(self.users.lock().unwrap().get(username).cloned())
        }

        async fn create(&self, seed: &SeedUser) -> AppResult<UserDocument> {
            if self.fail_create {
                return Err(AppError::internal("store unavailable"));
            }
            let mut users = self.users.lock().unwrap();
            if users.contains_key(seed.username) {
                return Err(AppError::conflict(format!(
                    "User {} already exists",
                    seed.username
                )));
            }
            let document =
                UserDocument::new(seed.username, format!("hashed:{}", seed.password), seed.admin);
            users.insert(document.username.clone(), document.clone());
            Ok(document)
        }
    }

    #[tokio::test]
    async fn test_seeding_empty_store_creates_both_users() {
        let store = InMemoryUserStore::new();

        let created = seed_users(&store, SeedUser::canonical()).await.unwrap();

        assert_eq!(created, 2);
        assert_eq!(store.len(), 2);
        assert!(store.get("admin").unwrap().admin);
        assert!(!store.get("test").unwrap().admin);
    }

    #[tokio::test]
    async fn test_seeding_twice_is_idempotent() {
        let store = InMemoryUserStore::new();

        seed_users(&store, SeedUser::canonical()).await.unwrap();
        let second = seed_users(&store, SeedUser::canonical()).await.unwrap();

        assert_eq!(second, 0);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_existing_user_is_never_overwritten() {
        let store = InMemoryUserStore::new();
        let original = UserDocument::new("admin", "pre-existing-hash", false);
        store.insert_raw(original.clone());

        seed_users(&store, SeedUser::canonical()).await.unwrap();

        let kept = store.get("admin").unwrap();
        assert_eq!(kept.password_hash, "pre-existing-hash");
        assert!(!kept.admin);
        assert_eq!(kept.created_at, original.created_at);
        // 缺席的另一个种子账号照常补齐
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_with_provisioning_error() {
        let store = InMemoryUserStore::failing();

        let result = seed_users(&store, SeedUser::canonical()).await;

        assert!(matches!(result, Err(AppError::Provisioning(_))));
        assert_eq!(store.len(), 0);
    }
}
