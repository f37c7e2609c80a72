//! 用户文档存储实现
//!
//! 用户文档以 JSON 存在 `user:{username}` 键下, 用户名即身份键。
//! 写入用 SET NX, 键已存在时报冲突而不是覆盖。

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use glasshouse_common::{SeedUser, UserDocument};
use glasshouse_errors::{AppError, AppResult};
use glasshouse_ports::UserStore;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

const USER_KEY_PREFIX: &str = "user:";

/// Redis 用户文档存储
pub struct RedisUserStore {
    conn: ConnectionManager,
}

impl RedisUserStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(username: &str) -> String {
        format!("{}{}", USER_KEY_PREFIX, username)
    }

    /// 哈希种子密码(argon2), 文档里不落明文
    fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

#[async_trait]
impl UserStore for RedisUserStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserDocument>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(Self::key(username))
            .await
            .map_err(|e| AppError::internal(format!("Redis get failed: {}", e)))?;

        match raw {
            Some(json) => {
                let document = serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!("Corrupt user document for {}: {}", username, e))
                })?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, seed: &SeedUser) -> AppResult<UserDocument> {
        let document = UserDocument::new(
            seed.username,
            Self::hash_password(seed.password)?,
            seed.admin,
        );
        let json = serde_json::to_string(&document)
            .map_err(|e| AppError::internal(format!("Failed to encode user document: {}", e)))?;

        let mut conn = self.conn.clone();
        let written: Option<String> = redis::cmd("SET")
            .arg(Self::key(&document.username))
            .arg(&json)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::internal(format!("Redis set failed: {}", e)))?;

        if written.is_none() {
            return Err(AppError::conflict(format!(
                "User {} already exists",
                document.username
            )));
        }

        Ok(document)
    }
}
