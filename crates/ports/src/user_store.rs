//! UserStore trait 定义

use async_trait::async_trait;
use glasshouse_common::{SeedUser, UserDocument};
use glasshouse_errors::AppResult;

/// 用户文档存储 trait
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 根据用户名查找
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserDocument>>;

    /// 从种子定义创建用户（哈希密码、组装文档并写入）。
    /// 用户名已存在时返回 Conflict。
    async fn create(&self, seed: &SeedUser) -> AppResult<UserDocument>;
}
