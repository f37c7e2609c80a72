//! 用户文档与种子账号类型
//!
//! 种子账号是刻意的弱凭据, 仅用于漏洞演示环境。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 文档库中存储的用户文档
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDocument {
    pub username: String,
    /// 密码散列(argon2), 不存明文
    pub password_hash: String,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
}

impl UserDocument {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, admin: bool) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            admin,
            created_at: Utc::now(),
        }
    }
}

/// 种子账号定义
///
/// 预置阶段按此列表做"不存在才创建"的写入, 已存在的账号保持原样。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedUser {
    pub username: &'static str,
    pub password: &'static str,
    pub admin: bool,
}

impl SeedUser {
    /// 演示环境的默认种子账号列表
    ///
    /// 管理员在前, 普通账号在后, 预置按此顺序逐个写入。
    pub fn canonical() -> &'static [SeedUser] {
        &[
            SeedUser {
                username: "admin",
                password: "letmein",
                admin: true,
            },
            SeedUser {
                username: "test",
                password: "test",
                admin: false,
            },
        ]
    }
}
