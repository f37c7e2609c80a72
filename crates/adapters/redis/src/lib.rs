//! Redis 适配器
//!
//! 文档库连接器: 单次尝试连接、显式断开、带超时的就绪检查,
//! 以及按用户名存取用户文档的存储实现。

pub mod connection;
pub mod user_store;

pub use connection::DocumentStore;
pub use user_store::RedisUserStore;
