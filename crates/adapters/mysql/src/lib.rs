//! MySQL 适配器
//!
//! 关系库连接器: 连接池创建、单连接认证往返与预置阶段的建库/重置。

pub mod config;
pub mod connection;
pub mod schema;

pub use config::{MysqlConfig, SslMode};
pub use connection::{authenticate_round_trip, check_connection, connect, connect_server};
pub use schema::{reset_database, verify_database};
