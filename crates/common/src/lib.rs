//! common - 公共类型库
//!
//! 种子账号、用户文档与综合健康报告等跨 crate 共享的类型。

pub mod health;
pub mod types;

pub use health::*;
pub use types::*;
