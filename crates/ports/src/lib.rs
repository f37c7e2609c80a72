//! glasshouse-ports - 抽象 trait 层
//!
//! 定义存储与健康探测的抽象接口

mod health_probe;
mod user_store;

pub use health_probe::*;
pub use user_store::*;
