//! glasshouse-bootstrap - 统一启动骨架
//!
//! 多后端启动编排: 有界重试、按序连接、一次性预置、
//! 监听面启动与综合健康报告。

pub mod health;
pub mod infrastructure;
pub mod provision;
pub mod retry;
pub mod runtime;
pub mod starter;

pub use health::HealthReporter;
pub use infrastructure::Infrastructure;
pub use retry::{Backoff, RetryPolicy, retry};
pub use runtime::{init_runtime, shutdown_signal};
pub use starter::{BootError, BootPhase, ListenerSet, start};
