//! Redis 文档库连接管理

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use glasshouse_errors::{AppError, AppResult};
use redis::Client;
use redis::aio::ConnectionManager;
use tracing::{info, warn};

/// 文档库连接句柄
///
/// 由单次连接尝试创建, 失败直接回传错误, 不在这一层重试。
/// 断线重连由 ConnectionManager 在内部处理; 克隆只是句柄复制,
/// 进程内共享同一条多路复用连接。
#[derive(Clone)]
pub struct DocumentStore {
    conn: ConnectionManager,
    ready: Arc<AtomicBool>,
    check_timeout: Duration,
}

impl DocumentStore {
    /// 连接文档库(单次尝试)
    pub async fn connect(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::network(format!("Invalid document store URL: {}", e)))?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::network(format!("Failed to connect to document store: {}", e))
        })?;

        info!("Document store connection established");

        Ok(Self {
            conn,
            ready: Arc::new(AtomicBool::new(true)),
            check_timeout: Duration::from_secs(5),
        })
    }

    /// 设置就绪检查超时
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// 显式断开, 释放句柄
    ///
    /// 一次性操作(预置)结束后调用, 同时把共享的就绪标志置为不可用。
    pub fn disconnect(self) {
        self.ready.store(false, Ordering::SeqCst);
        drop(self.conn);
        info!("Document store connection released");
    }

    /// 就绪检查(带超时的 PING), 更新并返回就绪标志
    pub async fn check(&self) -> bool {
        let mut conn = self.conn.clone();
        let result = tokio::time::timeout(
            self.check_timeout,
            redis::cmd("PING").query_async::<String>(&mut conn),
        )
        .await;

        let healthy = match result {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Document store ping failed");
                false
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.check_timeout.as_secs(),
                    "Document store ping timed out"
                );
                false
            }
        };

        self.ready.store(healthy, Ordering::SeqCst);
        healthy
    }

    /// 读取上次检查留下的就绪标志, 不发起网络请求
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// 获取底层连接管理器
    pub fn manager(&self) -> ConnectionManager {
        self.conn.clone()
    }
}
