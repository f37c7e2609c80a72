//! 监听面共享状态

use std::sync::Arc;

use glasshouse_auth_core::TokenService;
use glasshouse_ports::HealthProbe;

/// 两个监听面共用的请求状态
///
/// 健康探针走 trait 对象, 处理器不感知探针背后是哪些后端。
#[derive(Clone)]
pub struct AppState {
    pub health: Arc<dyn HealthProbe>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(health: Arc<dyn HealthProbe>, tokens: Arc<TokenService>) -> Self {
        Self { health, tokens }
    }
}
