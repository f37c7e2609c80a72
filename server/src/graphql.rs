//! GraphQL 监听面
//!
//! 执行器由协作模块提供, 这里只负责认证上下文中间件: 从请求头解出
//! Bearer 令牌并验证, 结果写进请求扩展。验证失败不拒绝请求, 匿名
//! 上下文照样放行, 鉴权决定留给各个 resolver。

use axum::{
    Router,
    extract::{Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::Response,
};
use glasshouse_auth_core::AuthContext;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::state::AppState;

/// 组装 GraphQL 路由
pub fn router(state: AppState, graphql_service: Router) -> Router {
    Router::new()
        .merge(graphql_service)
        .layer(middleware::from_fn_with_state(
            state,
            auth_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

/// 认证上下文中间件
///
/// 总是放行: 令牌有效时注入已认证上下文, 缺失或无效时注入匿名上下文。
async fn auth_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = match bearer_token(request.headers()) {
        Some(token) => match state.tokens.verify(token) {
            Ok(claims) => AuthContext::authenticated(claims),
            Err(e) => {
                debug!(error = %e, "Token verification failed, continuing as anonymous");
                AuthContext::anonymous()
            }
        },
        None => AuthContext::anonymous(),
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}
