//! REST 监听面
//!
//! 业务路由与 SOAP 面由协作模块注入, 这里只负责组装: 健康端点挂在
//! API 前缀下, SOAP 路由挂在独立前缀下, 最外层套请求日志与 CORS。

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::state::AppState;

/// 组装 REST 路由
pub fn router(
    state: AppState,
    api_routes: Router,
    soap_service: Router,
    api_prefix: &str,
    soap_mount: &str,
) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
        .merge(api_routes);

    Router::new()
        .nest(api_prefix, api)
        .nest(soap_mount, soap_service)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// 镜像请求来源的 CORS 配置
///
/// 演示环境刻意接受任意来源并允许携带凭据; 带凭据时响应头不能用
/// 通配符, 所以三项都按请求镜像返回。
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// 健康端点
///
/// 探针能给出报告就返回 200, 后端缺位体现在报告的 status 字段里;
/// 只有探针本身失败才返回 500。
async fn health_handler(State(state): State<AppState>) -> Response {
    match state.health.probe().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!(error = %e, "Health probe failed");
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(serde_json::json!({ "status": "error" }))).into_response()
        }
    }
}
