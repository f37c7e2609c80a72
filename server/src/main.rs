//! glasshouse-server - 主服务入口
//!
//! 加载配置, 初始化运行时, 把两个监听面的路由构建器交给启动器。
//! 启动失败在这里换算成非零退出码。

mod graphql;
mod rest;
mod state;

use std::sync::Arc;

use axum::Router;
use glasshouse_bootstrap::{ListenerSet, init_runtime, start};
use glasshouse_config::AppConfig;
use state::AppState;
use tracing::error;

#[tokio::main]
async fn main() {
    // .env 先于配置读取; 文件缺失不算错
    dotenvy::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            // tracing 还没初始化, 只能走标准错误
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_runtime(&config);

    let listeners = config.listeners.clone();
    let result = start(config, |infra| {
        let state = AppState::new(Arc::new(infra.health_reporter()), infra.token_service());

        // 业务路由、SOAP 面与 GraphQL 执行器由协作方仓库提供, 这里挂空路由
        let api_routes = Router::new();
        let soap_service = Router::new();
        let graphql_service = Router::new();

        ListenerSet {
            rest: rest::router(
                state.clone(),
                api_routes,
                soap_service,
                &listeners.api_prefix,
                &listeners.soap_mount,
            ),
            graphql: graphql::router(state, graphql_service),
        }
    })
    .await;

    if let Err(e) = result {
        error!(phase = %e.phase, error = %e.source, "Startup failed");
        std::process::exit(1);
    }
}
