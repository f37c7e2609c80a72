//! 服务启动器
//!
//! 线性启动状态机: INIT → CONNECTING → LISTENING → READY, 没有回边。
//! 任一阶段失败以带阶段标注的启动错误返回, 退出码的决定留给二进制
//! 入口。PROVISIONING 阶段只属于独立的预置入口, 不在常规路径上。

use std::fmt;
use std::net::SocketAddr;

use axum::Router;
use glasshouse_config::AppConfig;
use glasshouse_errors::AppError;
use tokio::net::TcpListener;
use tracing::info;

use crate::infrastructure::Infrastructure;
use crate::runtime::shutdown_signal;

/// 启动阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPhase {
    Init,
    Connecting,
    Provisioning,
    Listening,
    Ready,
}

impl fmt::Display for BootPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BootPhase::Init => "init",
            BootPhase::Connecting => "connecting",
            BootPhase::Provisioning => "provisioning",
            BootPhase::Listening => "listening",
            BootPhase::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// 启动失败: 出错阶段加底层错误
#[derive(Debug)]
pub struct BootError {
    pub phase: BootPhase,
    pub source: AppError,
}

impl BootError {
    fn new(phase: BootPhase, source: AppError) -> Self {
        Self { phase, source }
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "startup failed during {}: {}", self.phase, self.source)
    }
}

impl std::error::Error for BootError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// 两个自有监听面的路由
pub struct ListenerSet {
    pub rest: Router,
    pub graphql: Router,
}

/// 启动服务
///
/// 连接后端(文档库先, 关系库后) → 构建路由 → 绑定两个端口 →
/// 播报全部四个服务面 → 在关闭信号下同时服务 REST 与 GraphQL。
/// 到达 READY 前任何一步失败都是致命的, 不存在部分监听的成功态。
pub async fn start<F>(config: AppConfig, build_listeners: F) -> Result<(), BootError>
where
    F: FnOnce(&Infrastructure) -> ListenerSet,
{
    info!(
        app_name = %config.app_name,
        phase = %BootPhase::Init,
        "Starting service"
    );

    info!(phase = %BootPhase::Connecting, "Connecting backend stores");
    let infra = Infrastructure::connect(&config)
        .await
        .map_err(|e| BootError::new(BootPhase::Connecting, e))?;

    let listeners = build_listeners(&infra);
    let ls = &config.listeners;

    info!(phase = %BootPhase::Listening, "Binding listeners");
    let rest_addr =
        parse_addr(&ls.host, ls.rest_port).map_err(|e| BootError::new(BootPhase::Listening, e))?;
    let graphql_addr = parse_addr(&ls.host, ls.graphql_port)
        .map_err(|e| BootError::new(BootPhase::Listening, e))?;

    let rest_listener = TcpListener::bind(rest_addr).await.map_err(|e| {
        BootError::new(
            BootPhase::Listening,
            AppError::network(format!("Failed to bind REST listener on {}: {}", rest_addr, e)),
        )
    })?;
    let graphql_listener = TcpListener::bind(graphql_addr).await.map_err(|e| {
        BootError::new(
            BootPhase::Listening,
            AppError::network(format!(
                "Failed to bind GraphQL listener on {}: {}",
                graphql_addr, e
            )),
        )
    })?;

    // 就绪播报: 自有两个面加上外部协作方提供的 SOAP 挂载与 XML-RPC 端口
    info!(addr = %rest_addr, prefix = %ls.api_prefix, "REST API listening");
    info!(addr = %graphql_addr, "GraphQL endpoint listening");
    info!(addr = %rest_addr, mount = %ls.soap_mount, "SOAP service mounted");
    info!(host = %ls.host, port = ls.rpc_port, "XML-RPC listener announced");
    info!(phase = %BootPhase::Ready, "All services started");

    let rest = async {
        axum::serve(rest_listener, listeners.rest)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };
    let graphql = async {
        axum::serve(graphql_listener, listeners.graphql)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };

    tokio::try_join!(rest, graphql).map_err(|e| {
        BootError::new(
            BootPhase::Ready,
            AppError::internal(format!("Listener failed: {}", e)),
        )
    })?;

    info!("Service stopped");
    Ok(())
}

fn parse_addr(host: &str, port: u16) -> Result<SocketAddr, AppError> {
    format!("{}:{}", host, port)
        .parse()
        .map_err(|e| AppError::config(format!("Invalid listen address {}:{}: {}", host, port, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glasshouse_config::{
        DocumentSettings, JwtSettings, ListenerSettings, MysqlSettings, RetrySettings,
        TelemetrySettings,
    };
    use secrecy::Secret;

    fn test_config(document_url: &str) -> AppConfig {
        AppConfig {
            app_name: "glasshouse-test".to_string(),
            app_env: "development".to_string(),
            mysql: MysqlSettings::default(),
            document: DocumentSettings {
                url: Secret::new(document_url.to_string()),
            },
            listeners: ListenerSettings::default(),
            jwt: JwtSettings {
                secret: Secret::new("test-secret".to_string()),
                expires_in_secs: 3600,
                issuer: "glasshouse".to_string(),
                insecure_demo_verification: false,
            },
            retry: RetrySettings {
                max_attempts: 1,
                base_delay_ms: 10,
                backoff: Default::default(),
            },
            telemetry: TelemetrySettings::default(),
        }
    }

    #[test]
    fn test_boot_phase_display() {
        assert_eq!(BootPhase::Init.to_string(), "init");
        assert_eq!(BootPhase::Connecting.to_string(), "connecting");
        assert_eq!(BootPhase::Provisioning.to_string(), "provisioning");
        assert_eq!(BootPhase::Listening.to_string(), "listening");
        assert_eq!(BootPhase::Ready.to_string(), "ready");
    }

    #[test]
    fn test_boot_error_display_includes_phase() {
        let err = BootError::new(BootPhase::Connecting, AppError::network("unreachable"));
        let message = err.to_string();
        assert!(message.contains("connecting"));
        assert!(message.contains("unreachable"));
    }

    #[test]
    fn test_parse_addr() {
        assert!(parse_addr("0.0.0.0", 4000).is_ok());
        assert!(parse_addr("not an address", 4000).is_err());
    }

    #[tokio::test]
    async fn test_start_fails_in_connecting_phase_when_document_store_unreachable() {
        // 无效的文档库地址让连接阶段立即失败, 不触达后续阶段
        let config = test_config("not-a-redis-url");

        let result = start(config, |_| ListenerSet {
            rest: Router::new(),
            graphql: Router::new(),
        })
        .await;

        let err = result.expect_err("start should fail");
        assert_eq!(err.phase, BootPhase::Connecting);
    }
}
