//! glasshouse-provision - 后端预置入口
//!
//! 一次性运行: 重试直到连上 MySQL 服务器, 重建演示数据库, 向文档库
//! 播种缺失的演示用户。常规服务启动不经过这里。

use glasshouse_bootstrap::{BootPhase, init_runtime, provision};
use glasshouse_config::AppConfig;
use tracing::{error, info};

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

    info!(phase = %BootPhase::Provisioning, "Provisioning backend stores");

    if let Err(e) = provision::run(&config).await {
        error!(error = %e, "Provisioning failed");
        std::process::exit(1);
    }
}
