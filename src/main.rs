#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use tracing::info;
use std::sync::Arc;
use translanova::{
    config::{self, AppConfig},
    pipeline::SubprocessPipeline,
    utils::logger,
    AppContext,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 配置
    let config = AppConfig::from_env()?;
    config::init_env(&config);

    // 初始化日志系统
    let _guard = logger::init(config.log_dir.clone())?;
    info!("Starting Translanova service (version {})...", env!("GIT_HASH"));

    // 翻译脚本
    info!(
        "Translation pipeline: {} {} (timeout {}s, {} concurrent jobs)",
        config.interpreter,
        config.script,
        config.job_timeout.as_secs(),
        config.max_concurrent_jobs
    );
    let pipeline = SubprocessPipeline::from_config(&config);

    // 创建应用上下文
    info!("Initializing storage and services...");
    let addr = config.socket_addr();
    let ctx = Arc::new(AppContext::build(config, Arc::new(pipeline)).await?);

    info!("Starting HTTP server at http://{}", addr);

    // 启动 HTTP 服务器
    match translanova::web::start_server(ctx.clone(), addr).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            tracing::error!("Server error: {}", e);
            return Err(e);
        }
    }

    info!("Shutting down...");
    Ok(())
}
