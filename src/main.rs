//! ForkCast
//!
//! 入口：初始化日志、创建编排器与 TUI，并运行主循环。
//! 用法：forkcast [config.toml]

use std::path::PathBuf;

use anyhow::Context;
use forkcast::{config::load_config, core::create_app, observability, ui::run_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);

    // TUI 占用终端，日志写文件；默认 info，可通过 RUST_LOG 覆盖
    let log_file = load_config(config_path.clone())
        .map(|c| c.app.log_file)
        .unwrap_or_else(|_| PathBuf::from("forkcast.log"));
    if let Err(e) = observability::init_file(&log_file) {
        observability::init();
        tracing::warn!("Cannot open log file {}: {}", log_file.display(), e);
    }

    // 创建编排器：返回命令发送端、状态接收端
    let (cmd_tx, state_rx) = create_app(config_path)
        .await
        .context("Failed to create app")?;

    run_app(state_rx, cmd_tx).await.context("App run failed")?;

    Ok(())
}
