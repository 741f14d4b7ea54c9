//! Chatdash - 对话驱动的数据看板
//!
//! 入口：加载配置、初始化日志、创建会话与命令循环，并运行 TUI 主循环。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chatdash::config::load_config;
use chatdash::core::{spawn_session, ChatSession};
use chatdash::observability;
use chatdash::ui::run_app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 可选参数：额外的配置文件路径
    let config_path = std::env::args().nth(1).map(Into::into);
    let loaded = load_config(config_path);
    let cfg = loaded.as_ref().cloned().unwrap_or_default();

    observability::init(cfg.app.log_file.as_deref()).context("Failed to init logging")?;
    if let Err(e) = &loaded {
        tracing::warn!("Config load failed ({}), using defaults", e);
    }

    let session = Arc::new(ChatSession::with_mock_agent(&cfg));
    tracing::info!(
        name = cfg.app.name.as_deref().unwrap_or("chatdash"),
        "session created"
    );

    let (cmd_tx, session_loop) = spawn_session(session.clone());

    run_app(
        session.clone(),
        cmd_tx,
        Duration::from_millis(cfg.ui.poll_interval_ms),
    )
    .await
    .context("App run failed")?;

    session.shutdown();
    session_loop.await.context("Session loop panicked")?;
    Ok(())
}
