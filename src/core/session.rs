//! 会话上下文：每个会话构造一次，持有两个 Store、编排器与监管器
//!
//! 取代全局单例：多个会话（或测试）互不干扰。`spawn_session` 建立 UI -> Core 的命令通道，
//! 后台任务消费 Submit / Select / Clear / Quit。

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::agent::{MockAgent, ResponseResolver};
use crate::config::AppConfig;
use crate::core::{ChatOrchestrator, SessionSupervisor, UiState};
use crate::store::{MessageId, MessageStore, Role, WidgetStore};

/// 从 UI 发往会话的命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 提交用户输入，触发一个回合
    Submit(String),
    /// 选中某条 Agent 消息，重新展示它的组件
    Select(MessageId),
    /// 清空对话与画布
    Clear,
    /// 拆除会话并退出
    Quit,
}

pub struct ChatSession {
    messages: Arc<MessageStore>,
    widgets: Arc<WidgetStore>,
    orchestrator: Arc<ChatOrchestrator>,
    supervisor: SessionSupervisor,
}

impl ChatSession {
    pub fn new(cfg: &AppConfig, resolver: Arc<dyn ResponseResolver>) -> Self {
        let messages = Arc::new(MessageStore::new());
        let widgets = Arc::new(WidgetStore::new());
        let supervisor = SessionSupervisor::new();
        let orchestrator = Arc::new(ChatOrchestrator::new(
            messages.clone(),
            widgets.clone(),
            resolver,
            &cfg.chat,
            supervisor.child_token(),
        ));
        Self {
            messages,
            widgets,
            orchestrator,
            supervisor,
        }
    }

    /// 使用 Mock Agent 的会话
    pub fn with_mock_agent(cfg: &AppConfig) -> Self {
        Self::new(cfg, Arc::new(MockAgent::from_config(&cfg.agent)))
    }

    pub fn messages(&self) -> &Arc<MessageStore> {
        &self.messages
    }

    pub fn widgets(&self) -> &Arc<WidgetStore> {
        &self.widgets
    }

    pub fn orchestrator(&self) -> &Arc<ChatOrchestrator> {
        &self.orchestrator
    }

    pub async fn send_user_message(&self, text: &str) {
        self.orchestrator.send_user_message(text).await
    }

    /// 选中消息：设为激活消息；若为带渲染指令的 Agent 消息则重新激活其组件
    ///
    /// 未知 id、用户消息、无指令的 Agent 消息均返回 false 且不改变任何状态。
    pub fn select_message(&self, id: MessageId) -> bool {
        let Some(msg) = self.messages.get(id) else {
            return false;
        };
        let action = match (msg.role, msg.widget_action) {
            (Role::Agent, Some(action)) => action,
            _ => return false,
        };
        tracing::debug!(%id, component = %action.widget.component(), "message selected");
        self.widgets.set_active(action.widget);
        self.messages.set_active_id(Some(id));
        true
    }

    /// 清空对话记录与画布
    pub fn clear(&self) {
        self.messages.clear();
        self.widgets.clear();
        self.widgets.set_loading(false);
        tracing::info!("session cleared");
    }

    /// 拆除会话：中断进行中的回合
    pub fn shutdown(&self) {
        self.supervisor.shutdown();
    }

    pub fn is_shut_down(&self) -> bool {
        self.supervisor.is_shut_down()
    }

    /// 当前 UI 投影
    pub fn snapshot(&self) -> UiState {
        UiState::project(
            self.orchestrator.phase(),
            self.messages.snapshot(),
            self.widgets.snapshot(),
        )
    }
}

/// 启动命令循环：返回命令发送端与后台任务句柄
///
/// Submit 以独立任务运行，编排器内部排队保证回合不交错；Quit 或发送端全部关闭时拆除会话并退出。
pub fn spawn_session(session: Arc<ChatSession>) -> (mpsc::UnboundedSender<Command>, JoinHandle<()>) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();

    let handle = tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                Command::Submit(input) => {
                    let orchestrator = session.orchestrator().clone();
                    tokio::spawn(async move { orchestrator.send_user_message(&input).await });
                }
                Command::Select(id) => {
                    session.select_message(id);
                }
                Command::Clear => session.clear(),
                Command::Quit => break,
            }
        }
        session.shutdown();
        tracing::info!("session loop stopped");
    });

    (cmd_tx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::LatencyWindow;
    use std::time::Duration;

    fn session() -> ChatSession {
        ChatSession::new(
            &AppConfig::default(),
            Arc::new(MockAgent::new(LatencyWindow::new(
                Duration::from_millis(10),
                Duration::from_millis(10),
            ))),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_reactivates_widget() {
        let s = session();
        s.send_user_message("Show me sales").await;
        s.send_user_message("Show me the table").await;
        assert_eq!(s.widgets().active().unwrap().title(), "Key Performance Indicators");

        let sales_reply = s.messages().messages()[1].clone();
        assert!(s.select_message(sales_reply.id));

        assert_eq!(s.widgets().active().unwrap().title(), "Q3 Revenue");
        assert_eq!(s.messages().active_message_id(), Some(sales_reply.id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_rejects_user_and_unknown() {
        let s = session();
        s.send_user_message("growth").await;
        let user = s.messages().messages()[0].clone();
        let active = s.messages().active_message_id();

        assert!(!s.select_message(user.id));
        assert!(!s.select_message(MessageId::new()));
        assert_eq!(s.messages().active_message_id(), active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_resets_everything() {
        let s = session();
        s.send_user_message("sales").await;
        s.clear();

        let ui = s.snapshot();
        assert!(ui.messages.is_empty());
        assert!(ui.active_message_id.is_none());
        assert!(ui.widget.is_none());
        assert!(!ui.widget_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_loop() {
        let s = Arc::new(session());
        let (cmd_tx, handle) = spawn_session(s.clone());

        cmd_tx.send(Command::Submit("Show me sales".into())).unwrap();
        // 让后台回合跑完：延迟 10ms + 逐字输出
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(s.messages().message_count(), 2);

        cmd_tx.send(Command::Clear).unwrap();
        cmd_tx.send(Command::Quit).unwrap();
        handle.await.unwrap();

        assert_eq!(s.messages().message_count(), 0);
        assert!(s.is_shut_down());
    }
}
