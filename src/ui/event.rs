//! 事件处理
//!
//! 轮询 crossterm 键盘事件：Ctrl+L 直接发送 Clear，Esc/Ctrl+Q/Ctrl+C 转为 Quit，
//! 其余按键交给 run_app 拼 input_buffer 或切换选中的回复。

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::core::Command;
use crate::store::MessageId;

/// 应用事件：来自快捷键的 Command 或原始 KeyEvent
#[derive(Debug, Clone)]
pub enum AppEvent {
    Command(Command),
    Key(KeyEvent),
}

/// 事件处理器：持有 cmd_tx，poll 时读键盘并返回 AppEvent
pub struct EventHandler {
    cmd_tx: mpsc::UnboundedSender<Command>,
    poll_interval: Duration,
}

impl EventHandler {
    pub fn new(cmd_tx: mpsc::UnboundedSender<Command>, poll_interval: Duration) -> Self {
        Self {
            cmd_tx,
            poll_interval,
        }
    }

    pub fn poll(&self) -> anyhow::Result<Option<AppEvent>> {
        if event::poll(self.poll_interval)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(self.handle_key(key)));
                }
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent) -> AppEvent {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('l') if ctrl => {
                let _ = self.cmd_tx.send(Command::Clear);
                AppEvent::Command(Command::Clear)
            }
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => AppEvent::Command(Command::Quit),
            KeyCode::Esc => AppEvent::Command(Command::Quit),
            _ => AppEvent::Key(key),
        }
    }

    /// 空白输入不发送
    pub fn send_submit(&self, input: &str) -> bool {
        let input = input.trim();
        if input.is_empty() {
            return false;
        }
        self.cmd_tx.send(Command::Submit(input.to_string())).is_ok()
    }

    pub fn send_select(&self, id: MessageId) {
        let _ = self.cmd_tx.send(Command::Select(id));
    }

    pub fn send_quit(&self) {
        let _ = self.cmd_tx.send(Command::Quit);
    }
}
