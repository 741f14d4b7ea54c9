//! TUI 应用主循环
//!
//! 进入全屏/原始模式，每帧读取会话投影并渲染；键盘输入拼 input_buffer，Enter 提交，
//! ↑↓ 在带组件的 Agent 回复之间切换（相当于点击气泡），退出时恢复终端。

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::KeyCode;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::core::{ChatSession, Command, UiState};
use crate::store::{MessageId, Role};
use crate::ui::event::{AppEvent, EventHandler};
use crate::ui::render::draw;

/// 可选中的回复：带渲染指令的 Agent 消息
fn selectable(state: &UiState) -> Vec<MessageId> {
    state
        .messages
        .iter()
        .filter(|m| m.role == Role::Agent && m.widget_action.is_some())
        .map(|m| m.id)
        .collect()
}

/// 从当前激活消息出发移动 delta 步；无激活消息时向上从末尾开始、向下从开头开始
fn next_selection(state: &UiState, delta: isize) -> Option<MessageId> {
    let ids = selectable(state);
    if ids.is_empty() {
        return None;
    }
    let current = state
        .active_message_id
        .and_then(|id| ids.iter().position(|x| *x == id));
    let idx = match current {
        Some(i) => (i as isize + delta).clamp(0, ids.len() as isize - 1) as usize,
        None if delta < 0 => ids.len() - 1,
        None => 0,
    };
    Some(ids[idx])
}

/// 运行 TUI：启用原始模式与全屏，循环 poll 事件 + 渲染，退出时恢复终端
pub async fn run_app(
    session: Arc<ChatSession>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    poll_interval: Duration,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let event_handler = EventHandler::new(cmd_tx, poll_interval);
    let mut input_buffer = String::new();

    loop {
        let state = session.snapshot();

        if let Ok(Some(ev)) = event_handler.poll() {
            match ev {
                AppEvent::Command(Command::Quit) => {
                    event_handler.send_quit();
                    break;
                }
                AppEvent::Command(_) => {}
                AppEvent::Key(key) if !state.input_locked() => match key.code {
                    KeyCode::Enter => {
                        event_handler.send_submit(&input_buffer);
                        input_buffer.clear();
                    }
                    KeyCode::Backspace => {
                        input_buffer.pop();
                    }
                    KeyCode::Char(c) => input_buffer.push(c),
                    KeyCode::Up => {
                        if let Some(id) = next_selection(&state, -1) {
                            event_handler.send_select(id);
                        }
                    }
                    KeyCode::Down => {
                        if let Some(id) = next_selection(&state, 1) {
                            event_handler.send_select(id);
                        }
                    }
                    _ => {}
                },
                AppEvent::Key(_) => {}
            }
        }

        terminal.draw(|f| draw(f, &state, &input_buffer))?;

        tokio::task::yield_now().await;
    }

    restore_terminal(&mut terminal)?;
    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::MockAgent;
    use crate::store::ChatMessage;

    fn state_with_replies() -> (UiState, Vec<MessageId>) {
        let a = ChatMessage::agent_placeholder(MockAgent::respond("sales").action);
        let b = ChatMessage::agent_placeholder(MockAgent::respond("table").action);
        let ids = vec![a.id, b.id];
        let state = UiState {
            messages: vec![
                ChatMessage::user("sales"),
                a,
                ChatMessage::agent("Sorry"),
                ChatMessage::user("table"),
                b,
            ],
            ..Default::default()
        };
        (state, ids)
    }

    #[test]
    fn test_selection_skips_plain_messages() {
        let (mut state, ids) = state_with_replies();
        assert_eq!(selectable(&state), ids);

        assert_eq!(next_selection(&state, -1), Some(ids[1]));
        assert_eq!(next_selection(&state, 1), Some(ids[0]));

        state.active_message_id = Some(ids[1]);
        assert_eq!(next_selection(&state, -1), Some(ids[0]));
        assert_eq!(next_selection(&state, 1), Some(ids[1]));
    }

    #[test]
    fn test_no_selection_without_replies() {
        assert_eq!(next_selection(&UiState::default(), 1), None);
    }
}
