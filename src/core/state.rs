//! 状态定义：ChatPhase 状态机与 UiState 投影
//!
//! 编排器只维护一个 phase（Idle → AwaitingResponse → Streaming → Idle），
//! isThinking / isStreaming 都由它派生，二者不会同时为 true。

use serde::Serialize;

use crate::store::{ChatMessage, MessageId, Transcript, WidgetState};
use crate::widget::WidgetDescriptor;

/// 回合阶段
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ChatPhase {
    #[default]
    Idle,
    /// 已追加用户消息，等待解析器返回
    AwaitingResponse,
    /// 正在逐字输出 Agent 回复
    Streaming,
}

impl ChatPhase {
    pub fn is_thinking(&self) -> bool {
        matches!(self, ChatPhase::AwaitingResponse)
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, ChatPhase::Streaming)
    }
}

/// UI 看到的「投影」状态，轻量且易于渲染
#[derive(Clone, Debug, Default, Serialize)]
pub struct UiState {
    pub phase: ChatPhase,
    pub messages: Vec<ChatMessage>,
    pub active_message_id: Option<MessageId>,
    pub widget: Option<WidgetDescriptor>,
    pub widget_loading: bool,
}

impl UiState {
    /// 合并对话记录、组件状态与当前阶段
    pub fn project(phase: ChatPhase, transcript: Transcript, widget: WidgetState) -> Self {
        Self {
            phase,
            messages: transcript.messages,
            active_message_id: transcript.active_message_id,
            widget: widget.active,
            widget_loading: widget.is_loading,
        }
    }

    /// 输入框是否锁定（回合进行中）
    pub fn input_locked(&self) -> bool {
        self.phase != ChatPhase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_flags_are_exclusive() {
        assert!(!ChatPhase::Idle.is_thinking());
        assert!(!ChatPhase::Idle.is_streaming());
        assert!(ChatPhase::AwaitingResponse.is_thinking());
        assert!(!ChatPhase::AwaitingResponse.is_streaming());
        assert!(ChatPhase::Streaming.is_streaming());
        assert!(!ChatPhase::Streaming.is_thinking());
    }

    #[test]
    fn test_project_default() {
        let ui = UiState::project(ChatPhase::Idle, Transcript::default(), WidgetState::default());
        assert!(ui.messages.is_empty());
        assert!(ui.widget.is_none());
        assert!(!ui.input_locked());
    }
}
