//! 对话记录
//!
//! 有序、只追加（允许按 id 原地修改字段）的消息列表，外加一个「激活消息」指针。
//! 按 id 更新不存在的消息是静默 no-op：被清空后的旧回合仍可能继续写入，不应让 UI 崩溃。

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::widget::WidgetAction;

/// 消息 ID：创建时分配，进程生命周期内唯一
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// 发送方
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// 单条聊天消息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// 仅在 Agent 消息逐字输出期间为 true
    #[serde(default)]
    pub is_streaming: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_action: Option<WidgetAction>,
}

impl ChatMessage {
    /// 用户消息：内容去除首尾空白
    pub fn user(content: &str) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::User,
            content: content.trim().to_string(),
            timestamp: Utc::now(),
            is_streaming: false,
            widget_action: None,
        }
    }

    /// 空内容的 Agent 占位消息，随后逐字填充
    pub fn agent_placeholder(action: WidgetAction) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::Agent,
            content: String::new(),
            timestamp: Utc::now(),
            is_streaming: true,
            widget_action: Some(action),
        }
    }

    /// 内容已完整的 Agent 消息（无渲染指令）
    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::Agent,
            content: content.into(),
            timestamp: Utc::now(),
            is_streaming: false,
            widget_action: None,
        }
    }
}

/// 按 id 更新时的部分字段
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub is_streaming: Option<bool>,
}

impl MessagePatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn streaming(is_streaming: bool) -> Self {
        Self {
            is_streaming: Some(is_streaming),
            ..Default::default()
        }
    }

    fn apply(self, msg: &mut ChatMessage) {
        if let Some(content) = self.content {
            msg.content = content;
        }
        if let Some(is_streaming) = self.is_streaming {
            msg.is_streaming = is_streaming;
        }
    }
}

/// 对话记录快照
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Transcript {
    pub messages: Vec<ChatMessage>,
    pub active_message_id: Option<MessageId>,
}

/// 对话记录容器（每个会话一份）
#[derive(Debug)]
pub struct MessageStore {
    state: watch::Sender<Transcript>,
}

impl MessageStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Transcript::default());
        Self { state }
    }

    /// 追加一条消息
    pub fn append(&self, message: ChatMessage) {
        self.state.send_modify(|t| t.messages.push(message));
    }

    /// 按 id 原地更新；id 不存在时不做任何事并返回 false
    pub fn update_by_id(&self, id: MessageId, patch: MessagePatch) -> bool {
        let found = self.state.send_if_modified(|t| {
            match t.messages.iter_mut().find(|m| m.id == id) {
                Some(msg) => {
                    patch.apply(msg);
                    true
                }
                None => false,
            }
        });
        if !found {
            tracing::debug!(%id, "update for unknown message ignored");
        }
        found
    }

    pub fn set_active_id(&self, id: Option<MessageId>) {
        self.state.send_modify(|t| t.active_message_id = id);
    }

    /// 清空全部消息并重置激活指针
    pub fn clear(&self) {
        self.state.send_modify(|t| {
            t.messages.clear();
            t.active_message_id = None;
        });
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.borrow().messages.clone()
    }

    pub fn snapshot(&self) -> Transcript {
        self.state.borrow().clone()
    }

    pub fn get(&self, id: MessageId) -> Option<ChatMessage> {
        self.state.borrow().messages.iter().find(|m| m.id == id).cloned()
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.state.borrow().messages.iter().any(|m| m.id == id)
    }

    pub fn last_message(&self) -> Option<ChatMessage> {
        self.state.borrow().messages.last().cloned()
    }

    pub fn message_count(&self) -> usize {
        self.state.borrow().messages.len()
    }

    pub fn active_message_id(&self) -> Option<MessageId> {
        self.state.borrow().active_message_id
    }

    pub fn subscribe(&self) -> watch::Receiver<Transcript> {
        self.state.subscribe()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}
