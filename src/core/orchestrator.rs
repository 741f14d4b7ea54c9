//! 对话编排器：一次回合的完整流程
//!
//! 追加用户消息 -> Thinking -> 调用解析器 -> 追加空的 Agent 占位消息 -> 逐字写入 -> 激活组件 -> 标记激活消息。
//! 解析失败在回合边界被吞掉，转成一条固定的致歉消息；调用方永远正常返回。
//!
//! 回合严格排队：turn_gate 是公平（FIFO）的异步锁，第二个 send_user_message 会等前一个回合结束后
//! 才追加自己的用户消息，所以全局的 phase 始终只描述唯一在跑的回合。

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{broadcast, watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::agent::ResponseResolver;
use crate::config::ChatSection;
use crate::core::error::{ChatError, APOLOGY_MESSAGE};
use crate::core::events::ChatEvent;
use crate::core::state::ChatPhase;
use crate::core::typewriter::typewriter;
use crate::store::{ChatMessage, MessageId, MessagePatch, MessageStore, WidgetStore};

pub struct ChatOrchestrator {
    messages: Arc<MessageStore>,
    widgets: Arc<WidgetStore>,
    resolver: Arc<dyn ResponseResolver>,
    stream_interval: Duration,
    phase: watch::Sender<ChatPhase>,
    events: broadcast::Sender<ChatEvent>,
    turn_gate: Mutex<()>,
    cancel_token: CancellationToken,
}

impl ChatOrchestrator {
    pub fn new(
        messages: Arc<MessageStore>,
        widgets: Arc<WidgetStore>,
        resolver: Arc<dyn ResponseResolver>,
        chat: &ChatSection,
        cancel_token: CancellationToken,
    ) -> Self {
        let (phase, _) = watch::channel(ChatPhase::Idle);
        let (events, _) = broadcast::channel(chat.event_capacity.max(1));
        Self {
            messages,
            widgets,
            resolver,
            stream_interval: chat.stream_interval(),
            phase,
            events,
            turn_gate: Mutex::new(()),
            cancel_token,
        }
    }

    pub fn phase(&self) -> ChatPhase {
        *self.phase.borrow()
    }

    pub fn is_thinking(&self) -> bool {
        self.phase().is_thinking()
    }

    pub fn is_streaming(&self) -> bool {
        self.phase().is_streaming()
    }

    /// 对话记录的只读视图
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.messages()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<ChatPhase> {
        self.phase.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// 发送一条用户消息并跑完整个回合；空白输入直接忽略
    pub async fn send_user_message(&self, text: &str) {
        if text.trim().is_empty() {
            tracing::debug!("ignoring blank submission");
            return;
        }

        let _turn = self.turn_gate.lock().await;
        if self.cancel_token.is_cancelled() {
            tracing::debug!("session shut down, dropping queued turn");
            return;
        }

        let user = ChatMessage::user(text);
        let user_id = user.id;
        self.messages.append(user);
        self.emit(ChatEvent::UserMessage { id: user_id });

        self.set_phase(ChatPhase::AwaitingResponse);
        self.widgets.set_loading(true);
        self.emit(ChatEvent::Thinking);
        tracing::info!(%user_id, "turn started");

        match self.run_turn(user_id, text).await {
            Ok(Some(agent_id)) => {
                tracing::info!(%agent_id, "turn completed");
            }
            Ok(None) => {
                self.set_phase(ChatPhase::Idle);
                self.widgets.set_loading(false);
                tracing::info!(%user_id, "transcript cleared while thinking, reply dropped");
            }
            Err(ChatError::Cancelled) => {
                self.set_phase(ChatPhase::Idle);
                self.widgets.set_loading(false);
                self.emit(ChatEvent::Cancelled);
                tracing::info!(%user_id, "turn cancelled by session shutdown");
            }
            Err(e) => {
                tracing::warn!(error = %e, "turn failed, replying with apology");
                self.set_phase(ChatPhase::Idle);
                self.widgets.set_loading(false);
                if !self.messages.contains(user_id) {
                    tracing::debug!(%user_id, "transcript cleared, skipping apology");
                    return;
                }
                self.messages.append(ChatMessage::agent(APOLOGY_MESSAGE));
                self.emit(ChatEvent::Failed {
                    reason: e.to_string(),
                });
            }
        }
    }

    /// 跑完一个回合；等待期间对话被清空时返回 Ok(None)，不追加任何回复
    async fn run_turn(&self, user_id: MessageId, query: &str) -> Result<Option<MessageId>, ChatError> {
        let response = tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => return Err(ChatError::Cancelled),
            r = self.resolver.resolve(query) => r?,
        };

        if !self.messages.contains(user_id) {
            return Ok(None);
        }

        let placeholder = ChatMessage::agent_placeholder(response.action.clone());
        let agent_id = placeholder.id;
        self.messages.append(placeholder);
        // 回复已存在即结束 Thinking，此时尚未开始展示
        self.set_phase(ChatPhase::Idle);
        self.emit(ChatEvent::ReplyStarted { id: agent_id });

        self.stream_reply(agent_id, &response.message, || {
            self.widgets.set_loading(false)
        })
        .await?;

        if !self.messages.contains(agent_id) {
            tracing::debug!(%agent_id, "transcript cleared mid-turn, skipping widget activation");
            return Ok(Some(agent_id));
        }

        let component = response.action.widget.component();
        self.widgets.set_active(response.action.widget);
        self.messages.set_active_id(Some(agent_id));
        self.emit(ChatEvent::WidgetActivated { component });
        Ok(Some(agent_id))
    }

    /// 把 full_text 逐字写入 message_id 对应的消息
    ///
    /// 每个字符一次更新、随后挂起一个间隔；结束后清除两级 streaming 标志并恰好调用一次 on_complete。
    /// 空文本不挂起，但标志仍经历 true -> false，on_complete 仍会调用。
    /// 会话拆除时在下一个 tick 停止，不调用 on_complete。
    pub async fn stream_reply<F>(
        &self,
        message_id: MessageId,
        full_text: &str,
        on_complete: F,
    ) -> Result<(), ChatError>
    where
        F: FnOnce(),
    {
        self.set_phase(ChatPhase::Streaming);
        let mut reveal = pin!(typewriter(full_text, self.stream_interval));

        loop {
            tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    self.messages.update_by_id(message_id, MessagePatch::streaming(false));
                    self.set_phase(ChatPhase::Idle);
                    return Err(ChatError::Cancelled);
                }
                next = reveal.next() => match next {
                    Some(prefix) => {
                        self.messages.update_by_id(message_id, MessagePatch::content(prefix.clone()));
                        self.emit(ChatEvent::ContentRevealed {
                            id: message_id,
                            content: prefix,
                        });
                    }
                    None => break,
                },
            }
        }

        self.set_phase(ChatPhase::Idle);
        self.messages
            .update_by_id(message_id, MessagePatch::streaming(false));
        self.emit(ChatEvent::ReplyDone { id: message_id });
        on_complete();
        Ok(())
    }

    fn set_phase(&self, next: ChatPhase) {
        self.phase.send_if_modified(|p| {
            if *p == next {
                false
            } else {
                *p = next;
                true
            }
        });
    }

    fn emit(&self, ev: ChatEvent) {
        let _ = self.events.send(ev);
    }
}
