//! 会话内的两个状态容器：对话记录（MessageStore）与激活组件（WidgetStore）
//!
//! 两者都是同步修改、不会失败的纯状态容器；观察者通过 `watch` 订阅，每次修改后都能读到最新值。

pub mod messages;
pub mod widget;

pub use messages::{ChatMessage, MessageId, MessagePatch, MessageStore, Role, Transcript};
pub use widget::{WidgetState, WidgetStore};
