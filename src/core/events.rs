//! 回合过程事件：逐条推送给订阅者（UI 刷新、测试观察每一次逐字更新）

use serde::Serialize;

use crate::store::MessageId;
use crate::widget::WidgetComponent;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// 用户消息已追加
    UserMessage { id: MessageId },
    /// 开始等待解析器
    Thinking,
    /// Agent 占位消息已追加
    ReplyStarted { id: MessageId },
    /// 占位消息内容更新为新的前缀
    ContentRevealed { id: MessageId, content: String },
    /// 逐字输出结束
    ReplyDone { id: MessageId },
    /// 组件已激活
    WidgetActivated { component: WidgetComponent },
    /// 解析失败，已追加致歉消息
    Failed { reason: String },
    /// 会话拆除中断了回合
    Cancelled,
}
