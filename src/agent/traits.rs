//! 回复解析器抽象
//!
//! 编排器只依赖 ResponseResolver：给定查询，返回回复文本 + 渲染指令。Mock 实现从不失败，
//! 真实部署（网络后端）可能失败，错误统一为 ResolverError。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::widget::WidgetAction;

/// Agent 的一次完整回复
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub message: String,
    pub action: WidgetAction,
}

/// 解析器失败（如网络错误）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("Resolver unavailable: {0}")]
    Unavailable(String),

    #[error("Resolver timeout")]
    Timeout,
}

#[async_trait]
pub trait ResponseResolver: Send + Sync {
    /// 解析查询；可挂起（模拟或真实延迟）
    async fn resolve(&self, query: &str) -> Result<AgentResponse, ResolverError>;
}
