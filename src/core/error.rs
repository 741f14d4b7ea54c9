//! 编排层错误类型
//!
//! 只在编排器内部流转：ResolverFailure 在回合边界被吞掉并转成致歉消息，Cancelled 表示会话拆除。

use thiserror::Error;

use crate::agent::ResolverError;

/// 回合失败时追加的固定致歉文本
pub const APOLOGY_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Resolver failure: {0}")]
    ResolverFailure(#[from] ResolverError),

    #[error("Turn cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_error_converts() {
        let err: ChatError = ResolverError::Unavailable("Network error".into()).into();
        assert!(matches!(err, ChatError::ResolverFailure(_)));
        assert!(err.to_string().contains("Network error"));
    }
}
