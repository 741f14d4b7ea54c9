//! 会话监管：拆除时中断进行中的回合
//!
//! 持有会话级 CancellationToken；编排器拿子 token，在等待解析器与每个逐字 tick 处检查。
//! 拆除后定时器不会继续修改已释放的状态。

use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub struct SessionSupervisor {
    cancel_token: CancellationToken,
}

impl SessionSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建子 token（交给编排器）
    pub fn child_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    /// 触发拆除
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_cancels_children() {
        let supervisor = SessionSupervisor::new();
        let child = supervisor.child_token();
        assert!(!child.is_cancelled());

        supervisor.shutdown();

        assert!(child.is_cancelled());
        assert!(supervisor.is_shut_down());
    }
}
