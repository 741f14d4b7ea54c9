//! Chatdash - 对话驱动的数据看板
//!
//! 模块划分：
//! - **agent**: 回复解析器抽象与 Mock Agent（关键词匹配 + 模拟延迟）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 回合编排状态机、逐字输出、会话上下文与监管
//! - **observability**: tracing 初始化
//! - **store**: 对话记录与画布组件两个状态容器
//! - **ui**: Ratatui TUI 界面
//! - **widget**: 组件描述符（图表 / 表格）

pub mod agent;
pub mod config;
pub mod core;
pub mod observability;
pub mod store;
pub mod ui;
pub mod widget;

pub use crate::core::{ChatOrchestrator, ChatSession};
