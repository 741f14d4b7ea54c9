//! Agent 层：回复解析器抽象与 Mock 实现

pub mod mock;
pub mod traits;

pub use mock::{LatencyWindow, MockAgent};
pub use traits::{AgentResponse, ResolverError, ResponseResolver};
