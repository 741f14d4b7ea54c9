//! 核心编排层：回合状态机、逐字输出、会话上下文与监管

pub mod error;
pub mod events;
pub mod orchestrator;
pub mod session;
pub mod session_supervisor;
pub mod state;
pub mod typewriter;

pub use error::{ChatError, APOLOGY_MESSAGE};
pub use events::ChatEvent;
pub use orchestrator::ChatOrchestrator;
pub use session::{spawn_session, ChatSession, Command};
pub use session_supervisor::SessionSupervisor;
pub use state::{ChatPhase, UiState};
pub use typewriter::typewriter;
