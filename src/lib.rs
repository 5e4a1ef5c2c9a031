#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod protocol;
pub mod recovery;
pub mod transport;

pub use agent::{
    Agent, AgentBuilder, AgentEvent, EventHandlers, EventStream, Session, SessionErrorEvent,
    SessionHandle, ToolCall, ToolRegistry, ToolResult,
};
pub use config::AgentConfig;
pub use error::{Error, Result};
pub use protocol::client_events::ClientEvent;
pub use protocol::models::{
    AgentDefinition, ComponentKind, LlmProvider, LlmSpec, PipelineConfig, RoomInfo,
    SessionErrorInfo, SttSpec, ToolSpec, TtsSpec, TurnDetectorSpec, VadSpec,
};
pub use protocol::server_events::ServerEvent;
pub use recovery::{Announcement, EpisodeTracker, FAILURE_MESSAGE, HOLDING_MESSAGE, SpokenRecovery};
