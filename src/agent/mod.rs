//! High-level facade over the agent backend protocol.
//!
//! Composes the session pipeline, registers event handlers, and drives the
//! session event loop while keeping the low-level wire types accessible
//! through `crate::protocol`.

mod builder;
pub mod events;
mod handlers;
mod session;
mod tools;
mod transport;

pub use builder::{Agent, AgentBuilder};
pub use events::{AgentEvent, EventStream, SessionErrorEvent};
pub use handlers::{ErrorHandler, EventHandlers};
pub use session::{Session, SessionHandle};
pub use tools::{BoxFuture as ToolFuture, ToolCall, ToolDefinition, ToolRegistry, ToolResult};
