use super::models::{ComponentKind, RoomInfo, SessionErrorInfo};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "session.ready")]
    SessionReady {
        event_id: String,
        session_id: String,
    },
    #[serde(rename = "room.joined")]
    RoomJoined { event_id: String, room: RoomInfo },
    /// A pipeline component failed. `source` defaults to `unknown` when the
    /// backend does not attribute the failure.
    #[serde(rename = "session.error")]
    SessionError {
        event_id: String,
        error: SessionErrorInfo,
        #[serde(default)]
        source: ComponentKind,
    },
    #[serde(rename = "tool.call")]
    ToolCall {
        event_id: String,
        call_id: String,
        name: String,
        arguments: String,
    },
    #[serde(rename = "session.closed")]
    SessionClosed {
        event_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}
