use crate::protocol::models::{ComponentKind, RoomInfo, SessionErrorInfo};
use crate::protocol::server_events::ServerEvent;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// A session error as delivered to registered error handlers.
#[derive(Debug, Clone)]
pub struct SessionErrorEvent {
    pub error: SessionErrorInfo,
    pub source: ComponentKind,
}

#[derive(Debug, Clone)]
pub enum AgentEvent {
    Ready {
        session_id: String,
    },
    RoomJoined {
        room: RoomInfo,
    },
    Error(SessionErrorEvent),
    ToolCall {
        call_id: String,
        name: String,
    },
    Closed {
        reason: Option<String>,
    },
}

impl AgentEvent {
    #[must_use]
    pub(crate) fn from_server(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::SessionReady { session_id, .. } => Self::Ready {
                session_id: session_id.clone(),
            },
            ServerEvent::RoomJoined { room, .. } => Self::RoomJoined { room: room.clone() },
            ServerEvent::SessionError { error, source, .. } => Self::Error(SessionErrorEvent {
                error: error.clone(),
                source: *source,
            }),
            ServerEvent::ToolCall { call_id, name, .. } => Self::ToolCall {
                call_id: call_id.clone(),
                name: name.clone(),
            },
            ServerEvent::SessionClosed { reason, .. } => Self::Closed {
                reason: reason.clone(),
            },
        }
    }
}

pub struct EventStream<'a> {
    rx: &'a mut mpsc::Receiver<AgentEvent>,
}

impl<'a> EventStream<'a> {
    #[must_use]
    pub const fn new(rx: &'a mut mpsc::Receiver<AgentEvent>) -> Self {
        Self { rx }
    }
}

impl Stream for EventStream<'_> {
    type Item = AgentEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
