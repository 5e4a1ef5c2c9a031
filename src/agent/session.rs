use crate::protocol::client_events::ClientEvent;
use crate::protocol::server_events::ServerEvent;
use crate::{Error, Result};

use super::events::{AgentEvent, EventStream, SessionErrorEvent};
use super::handlers::EventHandlers;
use super::tools::{ToolCall, ToolRegistry};
use super::transport::Transport;
use tokio::sync::{mpsc, oneshot};
use tracing::Instrument;

/// Cloneable handle into a running session, safe to use from event handlers.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Speak `text` through the session's TTS output.
    ///
    /// Fire-and-forget: resolves once the speak event is enqueued to the
    /// session loop. Delivery and playback are never awaited or verified.
    ///
    /// # Errors
    /// Returns an error if the session loop has shut down.
    pub async fn say(&self, text: &str) -> Result<()> {
        let event = ClientEvent::Say {
            event_id: None,
            text: text.to_string(),
            allow_interruptions: None,
        };
        self.sender
            .send(Command::Send { event })
            .await
            .map_err(|_| Error::SessionClosed)
    }
}

/// A running agent session.
///
/// Owns the event loop task that drives the backend connection: outgoing
/// commands, incoming server events, error-handler dispatch, and tool calls.
pub struct Session {
    sender: mpsc::Sender<Command>,
    event_rx: mpsc::Receiver<AgentEvent>,
}

impl Session {
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            sender: self.sender.clone(),
        }
    }

    /// Speak `text` through the session's TTS output (fire-and-forget).
    ///
    /// # Errors
    /// Returns an error if the session loop has shut down.
    pub async fn say(&self, text: &str) -> Result<()> {
        self.handle().say(text).await
    }

    /// Ask the backend to start the session pipeline.
    ///
    /// # Errors
    /// Returns an error if the send fails or the session loop has shut down.
    pub async fn start(&self) -> Result<()> {
        self.send_event(ClientEvent::SessionStart { event_id: None }).await
    }

    /// Close the session.
    ///
    /// # Errors
    /// Returns an error if the send fails or the session loop has shut down.
    pub async fn close(&self) -> Result<()> {
        self.send_event(ClientEvent::SessionClose { event_id: None }).await
    }

    /// Await the next session event.
    ///
    /// # Errors
    /// Currently infallible; kept fallible for parity with the send surface.
    pub async fn next_event(&mut self) -> Result<Option<AgentEvent>> {
        Ok(self.event_rx.recv().await)
    }

    /// Stream session events.
    #[must_use]
    pub fn events(&mut self) -> EventStream<'_> {
        EventStream::new(&mut self.event_rx)
    }

    async fn send_event(&self, event: ClientEvent) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Command::SendWithResponse { event, respond: tx })
            .await
            .map_err(|_| Error::SessionClosed)?;
        rx.await.map_err(|_| Error::SessionClosed)??;
        Ok(())
    }

    pub(crate) fn from_transport(
        mut transport: Box<dyn Transport>,
        handlers: EventHandlers,
        tools: ToolRegistry,
    ) -> Self {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(64);
        let (event_tx, event_rx) = mpsc::channel::<AgentEvent>(128);
        // Weak so the loop's own reference does not hold the channel open:
        // dropping `Session` closes it and ends the loop.
        let loop_tx = cmd_tx.downgrade();

        tokio::spawn(async move {
            let mut room: Option<String> = None;
            loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        match cmd {
                            Some(Command::Send { event }) => {
                                if let Err(err) = transport.send(event).await {
                                    tracing::warn!(%err, "failed to send session event");
                                }
                            }
                            Some(Command::SendWithResponse { event, respond }) => {
                                let result = transport.send(event).await;
                                let _ = respond.send(result);
                            }
                            None => break,
                        }
                    }
                    event = transport.next_event() => {
                        match event {
                            Ok(Some(evt)) => {
                                let ctx = EventContext {
                                    handlers: &handlers,
                                    tools: &tools,
                                    event_tx: &event_tx,
                                    loop_tx: &loop_tx,
                                    room: &mut room,
                                };
                                handle_server_event(evt, ctx, &mut transport).await;
                            }
                            Ok(None) | Err(_) => break,
                        }
                    }
                }
            }
        });

        Self {
            sender: cmd_tx,
            event_rx,
        }
    }
}

enum Command {
    Send {
        event: ClientEvent,
    },
    SendWithResponse {
        event: ClientEvent,
        respond: oneshot::Sender<Result<()>>,
    },
}

struct EventContext<'a> {
    handlers: &'a EventHandlers,
    tools: &'a ToolRegistry,
    event_tx: &'a mpsc::Sender<AgentEvent>,
    loop_tx: &'a mpsc::WeakSender<Command>,
    room: &'a mut Option<String>,
}

async fn handle_server_event(
    evt: ServerEvent,
    ctx: EventContext<'_>,
    transport: &mut Box<dyn Transport>,
) {
    let _ = ctx.event_tx.send(AgentEvent::from_server(&evt)).await;

    match evt {
        ServerEvent::SessionReady { session_id, .. } => {
            tracing::info!(%session_id, "session ready");
        }
        ServerEvent::RoomJoined { room, .. } => {
            tracing::info!(room = %room.name, "joined room");
            *ctx.room = Some(room.name);
        }
        ServerEvent::SessionError { error, source, .. } => {
            if let Some(handler) = &ctx.handlers.on_error {
                // Upgrade fails once the owning `Session` is gone; the loop
                // is about to exit, so the handler is skipped.
                let Some(sender) = ctx.loop_tx.upgrade() else {
                    return;
                };
                let handle = SessionHandle { sender };
                let event = SessionErrorEvent { error, source };
                // Handlers run one at a time, in arrival order.
                let span = tracing::info_span!(
                    "session",
                    room = ctx.room.as_deref().unwrap_or("unknown")
                );
                handler(handle, event).instrument(span).await;
            }
        }
        ServerEvent::ToolCall {
            call_id,
            name,
            arguments,
            ..
        } => {
            let arguments = serde_json::from_str(&arguments)
                .unwrap_or(serde_json::Value::String(arguments));
            let call = ToolCall {
                name,
                call_id: call_id.clone(),
                arguments,
            };
            let output = match ctx.tools.dispatch(call).await {
                Ok(result) => serde_json::to_string(&result.output).unwrap_or_default(),
                Err(err) => serde_json::json!({ "error": err.to_string() }).to_string(),
            };
            let event = ClientEvent::ToolResult {
                event_id: None,
                call_id,
                output,
            };
            if let Err(err) = transport.send(event).await {
                tracing::warn!(%err, "failed to send tool result");
            }
        }
        ServerEvent::SessionClosed { reason, .. } => {
            tracing::info!(
                reason = reason.as_deref().unwrap_or("unspecified"),
                "session closed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::models::{ComponentKind, SessionErrorInfo};
    use crate::recovery::{FAILURE_MESSAGE, HOLDING_MESSAGE, SpokenRecovery};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct MockTransport {
        incoming: mpsc::Receiver<ServerEvent>,
        outgoing: mpsc::Sender<ClientEvent>,
    }

    impl Transport for MockTransport {
        fn send(
            &mut self,
            event: ClientEvent,
        ) -> super::super::transport::BoxFuture<'_, Result<()>> {
            let outgoing = self.outgoing.clone();
            Box::pin(async move {
                outgoing.send(event).await.map_err(|_| Error::SessionClosed)?;
                Ok(())
            })
        }

        fn next_event(
            &mut self,
        ) -> super::super::transport::BoxFuture<'_, Result<Option<ServerEvent>>> {
            Box::pin(async move { Ok(self.incoming.recv().await) })
        }
    }

    fn recovery_handlers() -> EventHandlers {
        let recovery = Arc::new(SpokenRecovery::new());
        EventHandlers::new().on_error(move |session, event| {
            let recovery = Arc::clone(&recovery);
            async move { recovery.handle(&session, event).await }
        })
    }

    fn error_event(id: &str, error: SessionErrorInfo, source: ComponentKind) -> ServerEvent {
        ServerEvent::SessionError {
            event_id: id.to_string(),
            error,
            source,
        }
    }

    async fn next_say(out_rx: &mut mpsc::Receiver<ClientEvent>) -> String {
        let event = tokio::time::timeout(Duration::from_secs(1), out_rx.recv())
            .await
            .expect("timed out waiting for speech")
            .expect("session loop dropped");
        match event {
            ClientEvent::Say { text, .. } => text,
            other => panic!("unexpected event: {other:?}"),
        }
    }

    async fn assert_no_more_speech(out_rx: &mut mpsc::Receiver<ClientEvent>) {
        let outcome = tokio::time::timeout(Duration::from_millis(200), out_rx.recv()).await;
        assert!(outcome.is_err(), "unexpected extra event: {outcome:?}");
    }

    #[tokio::test]
    async fn recoverable_run_speaks_holding_message_once() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let transport = Box::new(MockTransport {
            incoming: event_rx,
            outgoing: out_tx,
        });

        let session =
            Session::from_transport(transport, recovery_handlers(), ToolRegistry::new());

        for i in 0..3 {
            let evt = error_event(
                &format!("evt_{i}"),
                SessionErrorInfo::recoverable("stt stream dropped"),
                ComponentKind::Stt,
            );
            event_tx.send(evt).await.unwrap();
        }

        assert_eq!(next_say(&mut out_rx).await, HOLDING_MESSAGE);
        assert_no_more_speech(&mut out_rx).await;

        drop(session);
    }

    #[tokio::test]
    async fn terminal_error_resets_the_episode() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let transport = Box::new(MockTransport {
            incoming: event_rx,
            outgoing: out_tx,
        });

        let session =
            Session::from_transport(transport, recovery_handlers(), ToolRegistry::new());

        let events = [
            error_event(
                "evt_1",
                SessionErrorInfo::recoverable("llm timeout"),
                ComponentKind::Llm,
            ),
            error_event(
                "evt_2",
                SessionErrorInfo::terminal("llm chain exhausted"),
                ComponentKind::Llm,
            ),
            error_event(
                "evt_3",
                SessionErrorInfo::recoverable("llm timeout"),
                ComponentKind::Llm,
            ),
        ];
        for evt in events {
            event_tx.send(evt).await.unwrap();
        }

        assert_eq!(next_say(&mut out_rx).await, HOLDING_MESSAGE);
        assert_eq!(next_say(&mut out_rx).await, FAILURE_MESSAGE);
        assert_eq!(next_say(&mut out_rx).await, HOLDING_MESSAGE);
        assert_no_more_speech(&mut out_rx).await;

        drop(session);
    }

    #[tokio::test]
    async fn lone_terminal_error_speaks_apology_only() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let transport = Box::new(MockTransport {
            incoming: event_rx,
            outgoing: out_tx,
        });

        let session =
            Session::from_transport(transport, recovery_handlers(), ToolRegistry::new());

        let evt = error_event(
            "evt_1",
            SessionErrorInfo::terminal("tts endpoint unreachable"),
            ComponentKind::Tts,
        );
        event_tx.send(evt).await.unwrap();

        assert_eq!(next_say(&mut out_rx).await, FAILURE_MESSAGE);
        assert_no_more_speech(&mut out_rx).await;

        drop(session);
    }

    #[tokio::test]
    async fn errors_are_forwarded_to_the_event_stream() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let (out_tx, _out_rx) = mpsc::channel(8);
        let transport = Box::new(MockTransport {
            incoming: event_rx,
            outgoing: out_tx,
        });

        let mut session =
            Session::from_transport(transport, EventHandlers::new(), ToolRegistry::new());

        let evt = error_event(
            "evt_1",
            SessionErrorInfo::recoverable("vad hiccup"),
            ComponentKind::Vad,
        );
        event_tx.send(evt).await.unwrap();

        let mapped = session.next_event().await.unwrap().expect("agent event");
        match mapped {
            AgentEvent::Error(event) => {
                assert!(event.error.recoverable);
                assert_eq!(event.source, ComponentKind::Vad);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn say_emits_speech_event() {
        let (_event_tx, event_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let transport = Box::new(MockTransport {
            incoming: event_rx,
            outgoing: out_tx,
        });

        let session =
            Session::from_transport(transport, EventHandlers::new(), ToolRegistry::new());

        session.say("hello there").await.unwrap();
        assert_eq!(next_say(&mut out_rx).await, "hello there");
    }

    #[tokio::test]
    async fn tool_call_sends_result() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let transport = Box::new(MockTransport {
            incoming: event_rx,
            outgoing: out_tx,
        });

        let mut tools = ToolRegistry::new();
        tools.tool("echo", |args: serde_json::Value| async move { Ok(args) });

        let session = Session::from_transport(transport, EventHandlers::new(), tools);

        let evt = ServerEvent::ToolCall {
            event_id: "evt_1".to_string(),
            call_id: "call_1".to_string(),
            name: "echo".to_string(),
            arguments: r#"{"hello":"world"}"#.to_string(),
        };
        event_tx.send(evt).await.unwrap();

        let sent = tokio::time::timeout(Duration::from_secs(1), out_rx.recv())
            .await
            .unwrap()
            .unwrap();
        match sent {
            ClientEvent::ToolResult { call_id, output, .. } => {
                assert_eq!(call_id, "call_1");
                assert!(output.contains("hello"));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        drop(session);
    }

    #[tokio::test]
    async fn start_emits_session_start() {
        let (_event_tx, event_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let transport = Box::new(MockTransport {
            incoming: event_rx,
            outgoing: out_tx,
        });

        let session =
            Session::from_transport(transport, EventHandlers::new(), ToolRegistry::new());

        session.start().await.unwrap();

        let sent = tokio::time::timeout(Duration::from_secs(1), out_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(sent, ClientEvent::SessionStart { .. }));
    }

    #[tokio::test]
    async fn close_emits_session_close() {
        let (_event_tx, event_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let transport = Box::new(MockTransport {
            incoming: event_rx,
            outgoing: out_tx,
        });

        let session =
            Session::from_transport(transport, EventHandlers::new(), ToolRegistry::new());

        session.close().await.unwrap();

        let sent = tokio::time::timeout(Duration::from_secs(1), out_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(sent, ClientEvent::SessionClose { .. }));
    }

    #[tokio::test]
    async fn dropping_session_stops_the_loop() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let transport = Box::new(MockTransport {
            incoming: event_rx,
            outgoing: out_tx,
        });

        let session =
            Session::from_transport(transport, recovery_handlers(), ToolRegistry::new());
        drop(session);

        // An error arriving after the drop must not wake the handler or
        // speak into the room.
        let evt = error_event(
            "evt_1",
            SessionErrorInfo::recoverable("stt stream dropped"),
            ComponentKind::Stt,
        );
        let _ = event_tx.send(evt).await;

        // The loop exits and drops the transport, closing the outgoing side
        // without ever emitting speech.
        let outcome = tokio::time::timeout(Duration::from_secs(1), out_rx.recv())
            .await
            .expect("loop did not exit after Session drop");
        assert!(outcome.is_none(), "unexpected event after drop: {outcome:?}");
    }
}
