use crate::Result;
use crate::protocol::client_events::ClientEvent;
use crate::protocol::server_events::ServerEvent;
use crate::transport::ws::WsStream;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::pin::Pin;
use tokio_tungstenite::tungstenite::protocol::Message;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait Transport: Send {
    fn send(&mut self, event: ClientEvent) -> BoxFuture<'_, Result<()>>;
    fn next_event(&mut self) -> BoxFuture<'_, Result<Option<ServerEvent>>>;
}

pub struct WsTransport {
    stream: WsStream,
}

impl WsTransport {
    pub(crate) const fn new(stream: WsStream) -> Self {
        Self { stream }
    }

    async fn send_event(&mut self, event: ClientEvent) -> Result<()> {
        let json = serde_json::to_string(&event)?;
        tracing::trace!("Sending event: {json}");
        self.stream.send(Message::Text(json.into())).await?;
        Ok(())
    }

    async fn recv_event(&mut self) -> Result<Option<ServerEvent>> {
        while let Some(msg) = self.stream.next().await {
            match msg? {
                Message::Text(text) => {
                    tracing::trace!("Received event: {text}");
                    return Ok(Some(serde_json::from_str::<ServerEvent>(&text)?));
                }
                Message::Close(_) => {
                    tracing::info!("Backend closed the session connection");
                    return Ok(None);
                }
                Message::Ping(payload) => {
                    tracing::debug!("Received Ping, sending Pong");
                    self.stream.send(Message::Pong(payload)).await?;
                }
                _ => (),
            }
        }
        Ok(None)
    }
}

impl Transport for WsTransport {
    fn send(&mut self, event: ClientEvent) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.send_event(event))
    }

    fn next_event(&mut self) -> BoxFuture<'_, Result<Option<ServerEvent>>> {
        Box::pin(self.recv_event())
    }
}
