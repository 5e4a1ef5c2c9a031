use crate::error::{Error, Result};
use reqwest::header::HeaderValue;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

#[derive(Debug)]
pub struct WsStream(WebSocketStream<MaybeTlsStream<TcpStream>>);

impl WsStream {
    pub(crate) const fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self(stream)
    }
}

impl futures::Stream for WsStream {
    type Item = std::result::Result<
        tokio_tungstenite::tungstenite::Message,
        tokio_tungstenite::tungstenite::Error,
    >;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        std::pin::Pin::new(&mut self.0).poll_next(cx)
    }
}

impl futures::Sink<tokio_tungstenite::tungstenite::Message> for WsStream {
    type Error = tokio_tungstenite::tungstenite::Error;

    fn poll_ready(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::pin::Pin::new(&mut self.0).poll_ready(cx)
    }

    fn start_send(
        mut self: std::pin::Pin<&mut Self>,
        item: tokio_tungstenite::tungstenite::Message,
    ) -> std::result::Result<(), Self::Error> {
        std::pin::Pin::new(&mut self.0).start_send(item)
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::pin::Pin::new(&mut self.0).poll_flush(cx)
    }

    fn poll_close(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::pin::Pin::new(&mut self.0).poll_close(cx)
    }
}

const SESSION_PATH: &str = "/agent/session";

/// Derive the WebSocket session endpoint from the backend base URL.
///
/// # Errors
/// Returns an error if the base URL cannot be parsed or has no host.
pub fn session_endpoint(base_url: &str) -> Result<String> {
    let url = Url::parse(base_url)?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    let host = url
        .host_str()
        .ok_or_else(|| Error::InvalidConfig(format!("backend URL has no host: {base_url}")))?;

    let mut endpoint = format!("{scheme}://{host}");
    if let Some(port) = url.port() {
        endpoint.push_str(&format!(":{port}"));
    }
    endpoint.push_str(SESSION_PATH);
    Ok(endpoint)
}

/// Establish a WebSocket connection to the agent backend session endpoint.
///
/// # Errors
/// Returns an error if the handshake fails.
pub async fn connect(base_url: &str, token: &str) -> Result<WsStream> {
    let endpoint = session_endpoint(base_url)?;
    let auth_header = HeaderValue::from_str(&format!("Bearer {token}"))?;

    let mut req =
        tokio_tungstenite::tungstenite::client::IntoClientRequest::into_client_request(
            endpoint.as_str(),
        )?;
    req.headers_mut().insert(reqwest::header::AUTHORIZATION, auth_header);
    let (ws_stream, _) = connect_async(req).await?;

    tracing::info!(%endpoint, "Connected to agent backend");

    Ok(WsStream::new(ws_stream))
}
