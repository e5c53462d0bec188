// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the underlying socket.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing
//!
//! The core only sees the capability set: open, send, ping, close, receive.

use std::future::Future;
use std::pin::Pin;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No live handle.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Something the transport produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A text frame.
    Text(String),
    /// The peer closed the connection.
    Closed {
        /// Close code (1005 when the peer sent none).
        code: u16,
        /// Close reason, possibly empty.
        reason: String,
    },
}

/// Transport trait for WebSocket-like communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send {
    /// Open a connection to the given URL.
    fn connect(
        &mut self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Send a text frame.
    fn send_text(
        &mut self,
        text: String,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Send a keep-alive ping.
    fn ping(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Close the connection with a code and reason, dropping the handle.
    fn close(
        &mut self,
        code: u16,
        reason: String,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Receive the next frame.
    ///
    /// Returns `None` if the stream ended without a close frame.
    fn recv(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<Incoming>>> + Send + '_>>;

    /// Check whether a handle is live.
    fn is_connected(&self) -> bool;
}

/// WebSocket transport implementation using tokio-tungstenite.
pub struct WsTransport {
    /// The WebSocket connection, if connected.
    ws: Option<WsConnection>,
    /// Subprotocols offered during the handshake.
    protocols: Vec<String>,
}

/// Internal WebSocket connection wrapper.
struct WsConnection {
    sink: futures_util::stream::SplitSink<
        tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
        tokio_tungstenite::tungstenite::Message,
    >,
    stream: futures_util::stream::SplitStream<
        tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    >,
}

impl WsTransport {
    /// Create a new WebSocket transport offering the given subprotocols.
    pub fn new(protocols: Vec<String>) -> Self {
        WsTransport {
            ws: None,
            protocols,
        }
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Transport for WsTransport {
    fn connect(
        &mut self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        let url = url.to_string();
        Box::pin(async move {
            use futures_util::StreamExt;
            use tokio_tungstenite::tungstenite::client::IntoClientRequest;

            let mut request = url
                .as_str()
                .into_client_request()
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            if !self.protocols.is_empty() {
                let offered = self.protocols.join(", ");
                let value = offered
                    .parse()
                    .map_err(|_| TransportError::ConnectionFailed("invalid protocol list".into()))?;
                request
                    .headers_mut()
                    .insert("Sec-WebSocket-Protocol", value);
            }

            let (ws_stream, _) = tokio_tungstenite::connect_async(request)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            self.ws = Some(WsConnection { sink, stream });
            Ok(())
        })
    }

    fn send_text(
        &mut self,
        text: String,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::SinkExt;
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            if let Err(e) = ws.sink.send(Message::Text(text.into())).await {
                // Connection is broken, clear it
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }

            // Flush to ensure the data is actually sent and we detect connection failures
            if let Err(e) = ws.sink.flush().await {
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }

            Ok(())
        })
    }

    fn ping(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::SinkExt;
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            if let Err(e) = ws.sink.send(Message::Ping(Vec::new().into())).await {
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }

            Ok(())
        })
    }

    fn close(
        &mut self,
        code: u16,
        reason: String,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::SinkExt;
            use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
            use tokio_tungstenite::tungstenite::protocol::CloseFrame;
            use tokio_tungstenite::tungstenite::Message;

            if let Some(mut ws) = self.ws.take() {
                let frame = CloseFrame {
                    code: CloseCode::from(code),
                    reason: reason.into(),
                };
                let _ = ws.sink.send(Message::Close(Some(frame))).await;
                let _ = ws.sink.close().await;
            }
            Ok(())
        })
    }

    fn recv(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<Incoming>>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::StreamExt;
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            loop {
                match ws.stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return Ok(Some(Incoming::Text(text.to_string())));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        self.ws = None;
                        let (code, reason) = match frame {
                            Some(f) => (u16::from(f.code), f.reason.to_string()),
                            // 1005: no status received
                            None => (1005, String::new()),
                        };
                        return Ok(Some(Incoming::Closed { code, reason }));
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        // Keep-alive traffic, continue waiting
                        continue;
                    }
                    Some(Ok(_)) => {
                        // Ignore other message types
                        continue;
                    }
                    Some(Err(e)) => {
                        // Connection is broken, clear it
                        self.ws = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                    None => {
                        // Stream ended, clear connection
                        self.ws = None;
                        return Ok(None);
                    }
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.ws.is_some()
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
pub(crate) mod tests;
