// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Public client surface.
//!
//! Construction validates the URL, runs the authentication gate, then
//! spawns the background driver task that owns the transport, the state
//! machine, the offline queue, and every timer. The caller talks to the
//! driver over a command channel and observes it over a typed event channel;
//! ready state and the retry count are mirrored in atomics for lock-free
//! reads.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::ClientConfig;
use crate::driver::Driver;
use crate::endpoint;
use crate::error::{Error, Result};
use crate::http::{self, HttpPost, ReqwestPost};
use crate::transport::{Transport, WsTransport};

/// Observable readiness of the connection.
///
/// The numeric values of `Connecting` through `Closed` match the underlying
/// transport's ready-state codes; `Uninitialized` exists only before the
/// first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
    Uninitialized = 4,
}

impl ReadyState {
    fn from_u8(value: u8) -> ReadyState {
        match value {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            3 => ReadyState::Closed,
            _ => ReadyState::Uninitialized,
        }
    }
}

/// Connection state visible to both the driver task and the caller.
///
/// Uses atomic fields for lock-free reads from the public accessors.
#[derive(Debug)]
pub(crate) struct SharedState {
    ready: AtomicU8,
    retries: AtomicU32,
}

impl SharedState {
    pub(crate) fn new() -> Self {
        SharedState {
            ready: AtomicU8::new(ReadyState::Uninitialized as u8),
            retries: AtomicU32::new(0),
        }
    }

    pub(crate) fn ready(&self) -> ReadyState {
        ReadyState::from_u8(self.ready.load(Ordering::Acquire))
    }

    pub(crate) fn set_ready(&self, state: ReadyState) {
        self.ready.store(state as u8, Ordering::Release);
    }

    pub(crate) fn retries(&self) -> u32 {
        self.retries.load(Ordering::Acquire)
    }

    pub(crate) fn set_retries(&self, count: u32) {
        self.retries.store(count, Ordering::Release);
    }
}

/// Commands sent from the client handle to the driver task.
#[derive(Debug)]
pub(crate) enum Command {
    Send(serde_json::Value),
    Reconnect,
    Close { code: u16, reason: String },
}

/// Events emitted by the driver task, one channel, typed per kind.
#[derive(Debug)]
pub enum Event {
    /// The connection opened (emitted after the offline queue flush).
    Open,
    /// A message arrived, already decrypted.
    Message(String),
    /// The connection closed.
    Closed { code: u16, reason: String },
    /// A failure occurred. Runtime failures also feed the retry controller.
    Error(Error),
}

/// Resilient wrapper around a bidirectional message-oriented socket.
#[derive(Debug)]
pub struct Client {
    url: Url,
    shared: Arc<SharedState>,
    cmd_tx: mpsc::Sender<Command>,
    cancel: CancellationToken,
}

impl Client {
    /// Connect with the production WebSocket transport and HTTP client.
    ///
    /// Returns the client handle and the event receiver. Construction-time
    /// failures (invalid URL, insecure scheme, rejected authentication) are
    /// returned here and never retried; the first connection attempt itself
    /// happens in the background after this returns.
    pub async fn connect(
        url: &str,
        protocols: &[&str],
        config: ClientConfig,
    ) -> Result<(Client, mpsc::Receiver<Event>)> {
        let protocols = protocols.iter().map(|p| p.to_string()).collect();
        Self::with_transport(url, WsTransport::new(protocols), Arc::new(ReqwestPost::new()), config)
            .await
    }

    /// Connect with injected transport and HTTP collaborators (for testing).
    pub async fn with_transport<T: Transport + 'static>(
        url: &str,
        transport: T,
        http_post: Arc<dyn HttpPost>,
        config: ClientConfig,
    ) -> Result<(Client, mpsc::Receiver<Event>)> {
        let url = endpoint::compose(url, &config.query_params, config.secure_only)?;

        // Hard stop before any connection attempt: a rejected gate leaves
        // the ready state at Uninitialized with nothing scheduled.
        if let Some(auth) = &config.authenticate {
            http::authenticate(http_post.as_ref(), auth).await?;
        }

        let shared = Arc::new(SharedState::new());
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();

        let driver = Driver::new(
            url.clone(),
            config,
            transport,
            http_post,
            Arc::clone(&shared),
            event_tx,
            cmd_rx,
            cancel.clone(),
        );
        tokio::spawn(driver.run());

        Ok((
            Client {
                url,
                shared,
                cmd_tx,
                cancel,
            },
            event_rx,
        ))
    }

    /// The composed connection URL, query parameters included.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Current readiness of the connection.
    pub fn ready_state(&self) -> ReadyState {
        self.shared.ready()
    }

    /// Connection attempts since the last successful open.
    pub fn total_retry_count(&self) -> u32 {
        self.shared.retries()
    }

    /// Send a payload.
    ///
    /// While the connection is open the payload goes out immediately
    /// (chunked if oversized); otherwise it is queued for the next open
    /// transition, or dropped silently when the offline queue is disabled.
    pub async fn send(&self, payload: serde_json::Value) -> Result<()> {
        self.cmd_tx
            .send(Command::Send(payload))
            .await
            .map_err(|_| Error::Closed)
    }

    /// Manually reconnect after retries were exhausted or an explicit close.
    ///
    /// Resets the retry budget. A no-op while an attempt is already in
    /// flight or the connection is open.
    pub async fn reconnect(&self) -> Result<()> {
        self.cmd_tx
            .send(Command::Reconnect)
            .await
            .map_err(|_| Error::Closed)
    }

    /// Close the connection with code 1000 (normal closure).
    pub async fn close(&self) -> Result<()> {
        self.close_with(1000, "").await
    }

    /// Close the connection with an explicit code and reason.
    ///
    /// Tears down the reconnect schedule and the keep-alive timer; the
    /// driver stays alive for a later [`reconnect`](Self::reconnect). A
    /// no-op on the transport if no handle is live.
    pub async fn close_with(&self, code: u16, reason: &str) -> Result<()> {
        self.cmd_tx
            .send(Command::Close {
                code,
                reason: reason.to_string(),
            })
            .await
            .map_err(|_| Error::Closed)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
