// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Resilient WebSocket client.
//!
//! Wraps a bidirectional message-oriented socket behind the surface of a
//! plain client - URL, ready state, send, events - and adds the resilience
//! policies around it: automatic reconnection with bounded fixed-interval
//! retries, an offline send queue flushed in order on reconnect, chunking
//! for oversized payloads, an authentication gate before the first attempt,
//! a pluggable payload cipher, and best-effort event forwarding to external
//! HTTP collectors.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  commands   ┌──────────┐             ┌───────────┐
//! │  Client  │────────────►│  Driver  │────────────►│ Transport │
//! │ (handle) │◄────────────│  (task)  │◄────────────│  (trait)  │
//! └──────────┘   events    └──────────┘             └───────────┘
//!                            │      │
//!                            ▼      ▼
//!                      ┌─────────┐ ┌───────────┐
//!                      │  Queue  │ │ Forwarder │ (HTTP collectors)
//!                      └─────────┘ └───────────┘
//! ```
//!
//! The driver is a single tokio task owning the transport handle, the
//! lifecycle state machine, the offline queue, and every timer, so at most
//! one connection attempt and one reconnect schedule can exist at any
//! instant.
//!
//! # Example
//!
//! ```no_run
//! use tether::{Client, ClientConfig, Event};
//!
//! # async fn run() -> tether::Result<()> {
//! let (client, mut events) = Client::connect(
//!     "wss://example.com/feed",
//!     &[],
//!     ClientConfig::default(),
//! )
//! .await?;
//!
//! client.send(serde_json::json!({"subscribe": "ticks"})).await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         Event::Message(text) => println!("{text}"),
//!         Event::Closed { code, .. } => println!("closed: {code}"),
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod chunk;
mod cipher;
mod client;
mod config;
mod driver;
mod endpoint;
mod error;
mod http;
mod queue;
mod state;
mod transport;

pub use chunk::ChunkEnvelope;
pub use cipher::Cipher;
pub use client::{Client, Event, ReadyState};
pub use config::{AuthConfig, ClientConfig, ForwardConfig, ForwardTarget};
pub use error::{Error, Result};
pub use http::{HttpPost, ReqwestPost};
pub use transport::{Incoming, Transport, TransportError, TransportResult, WsTransport};
