// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::transport::TransportError;

/// All possible errors that can occur in the tether library.
///
/// Construction-time errors (`InvalidUrl`, `InsecureScheme`, `AuthRejected`,
/// `AuthCall`) are terminal: the constructor returns them and no connection
/// is ever attempted. Runtime errors surface through the event channel and
/// feed the retry controller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("insecure scheme '{0}' rejected\n  hint: use wss:// or set secure_only to false")]
    InsecureScheme(String),

    #[error("authentication rejected with status {status}")]
    AuthRejected { status: u16 },

    #[error("authentication call failed: {0}")]
    AuthCall(String),

    #[error("connection attempt timed out")]
    ConnectionTimeout,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("event forwarding failed: {0}")]
    Forwarding(String),

    #[error("failed to decrypt incoming payload: {0}")]
    Decryption(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("client has been shut down")]
    Closed,
}

/// A specialized Result type for tether operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
