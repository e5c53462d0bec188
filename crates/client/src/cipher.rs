// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable payload cipher.
//!
//! The client never knows the algorithm: outgoing frames pass through
//! `encrypt` after serialization and before chunk-size measurement, incoming
//! frames pass through `decrypt` before forwarding and delivery. A
//! decryption failure skips delivery of that frame and is surfaced as an
//! error event, never a silent drop.

/// Symmetric transform applied to every text frame.
pub trait Cipher: Send + Sync {
    /// Transform an outgoing serialized payload.
    fn encrypt(&self, plaintext: &str) -> String;

    /// Transform an incoming raw payload back to plaintext.
    fn decrypt(&self, ciphertext: &str) -> Result<String, String>;
}
