// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Plain structs with `Default` impls; callers override individual fields
//! with struct-update syntax. Configuration is immutable once the client is
//! constructed.

use std::sync::Arc;
use std::time::Duration;

use crate::cipher::Cipher;

/// Configuration for the resilient client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Delay between reconnection attempts (fixed interval, not exponential).
    pub reconnect_delay: Duration,
    /// How long a single connection attempt may take before it counts as failed.
    pub connection_timeout: Duration,
    /// Retry budget, counted in connection attempts since the last
    /// successful open. The initial attempt counts too: a retry is
    /// scheduled only while the count is below this bound, so `0` means
    /// exactly one attempt and no retries, and `N` from a cold start means
    /// at most `N` total attempts. A successful open resets the count.
    ///
    /// Once spent, the client stays dormant in `Closed` until
    /// [`reconnect`](crate::Client::reconnect) is called.
    pub max_retries: u32,
    /// Chunk size bound in kilobytes. `None` disables chunking.
    pub chunk_size_kb: Option<usize>,
    /// Reject plain `ws://` URLs.
    pub secure_only: bool,
    /// Never schedule reconnection attempts, regardless of close cause.
    pub disable_reconnect: bool,
    /// Query parameters appended to the connection URL.
    pub query_params: Vec<(String, String)>,
    /// Buffer sends issued while not open and flush them on the open
    /// transition. When false, such sends are dropped silently.
    pub offline_queue: bool,
    /// Keep-alive ping interval. `None` disables pings.
    pub ping_interval: Option<Duration>,
    /// Authentication gate run once before the first connection attempt.
    pub authenticate: Option<AuthConfig>,
    /// Forward delivered messages and errors to external HTTP collectors.
    pub forward: Option<ForwardConfig>,
    /// Payload cipher applied to every frame in both directions.
    pub cipher: Option<Arc<dyn Cipher>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            reconnect_delay: Duration::from_millis(1000),
            connection_timeout: Duration::from_millis(10_000),
            max_retries: 10,
            chunk_size_kb: None,
            secure_only: true,
            disable_reconnect: false,
            query_params: Vec::new(),
            offline_queue: true,
            ping_interval: None,
            authenticate: None,
            forward: None,
            cipher: None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("reconnect_delay", &self.reconnect_delay)
            .field("connection_timeout", &self.connection_timeout)
            .field("max_retries", &self.max_retries)
            .field("chunk_size_kb", &self.chunk_size_kb)
            .field("secure_only", &self.secure_only)
            .field("disable_reconnect", &self.disable_reconnect)
            .field("query_params", &self.query_params)
            .field("offline_queue", &self.offline_queue)
            .field("ping_interval", &self.ping_interval)
            .field("authenticate", &self.authenticate)
            .field("forward", &self.forward)
            .field("cipher", &self.cipher.as_ref().map(|_| "<cipher>"))
            .finish()
    }
}

/// Authentication gate configuration.
///
/// One POST to `url` before the first connection attempt. Only a response
/// status exactly equal to `ok_status` proceeds; anything else aborts
/// construction with no retries.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Endpoint receiving the authentication POST.
    pub url: String,
    /// Headers sent with the request.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<String>,
    /// The single status code treated as success.
    pub ok_status: u16,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            url: String::new(),
            headers: Vec::new(),
            body: None,
            ok_status: 200,
        }
    }
}

/// Event forwarding configuration.
///
/// Message and error collectors are independent; either may be absent.
#[derive(Debug, Clone, Default)]
pub struct ForwardConfig {
    /// Collector for delivered messages.
    pub messages: Option<ForwardTarget>,
    /// Collector for errors.
    pub errors: Option<ForwardTarget>,
}

/// A single forwarding endpoint.
#[derive(Debug, Clone)]
pub struct ForwardTarget {
    /// Endpoint receiving the fire-and-forget POST.
    pub url: String,
    /// Headers sent with each request.
    pub headers: Vec<(String, String)>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
