// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP side calls: the authentication gate and the event forwarder.
//!
//! Both consume the same `HttpPost` capability so tests can script statuses
//! without a network. The gate is a hard stop at construction time; the
//! forwarder is best-effort and never blocks event delivery.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::{AuthConfig, ForwardConfig, ForwardTarget};
use crate::error::{Error, Result};

/// Minimal HTTP capability: one POST, returning the response status.
pub trait HttpPost: Send + Sync {
    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: Option<String>,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<u16, String>> + Send + '_>>;
}

/// Production HTTP implementation over reqwest.
#[derive(Default)]
pub struct ReqwestPost {
    client: reqwest::Client,
}

impl ReqwestPost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpPost for ReqwestPost {
    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: Option<String>,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<u16, String>> + Send + '_>> {
        let mut request = self.client.post(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        Box::pin(async move {
            let response = request.send().await.map_err(|e| e.to_string())?;
            Ok(response.status().as_u16())
        })
    }
}

/// Run the authentication gate.
///
/// Exactly one POST; only a status equal to the configured `ok_status`
/// proceeds. Anything else aborts construction permanently - no retries are
/// ever scheduled for an auth failure.
pub async fn authenticate(http: &dyn HttpPost, auth: &AuthConfig) -> Result<()> {
    let status = http
        .post(&auth.url, &auth.headers, auth.body.clone())
        .await
        .map_err(Error::AuthCall)?;

    if status != auth.ok_status {
        return Err(Error::AuthRejected { status });
    }

    debug!(url = %auth.url, "authentication gate passed");
    Ok(())
}

/// Fire-and-forget forwarding of delivered messages and errors to external
/// collectors.
///
/// Failures are reported back on a channel and folded into the error path by
/// the driver; delivery to the consumer is never delayed by a collector.
pub struct Forwarder {
    http: Arc<dyn HttpPost>,
    config: ForwardConfig,
    failure_tx: mpsc::Sender<String>,
}

impl Forwarder {
    /// Create a forwarder and the receiver for its failure reports.
    pub fn new(http: Arc<dyn HttpPost>, config: ForwardConfig) -> (Self, mpsc::Receiver<String>) {
        let (failure_tx, failure_rx) = mpsc::channel(16);
        (
            Forwarder {
                http,
                config,
                failure_tx,
            },
            failure_rx,
        )
    }

    /// Forward a delivered message to its collector, if configured.
    pub fn forward_message(&self, payload: &str) {
        self.dispatch(self.config.messages.clone(), payload);
    }

    /// Forward an error to its collector, if configured.
    pub fn forward_error(&self, text: &str) {
        self.dispatch(self.config.errors.clone(), text);
    }

    fn dispatch(&self, target: Option<ForwardTarget>, body: &str) {
        let Some(target) = target else {
            return;
        };
        let http = Arc::clone(&self.http);
        let failure_tx = self.failure_tx.clone();
        let body = body.to_string();

        tokio::spawn(async move {
            match http.post(&target.url, &target.headers, Some(body)).await {
                Ok(status) if (200..300).contains(&status) => {}
                Ok(status) => {
                    warn!(url = %target.url, status, "collector rejected forwarded event");
                    let _ = failure_tx
                        .send(format!("collector {} returned status {}", target.url, status))
                        .await;
                }
                Err(e) => {
                    warn!(url = %target.url, error = %e, "failed to reach collector");
                    let _ = failure_tx
                        .send(format!("collector {}: {}", target.url, e))
                        .await;
                }
            }
        });
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
pub(crate) mod tests;
