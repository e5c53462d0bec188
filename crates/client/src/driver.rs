// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background driver task.
//!
//! One task owns the transport handle, the state machine, the offline queue,
//! and both timers, and interleaves: commands from the client handle, frames
//! from the transport, retry ticks, keep-alive ticks, and forwarding-failure
//! reports. Single-task ownership is what enforces the concurrency
//! guarantees - no second connection attempt or retry schedule can ever
//! interleave with one in flight.
//!
//! Retry-trigger discipline: the retry schedule is armed from the close path
//! only. A transport error force-disconnects the handle and falls through to
//! that same close path, so one underlying failure never double-arms it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::chunk;
use crate::client::{Command, Event, ReadyState, SharedState};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{Forwarder, HttpPost};
use crate::queue::OfflineQueue;
use crate::state::{Machine, Phase, RetryDecision};
use crate::transport::{Incoming, Transport, TransportResult};

/// What woke the driver loop.
enum Wake {
    Cancelled,
    Command(Option<Command>),
    Incoming(TransportResult<Option<Incoming>>),
    RetryTick,
    PingTick,
    ForwardFailure(Option<String>),
}

pub(crate) struct Driver<T: Transport> {
    url: Url,
    config: ClientConfig,
    transport: T,
    machine: Machine,
    queue: OfflineQueue,
    forwarder: Forwarder,
    forward_rx: mpsc::Receiver<String>,
    shared: Arc<SharedState>,
    event_tx: mpsc::Sender<Event>,
    cmd_rx: mpsc::Receiver<Command>,
    cancel: CancellationToken,
    retry: Option<Interval>,
    ping: Option<Interval>,
}

impl<T: Transport> Driver<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        url: Url,
        config: ClientConfig,
        transport: T,
        http_post: Arc<dyn HttpPost>,
        shared: Arc<SharedState>,
        event_tx: mpsc::Sender<Event>,
        cmd_rx: mpsc::Receiver<Command>,
        cancel: CancellationToken,
    ) -> Self {
        let (forwarder, forward_rx) =
            Forwarder::new(http_post, config.forward.clone().unwrap_or_default());
        Driver {
            url,
            config,
            transport,
            machine: Machine::new(),
            queue: OfflineQueue::new(),
            forwarder,
            forward_rx,
            shared,
            event_tx,
            cmd_rx,
            cancel,
            retry: None,
            ping: None,
        }
    }

    pub(crate) async fn run(mut self) {
        self.try_connect().await;

        loop {
            let open = self.machine.phase() == Phase::Open;
            let retry_armed = self.retry.is_some();
            let ping_armed = self.ping.is_some() && open;

            let wake = tokio::select! {
                _ = self.cancel.cancelled() => Wake::Cancelled,
                cmd = self.cmd_rx.recv() => Wake::Command(cmd),
                incoming = self.transport.recv(), if open => Wake::Incoming(incoming),
                _ = tick(self.retry.as_mut()), if retry_armed => Wake::RetryTick,
                _ = tick(self.ping.as_mut()), if ping_armed => Wake::PingTick,
                report = self.forward_rx.recv() => Wake::ForwardFailure(report),
            };

            match wake {
                Wake::Cancelled | Wake::Command(None) => {
                    self.teardown().await;
                    return;
                }
                Wake::Command(Some(cmd)) => self.handle_command(cmd).await,
                Wake::Incoming(incoming) => self.handle_incoming(incoming).await,
                Wake::RetryTick => self.on_retry_tick().await,
                Wake::PingTick => {
                    if let Err(e) = self.transport.ping().await {
                        self.fail(Error::Transport(e)).await;
                    }
                }
                Wake::ForwardFailure(Some(report)) => {
                    self.fail(Error::Forwarding(report)).await;
                }
                Wake::ForwardFailure(None) => {}
            }
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Send(payload) => self.handle_send(payload).await,
            Command::Reconnect => {
                if matches!(self.machine.phase(), Phase::Uninitialized | Phase::Closed) {
                    self.machine.reset_retries();
                    self.machine.disarm_retry();
                    self.retry = None;
                    self.try_connect().await;
                }
            }
            Command::Close { code, reason } => {
                // Caller-initiated cancellation: both timers die even when
                // no handle is live.
                self.machine.disarm_retry();
                self.retry = None;
                if self.transport.is_connected() {
                    self.disconnect(code, reason, true).await;
                }
            }
        }
    }

    /// Start a connection attempt, bounded by the connection timeout.
    async fn try_connect(&mut self) {
        if !self.machine.begin_connect() {
            debug!("connection attempt already in flight");
            return;
        }
        self.shared.set_ready(ReadyState::Connecting);
        self.shared.set_retries(self.machine.retries_since_open());
        debug!(url = %self.url, attempt = self.machine.retries_since_open(), "connecting");

        let attempt = tokio::time::timeout(
            self.config.connection_timeout,
            self.transport.connect(self.url.as_str()),
        );
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => return,
            outcome = attempt => outcome,
        };

        match outcome {
            Ok(Ok(())) => self.on_open().await,
            Ok(Err(e)) => self.attempt_failed(Error::Transport(e)).await,
            Err(_) => self.attempt_failed(Error::ConnectionTimeout).await,
        }
    }

    async fn on_open(&mut self) {
        self.machine.opened();
        // Retry schedule and attempt timeout die together on open
        self.retry = None;
        self.shared.set_ready(ReadyState::Open);
        self.shared.set_retries(0);

        if let Some(every) = self.config.ping_interval {
            let mut interval = tokio::time::interval_at(Instant::now() + every, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.ping = Some(interval);
        }

        info!(url = %self.url, "connected");
        self.flush_queue().await;

        // A failed flush drops the connection; Open would be stale then
        if self.machine.phase() == Phase::Open {
            let _ = self.event_tx.send(Event::Open).await;
        }
    }

    async fn attempt_failed(&mut self, err: Error) {
        self.machine.closed();
        self.shared.set_ready(ReadyState::Closed);
        debug!(error = %err, "connection attempt failed");
        self.arm_retry();
        let _ = self.event_tx.send(Event::Error(err)).await;
    }

    /// Runtime failure path: forward the error, drop the handle through the
    /// close path, then surface the error event.
    async fn fail(&mut self, err: Error) {
        warn!(error = %err, "connection failure");
        // A collector failure is itself unforwardable
        if !matches!(err, Error::Forwarding(_)) {
            self.forwarder.forward_error(&err.to_string());
        }
        if matches!(self.machine.phase(), Phase::Open | Phase::Closing) {
            self.disconnect(1006, err.to_string(), false).await;
        }
        let _ = self.event_tx.send(Event::Error(err)).await;
    }

    /// Request transport close, then run the close transition.
    async fn disconnect(&mut self, code: u16, reason: String, caller_initiated: bool) {
        if self.machine.phase() == Phase::Open {
            self.machine.begin_close();
            self.shared.set_ready(ReadyState::Closing);
        }
        if self.transport.is_connected() {
            let _ = self.transport.close(code, reason.clone()).await;
        }
        self.finish_close(code, reason, caller_initiated).await;
    }

    /// The close transition: emit the close event and, unless the caller
    /// asked for the close, arm the retry schedule. This is the only place
    /// reconnection is ever scheduled.
    async fn finish_close(&mut self, code: u16, reason: String, caller_initiated: bool) {
        if matches!(self.machine.phase(), Phase::Closed | Phase::Uninitialized) {
            return;
        }
        self.machine.closed();
        self.ping = None;
        self.shared.set_ready(ReadyState::Closed);
        info!(code, reason = %reason, "connection closed");
        let _ = self.event_tx.send(Event::Closed { code, reason }).await;

        if caller_initiated {
            self.machine.disarm_retry();
            self.retry = None;
        } else {
            self.arm_retry();
        }
    }

    fn arm_retry(&mut self) {
        if self
            .machine
            .arm_retry(self.config.disable_reconnect, self.config.max_retries)
        {
            let delay = self.config.reconnect_delay;
            let mut interval = tokio::time::interval_at(Instant::now() + delay, delay);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.retry = Some(interval);
            info!(delay_ms = delay.as_millis() as u64, "reconnect schedule armed");
        } else if !self.config.disable_reconnect && !self.machine.retry_armed() {
            warn!(
                attempts = self.machine.retries_since_open(),
                "retry budget spent, reconnection dormant"
            );
            self.retry = None;
        }
    }

    async fn on_retry_tick(&mut self) {
        match self.machine.retry_tick(self.config.max_retries) {
            RetryDecision::Attempt => self.try_connect().await,
            RetryDecision::Exhausted => {
                warn!("retry budget spent, reconnection dormant");
                self.retry = None;
            }
        }
    }

    async fn handle_send(&mut self, payload: serde_json::Value) {
        if self.machine.phase() != Phase::Open {
            if self.config.offline_queue {
                self.queue.push(payload);
                debug!(queued = self.queue.len(), "send while not open, queued");
            } else {
                debug!("send while not open, offline queue disabled, dropped");
            }
            return;
        }
        if let Err(e) = self.send_now(payload).await {
            self.fail(e).await;
        }
    }

    /// Serialize, encrypt, and write a payload through the framer.
    async fn send_now(&mut self, payload: serde_json::Value) -> Result<()> {
        let mut text = serde_json::to_string(&payload)?;
        if let Some(cipher) = &self.config.cipher {
            text = cipher.encrypt(&text);
        }

        match self.config.chunk_size_kb {
            Some(kb) if text.len() > kb * 1024 => {
                let envelopes = chunk::envelopes(&text, kb * 1024);
                debug!(frames = envelopes.len(), "sending chunked payload");
                for envelope in envelopes {
                    let frame = serde_json::to_string(&envelope)?;
                    self.transport.send_text(frame).await?;
                }
            }
            _ => self.transport.send_text(text).await?,
        }
        Ok(())
    }

    /// Flush the offline queue snapshot through the normal send path.
    ///
    /// On a mid-flush failure the unsent remainder (failed entry included,
    /// since its send did not go through) is re-queued for the next open.
    async fn flush_queue(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let snapshot = self.queue.take_snapshot();
        info!(count = snapshot.len(), "flushing offline queue");

        let mut entries = snapshot.into_iter();
        loop {
            let Some(entry) = entries.next() else { break };
            if let Err(err) = self.send_now(entry.payload.clone()).await {
                let mut remainder = vec![entry];
                remainder.extend(&mut entries);
                self.queue.requeue(remainder);
                self.fail(err).await;
                return;
            }
        }
    }

    async fn handle_incoming(&mut self, incoming: TransportResult<Option<Incoming>>) {
        match incoming {
            Ok(Some(Incoming::Text(raw))) => self.deliver(raw).await,
            Ok(Some(Incoming::Closed { code, reason })) => {
                self.finish_close(code, reason, false).await;
            }
            Ok(None) => {
                // 1006: abnormal closure, stream ended without a close frame
                self.finish_close(1006, "connection lost".to_string(), false).await;
            }
            Err(e) => self.fail(Error::Transport(e)).await,
        }
    }

    /// Decrypt, forward, deliver.
    async fn deliver(&mut self, raw: String) {
        let text = match &self.config.cipher {
            Some(cipher) => match cipher.decrypt(&raw) {
                Ok(text) => text,
                Err(e) => {
                    // Delivery of this frame is skipped; the connection stays up
                    warn!(error = %e, "dropping undecryptable frame");
                    let _ = self.event_tx.send(Event::Error(Error::Decryption(e))).await;
                    return;
                }
            },
            None => raw,
        };
        self.forwarder.forward_message(&text);
        let _ = self.event_tx.send(Event::Message(text)).await;
    }

    async fn teardown(&mut self) {
        self.retry = None;
        self.ping = None;
        if self.transport.is_connected() {
            let _ = self.transport.close(1000, "client dropped".to_string()).await;
        }
        debug!("driver stopped");
    }
}

/// Await the next tick of an optional interval; pending forever when absent.
async fn tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
