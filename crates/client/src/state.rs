// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection lifecycle state machine.
//!
//! The machine owns two guards the rest of the crate relies on:
//!
//! - `begin_connect` refuses while an attempt is in flight or a handle is
//!   live, so at most one transport handle ever exists;
//! - `arm_retry` refuses while a retry schedule is already armed, so at most
//!   one reconnect timer ever runs.
//!
//! The transition methods here are the only code paths that mutate the
//! phase, the retry counter, or the armed flag.

/// Lifecycle phase of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, no attempt made yet.
    Uninitialized,
    /// A connection attempt is in flight.
    Connecting,
    /// The transport handle is live.
    Open,
    /// A close has been requested on the live handle.
    Closing,
    /// No live handle. Re-enterable via reconnect unless dormant.
    Closed,
}

/// What a retry tick should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Budget remains: attempt to connect again.
    Attempt,
    /// Budget exhausted: cancel the schedule permanently.
    Exhausted,
}

/// The connection state machine.
#[derive(Debug)]
pub struct Machine {
    phase: Phase,
    /// Attempts since the last successful open. Reset to 0 exactly on the
    /// transition into `Open`.
    retries_since_open: u32,
    /// Whether a retry schedule is currently armed.
    retry_armed: bool,
}

impl Machine {
    pub fn new() -> Self {
        Machine {
            phase: Phase::Uninitialized,
            retries_since_open: 0,
            retry_armed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn retries_since_open(&self) -> u32 {
        self.retries_since_open
    }

    pub fn retry_armed(&self) -> bool {
        self.retry_armed
    }

    /// Start a connection attempt, counting it against the retry budget.
    ///
    /// Returns false while connecting, open, or closing: a second attempt
    /// must never start while one is in flight or a handle is live.
    pub fn begin_connect(&mut self) -> bool {
        match self.phase {
            Phase::Uninitialized | Phase::Closed => {
                self.phase = Phase::Connecting;
                self.retries_since_open = self.retries_since_open.saturating_add(1);
                true
            }
            Phase::Connecting | Phase::Open | Phase::Closing => false,
        }
    }

    /// The transport handle opened.
    pub fn opened(&mut self) {
        self.phase = Phase::Open;
        self.retries_since_open = 0;
        self.retry_armed = false;
    }

    /// A close was requested on the live handle.
    pub fn begin_close(&mut self) {
        if self.phase == Phase::Open {
            self.phase = Phase::Closing;
        }
    }

    /// The handle is gone (closed, errored, or the attempt failed).
    pub fn closed(&mut self) {
        self.phase = Phase::Closed;
    }

    /// Arm the retry schedule if eligible.
    ///
    /// Refuses when reconnection is disabled, when a schedule is already
    /// armed, or when the budget is already spent (dormant until a manual
    /// reconnect).
    pub fn arm_retry(&mut self, disabled: bool, max_retries: u32) -> bool {
        if disabled || self.retry_armed || self.retries_since_open >= max_retries {
            return false;
        }
        self.retry_armed = true;
        true
    }

    /// Consult the budget on a retry tick.
    pub fn retry_tick(&mut self, max_retries: u32) -> RetryDecision {
        if self.retries_since_open < max_retries {
            RetryDecision::Attempt
        } else {
            self.retry_armed = false;
            RetryDecision::Exhausted
        }
    }

    /// Cancel the retry schedule (caller-initiated close).
    pub fn disarm_retry(&mut self) {
        self.retry_armed = false;
    }

    /// Reset the budget for a manual reconnect after dormancy.
    pub fn reset_retries(&mut self) {
        self.retries_since_open = 0;
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
