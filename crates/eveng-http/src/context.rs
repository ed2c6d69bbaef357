// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-call cancellation and deadline context.
//!
//! Every blocking operation takes a [`CallContext`]. The context never starts
//! timers of its own: callers decide how long they are willing to wait, either
//! with a deadline or by cancelling a shared [`CancellationToken`] from another
//! thread.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::HttpError;

/// Granularity used when a blocking wait has to observe the cancellation token.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cancellation and deadline scope for a single client call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

impl CallContext {
    /// A context that never expires and cannot be cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline(Instant::now() + timeout)
    }

    /// A context bound to `token`.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self::background().cancellation(token)
    }

    /// Set the deadline.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach a cancellation token.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Time left before the deadline. `None` means unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// True once the token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    /// Fail if the context is cancelled or past its deadline.
    pub fn check(&self) -> Result<(), HttpError> {
        if self.is_cancelled() {
            return Err(HttpError::Cancelled);
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(HttpError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Sleep for `duration`, waking early if the context is interrupted.
    ///
    /// A sleep that would outlast the deadline returns `DeadlineExceeded`
    /// as soon as the deadline passes.
    pub fn sleep(&self, duration: Duration) -> Result<(), HttpError> {
        let wake = Instant::now() + duration;
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= wake {
                return Ok(());
            }
            let mut slice = wake - now;
            if self.cancel.is_some() {
                slice = slice.min(POLL_INTERVAL);
            }
            if let Some(left) = self.remaining() {
                slice = slice.min(left.max(Duration::from_millis(1)));
            }
            std::thread::sleep(slice);
        }
    }
}
