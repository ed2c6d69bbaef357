// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Retry budget, backoff and failure classification.

use std::time::Duration;

use eveng_http::{HttpError, HttpResponse};

use crate::envelope::Envelope;
use crate::error::SdkError;

/// Bounded exponential backoff.
///
/// Attempt `n` (1-based, counting the first try) is followed by a wait of
/// `min_wait * 2^(n-1)`, capped at `max_wait`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included. Must be at least 1.
    pub max_attempts: u32,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_wait: Duration::from_millis(100),
            max_wait: Duration::from_millis(400),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_wait: Duration, max_wait: Duration) -> Self {
        Self {
            max_attempts,
            min_wait,
            max_wait,
        }
    }

    /// A single attempt, never retried.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Wait after the given failed attempt (1-indexed).
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.min_wait
            .checked_mul(multiplier)
            .unwrap_or(self.max_wait)
            .min(self.max_wait)
    }
}

/// What one exchange produced.
#[derive(Debug)]
pub(crate) enum Attempt {
    /// Nothing usable arrived.
    Transport(HttpError),
    /// A response arrived; the envelope may not have decoded.
    Received {
        response: HttpResponse,
        envelope: Result<Envelope, SdkError>,
    },
}

impl Attempt {
    /// Whether another attempt may change the outcome.
    ///
    /// - transport failures are retried, context interrupts are not
    /// - HTTP 4xx is terminal
    /// - HTTP 5xx is retried unless the envelope is a full success
    /// - any other status is retried when the envelope's status marker is
    ///   not `success`; the server wraps transient internal errors that way
    ///
    /// The last rule also retries deterministic failures such as "lab already
    /// exists". That matches the server's historical client behavior and is
    /// kept for compatibility.
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            Attempt::Transport(err) => !err.is_interrupt(),
            Attempt::Received { response, .. } if response.is_client_error() => false,
            Attempt::Received {
                response,
                envelope: Ok(envelope),
            } => {
                if response.is_server_error() {
                    !envelope.is_success()
                } else {
                    !envelope.status_ok()
                }
            }
            Attempt::Received {
                response,
                envelope: Err(_),
            } => response.is_server_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::SUCCESS_STATUS;

    fn received(status: u16, envelope: Option<(&str, i64)>) -> Attempt {
        let envelope = match envelope {
            Some((marker, code)) => Ok(Envelope {
                status: marker.to_string(),
                code,
                ..Default::default()
            }),
            None => Err(SdkError::Decode {
                http_status: status,
                status_text: String::new(),
                reason: "not json".to_string(),
            }),
        };
        Attempt::Received {
            response: HttpResponse::new(status, ""),
            envelope,
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.min_wait, Duration::from_millis(100));
        assert_eq!(policy.max_wait, Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after_attempt(3), Duration::from_millis(400));
        assert_eq!(policy.delay_after_attempt(4), Duration::from_millis(400));
        assert_eq!(policy.delay_after_attempt(40), Duration::from_millis(400));
    }

    #[test]
    fn test_no_retry_policy() {
        assert_eq!(RetryPolicy::no_retry().max_attempts, 1);
    }

    #[test]
    fn test_transport_errors_retry() {
        assert!(Attempt::Transport(HttpError::Transport("reset".into())).is_retryable());
        assert!(!Attempt::Transport(HttpError::Cancelled).is_retryable());
        assert!(!Attempt::Transport(HttpError::DeadlineExceeded).is_retryable());
    }

    #[test]
    fn test_client_errors_are_terminal() {
        assert!(!received(400, Some(("fail", 400))).is_retryable());
        assert!(!received(404, Some(("fail", 404))).is_retryable());
        assert!(!received(412, None).is_retryable());
    }

    #[test]
    fn test_server_errors_retry_unless_success() {
        assert!(received(500, Some(("fail", 500))).is_retryable());
        assert!(received(503, None).is_retryable());
        assert!(received(502, Some((SUCCESS_STATUS, 500))).is_retryable());
        assert!(!received(500, Some((SUCCESS_STATUS, 200))).is_retryable());
    }

    #[test]
    fn test_failure_marker_on_200_retries() {
        assert!(received(200, Some(("fail", 200))).is_retryable());
        assert!(received(200, Some(("error", 500))).is_retryable());
    }

    #[test]
    fn test_success_marker_with_bad_code_is_terminal() {
        assert!(!received(200, Some((SUCCESS_STATUS, 404))).is_retryable());
    }

    #[test]
    fn test_success_and_undecodable_2xx_are_final() {
        assert!(!received(200, Some((SUCCESS_STATUS, 200))).is_retryable());
        assert!(!received(200, None).is_retryable());
    }
}
