// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request execution with retries.
//!
//! The engine turns one logical call into up to `max_attempts` HTTP exchanges
//! and folds the last one into an [`Exchange`] or an error. It holds no
//! session state; the caller passes the cookie in and serializes calls.

use std::sync::Arc;

use eveng_http::{CallContext, HttpRequest, HttpResponse, HttpTransport, Method};

use crate::envelope::{self, Envelope};
use crate::error::{Result, SdkError};
use crate::retry::{Attempt, RetryPolicy};

/// A successful call.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub envelope: Envelope,
    pub meta: ResponseMeta,
}

/// Transport-level details of the final response.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub http_status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    /// Exchanges made, first try included.
    pub attempts: u32,
}

impl ResponseMeta {
    /// Raw `Set-Cookie` header values, in received order.
    pub fn set_cookies(&self) -> impl Iterator<Item = &str> {
        eveng_http::header_values(&self.headers, "set-cookie")
    }
}

pub(crate) struct Engine {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    policy: RetryPolicy,
}

impl Engine {
    /// `base_url` must end with `/`.
    pub(crate) fn new(transport: Arc<dyn HttpTransport>, base_url: String, policy: RetryPolicy) -> Self {
        Self {
            transport,
            base_url,
            policy,
        }
    }

    pub(crate) fn url_for(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route.trim_start_matches('/'))
    }

    /// Run one logical call. `cookie` is the full `Cookie` header value.
    pub(crate) fn execute(
        &self,
        ctx: &CallContext,
        method: Method,
        route: &str,
        body: Option<&[u8]>,
        cookie: Option<&str>,
    ) -> Result<Exchange> {
        let url = self.url_for(route);
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let mut request = HttpRequest::new(method, url.as_str());
            if let Some(cookie) = cookie {
                request = request.with_header("Cookie", cookie);
            }
            if let Some(body) = body {
                request = request.with_json_body(body.to_vec());
            }

            let attempt = match self.transport.execute(request, ctx) {
                Ok(response) => {
                    let envelope =
                        envelope::decode(&response.body, response.status, &response.status_text);
                    Attempt::Received { response, envelope }
                }
                Err(err) => Attempt::Transport(err),
            };

            if attempts >= self.policy.max_attempts || !attempt.is_retryable() {
                return conclude(attempt, attempts);
            }

            ctx.sleep(self.policy.delay_after_attempt(attempts))?;
        }
    }
}

/// Fold the final attempt into the call result.
fn conclude(attempt: Attempt, attempts: u32) -> Result<Exchange> {
    let (response, envelope) = match attempt {
        Attempt::Transport(err) if err.is_interrupt() => return Err(err.into()),
        Attempt::Transport(err) => {
            return Err(SdkError::Transport {
                attempts,
                message: err.to_string(),
            });
        }
        Attempt::Received { response, envelope } => (response, envelope?),
    };

    if envelope.is_success() {
        return Ok(Exchange {
            meta: meta(response, attempts),
            envelope,
        });
    }

    let http_status = response.status;
    let Envelope { code, message, .. } = envelope;
    if response.is_client_error() {
        Err(SdkError::ClientRejected {
            http_status,
            code,
            message,
        })
    } else {
        Err(SdkError::Application {
            http_status,
            code,
            message,
        })
    }
}

fn meta(response: HttpResponse, attempts: u32) -> ResponseMeta {
    ResponseMeta {
        http_status: response.status,
        status_text: response.status_text,
        headers: response.headers,
        attempts,
    }
}
