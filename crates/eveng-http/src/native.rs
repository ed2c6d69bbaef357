// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Native transport backed by `ureq`.
//!
//! ureq performs blocking socket I/O that cannot be interrupted from outside,
//! so each exchange runs on a short-lived worker thread while the calling
//! thread watches its [`CallContext`]. When the context gives up, the caller
//! returns immediately and the worker is recorded as a straggler: the next
//! exchange waits for it to finish first, so two requests from one transport
//! are never on the wire at the same time.

use std::io::Read;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, trace};

use crate::context::{CallContext, POLL_INTERVAL};
use crate::error::HttpError;
use crate::request::{HttpRequest, HttpResponse, HttpTransport};
use crate::tls::{self, TlsVerification};

/// Configuration for [`UreqTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Server certificate policy.
    pub tls: TlsVerification,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// TCP connect timeout. `None` leaves it to the OS.
    pub connect_timeout: Option<Duration>,
    /// Upper bound for a whole exchange, applied in addition to the call deadline.
    pub request_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsVerification::Enabled,
            user_agent: concat!("eveng-http/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: None,
            request_timeout: None,
        }
    }
}

/// Blocking HTTP transport using a pooled `ureq::Agent`.
pub struct UreqTransport {
    agent: ureq::Agent,
    request_timeout: Option<Duration>,
    straggler: Mutex<Option<Receiver<()>>>,
}

impl UreqTransport {
    pub fn new(config: TransportConfig) -> Result<Self, HttpError> {
        let tls_config = tls::client_config(config.tls)?;

        let mut builder = ureq::AgentBuilder::new()
            .tls_config(tls_config)
            .user_agent(&config.user_agent);
        if let Some(timeout) = config.connect_timeout {
            builder = builder.timeout_connect(timeout);
        }

        Ok(Self {
            agent: builder.build(),
            request_timeout: config.request_timeout,
            straggler: Mutex::new(None),
        })
    }

    /// Wait for an abandoned exchange to leave the wire.
    fn drain_straggler(&self, ctx: &CallContext) -> Result<(), HttpError> {
        let mut slot = self.straggler.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(done) = slot.take() else {
            return Ok(());
        };

        debug!("waiting for abandoned request to finish");
        loop {
            match done.recv_timeout(POLL_INTERVAL) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return Ok(()),
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(interrupt) = ctx.check() {
                        *slot = Some(done);
                        return Err(interrupt);
                    }
                }
            }
        }
    }

    fn effective_timeout(&self, ctx: &CallContext) -> Option<Duration> {
        match (ctx.remaining(), self.request_timeout) {
            (Some(left), Some(limit)) => Some(left.min(limit)),
            (left, limit) => left.or(limit),
        }
    }
}

impl HttpTransport for UreqTransport {
    fn execute(&self, request: HttpRequest, ctx: &CallContext) -> Result<HttpResponse, HttpError> {
        ctx.check()?;
        self.drain_straggler(ctx)?;

        let mut call = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }
        if let Some(timeout) = self.effective_timeout(ctx) {
            call = call.timeout(timeout);
        }

        let (result_tx, result_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let body = request.body;

        trace!(method = %request.method, url = %request.url, "dispatching request");
        std::thread::Builder::new()
            .name("eveng-http".to_string())
            .spawn(move || {
                let _ = result_tx.send(perform(call, body));
                drop(done_tx);
            })
            .map_err(|e| HttpError::Transport(format!("failed to spawn request worker: {}", e)))?;

        loop {
            match result_rx.recv_timeout(POLL_INTERVAL) {
                Ok(Err(HttpError::Transport(reason))) => {
                    // ureq reports its own timeout as a transport failure
                    ctx.check()?;
                    return Err(HttpError::Transport(reason));
                }
                Ok(result) => return result,
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(interrupt) = ctx.check() {
                        *self.straggler.lock().unwrap_or_else(PoisonError::into_inner) =
                            Some(done_rx);
                        return Err(interrupt);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(HttpError::Transport(
                        "request worker exited without a response".to_string(),
                    ));
                }
            }
        }
    }
}

fn perform(call: ureq::Request, body: Option<Vec<u8>>) -> Result<HttpResponse, HttpError> {
    let outcome = match body {
        Some(bytes) => call.send_bytes(&bytes),
        None => call.call(),
    };

    let response = match outcome {
        Ok(response) => response,
        // 4xx/5xx still carry an envelope worth decoding
        Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(transport)) => {
            return Err(HttpError::Transport(transport.to_string()));
        }
    };

    let status = response.status();
    let status_text = response.status_text().to_string();
    let mut names = response.headers_names();
    names.sort();
    names.dedup();
    let mut headers = Vec::new();
    for name in names {
        for value in response.all(&name) {
            headers.push((name.clone(), value.to_string()));
        }
    }

    let mut body = Vec::new();
    response.into_reader().read_to_end(&mut body)?;

    Ok(HttpResponse {
        status,
        status_text,
        headers,
        body,
    })
}
