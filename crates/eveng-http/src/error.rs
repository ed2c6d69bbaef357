// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for eveng-http.

use thiserror::Error;

/// Errors raised below the HTTP layer.
///
/// An HTTP response with any status code is never an `HttpError`; status
/// classification belongs to the caller.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection, DNS, TLS handshake or socket failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// TLS client configuration could not be built.
    #[error("TLS configuration error: {0}")]
    Tls(String),

    /// The call was cancelled through its context.
    #[error("request cancelled")]
    Cancelled,

    /// The context deadline passed before the call completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl HttpError {
    /// True for failures produced by the caller's context rather than the network.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, HttpError::Cancelled | HttpError::DeadlineExceeded)
    }
}

impl From<rustls::Error> for HttpError {
    fn from(err: rustls::Error) -> Self {
        HttpError::Tls(err.to_string())
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Body(err.to_string())
    }
}
