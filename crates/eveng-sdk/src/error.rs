// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for eveng-sdk.

use eveng_http::HttpError;
use thiserror::Error;

use crate::session::Edition;

/// Result type using SdkError.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Errors that can occur when talking to an EVE-NG server.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Configuration error (missing or invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection, DNS, TLS or socket failure below HTTP.
    #[error("transport error after {attempts} attempt(s): {message}")]
    Transport { attempts: u32, message: String },

    /// The server answered with a non-success envelope.
    #[error("server error [{code}] (HTTP {http_status}): {message}")]
    Application {
        http_status: u16,
        code: i64,
        message: String,
    },

    /// The server rejected the request with an HTTP 4xx status.
    #[error("request rejected [{code}] (HTTP {http_status}): {message}")]
    ClientRejected {
        http_status: u16,
        code: i64,
        message: String,
    },

    /// The response body was not a valid envelope.
    #[error("undecodable response (HTTP {http_status} {status_text}): {reason}")]
    Decode {
        http_status: u16,
        status_text: String,
        reason: String,
    },

    /// The operation is not available on the connected edition.
    #[error("{operation} requires the {required} edition")]
    Capability {
        operation: &'static str,
        required: Edition,
    },

    /// Login was refused.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// An operation needed the session before login completed.
    #[error("not logged in")]
    NotAuthenticated,

    /// The call was cancelled through its context.
    #[error("request cancelled")]
    Cancelled,

    /// The call deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No interface with the given name on the node.
    #[error("interface not found: {0}")]
    InterfaceNotFound(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Unexpected response from server.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl SdkError {
    /// HTTP status of the response that produced this error, if one arrived.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            SdkError::Application { http_status, .. }
            | SdkError::ClientRejected { http_status, .. }
            | SdkError::Decode { http_status, .. } => Some(*http_status),
            _ => None,
        }
    }

    /// True for errors raised locally before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SdkError::Config(_)
                | SdkError::Capability { .. }
                | SdkError::NotAuthenticated
                | SdkError::InvalidInput(_)
        )
    }
}

impl From<HttpError> for SdkError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Cancelled => SdkError::Cancelled,
            HttpError::DeadlineExceeded => SdkError::DeadlineExceeded,
            HttpError::Tls(reason) => SdkError::Config(reason),
            other => SdkError::Transport {
                attempts: 1,
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}
