// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Blocking HTTP transport for the EVE-NG client.
//!
//! This crate is the only place that touches sockets. It provides:
//! - [`HttpTransport`]: the seam the session engine sends through
//! - [`UreqTransport`]: the native implementation (ureq + rustls)
//! - [`CallContext`]: per-call cancellation and deadlines
//! - [`TlsVerification`]: the explicit switch for self-signed appliances

pub mod context;
mod error;
mod native;
mod request;
pub mod tls;

pub use context::CallContext;
pub use error::HttpError;
pub use native::{TransportConfig, UreqTransport};
pub use request::{HttpRequest, HttpResponse, HttpTransport, Method, header_values};
pub use tls::TlsVerification;
pub use tokio_util::sync::CancellationToken;
