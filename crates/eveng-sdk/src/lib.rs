// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! EVE-NG SDK
//!
//! Blocking client for the EVE-NG network emulator's REST API.
//!
//! The client logs in once, keeps the session cookie, and detects whether the
//! server runs the Community or the Pro edition. Every call goes through one
//! retrying request engine that unwraps the server's uniform JSON envelope.
//!
//! # Architecture
//!
//! - Path resolution: lab and folder locators are split lexically into a
//!   parent directory and a leaf ([`resolve`])
//! - Envelope decoding: `{status, code, message, data}` is classified as
//!   success or failure ([`Envelope`], [`InterfaceMap`])
//! - Retries: transient failures are retried with bounded exponential
//!   backoff ([`RetryPolicy`])
//! - Session: login, cookie and edition probe; calls from one client are sent
//!   one at a time
//! - Resources: [`LabService`], [`FolderService`], [`NodeService`],
//!   [`NetworkService`]
//!
//! # Example
//!
//! ```no_run
//! use eveng_sdk::{CallContext, EveClient, Lab, SdkConfig};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Appliances usually run with self-signed certificates
//! let config = SdkConfig::new("https://eve.example.net", "admin", "eve")
//!     .with_skip_cert_verification(true);
//!
//! // Log in and detect the edition
//! let client = EveClient::connect(config)?;
//! println!("Edition: {:?}", client.edition());
//!
//! // Every call takes a context for cancellation and deadlines
//! let ctx = CallContext::with_timeout(Duration::from_secs(30));
//!
//! let lab = Lab {
//!     description: "OSPF area 0".to_string(),
//!     ..Default::default()
//! };
//! client.labs().create(&ctx, "/training/ospf.unl", &lab)?;
//!
//! let nodes = client.nodes().list(&ctx, "/training/ospf.unl")?;
//! println!("{} nodes", nodes.len());
//!
//! // Community and Pro start labs differently; the client picks the route
//! client.nodes().start_all(&ctx, "/training/ospf.unl")?;
//! # Ok(())
//! # }
//! ```

mod api;
mod client;
mod config;
mod engine;
mod envelope;
mod error;
mod lenient;
mod path;
mod retry;
mod session;
mod types;

pub use api::{FolderService, LabService, NetworkService, NodeService};
pub use client::EveClient;
pub use config::{DEFAULT_CONFIG_SET, DEFAULT_SESSION_COOKIE, SdkConfig};
pub use engine::{Exchange, ResponseMeta};
pub use envelope::{Envelope, InterfaceMap, SUCCESS_STATUS, decode, decode_interface_list};
pub use error::{Result, SdkError};
pub use path::{LAB_EXTENSION, ResolvedPath, SEPARATOR, resolve};
pub use retry::RetryPolicy;
pub use session::Edition;
pub use types::{
    AuthInfo, Folder, FolderListing, Interface, InterfaceStyle, Lab, LabEntry, Network, Node,
    NodeInterfaces, ServerStatus,
};

pub use eveng_http::{
    CallContext, CancellationToken, HttpError, HttpRequest, HttpResponse, HttpTransport, Method,
    TlsVerification,
};
