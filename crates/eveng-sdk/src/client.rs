// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! EveClient: the entry point for talking to an EVE-NG server.

use std::sync::Arc;

use eveng_http::{
    CallContext, HttpTransport, Method, TlsVerification, TransportConfig, UreqTransport,
};
use serde_json::Value;
use tracing::{info, instrument};

use crate::api::{FolderService, LabService, NetworkService, NodeService};
use crate::config::SdkConfig;
use crate::engine::{Engine, Exchange};
use crate::error::{Result, SdkError};
use crate::path::{self, ResolvedPath};
use crate::session::{Credentials, Edition, Session};
use crate::types::{AuthInfo, ServerStatus};

/// Client for one EVE-NG server and one user session.
///
/// The client is `Send + Sync`; share it behind an `Arc` to issue calls from
/// several threads. Calls are sent one at a time in the order they acquire
/// the session, so concurrent callers queue instead of racing a login.
///
/// Resource operations live on the service handles returned by
/// [`labs`](Self::labs), [`folders`](Self::folders), [`nodes`](Self::nodes)
/// and [`networks`](Self::networks).
pub struct EveClient {
    session: Session,
    config: SdkConfig,
}

impl EveClient {
    /// Create a client with the native transport. Does not log in.
    pub fn new(config: SdkConfig) -> Result<Self> {
        let tls = if config.skip_cert_verification {
            TlsVerification::Disabled
        } else {
            TlsVerification::Enabled
        };
        let transport = UreqTransport::new(TransportConfig {
            tls,
            user_agent: config.user_agent.clone(),
            connect_timeout: config.connect_timeout,
            request_timeout: config.request_timeout,
        })?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a caller-supplied transport. Does not log in.
    pub fn with_transport(mut config: SdkConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;

        let engine = Engine::new(transport, config.base_url.clone(), config.retry.clone());
        let credentials = Credentials {
            username: config.username.clone(),
            password: config.password.clone(),
            html5: config.html5,
        };
        let session = Session::new(engine, credentials, config.session_cookie_name.clone());

        Ok(Self { session, config })
    }

    /// Create a client from environment variables. Does not log in.
    pub fn from_env() -> Result<Self> {
        Self::new(SdkConfig::from_env()?)
    }

    /// Create a client and log in.
    #[instrument(skip(config), fields(base_url = %config.base_url))]
    pub fn connect(config: SdkConfig) -> Result<Self> {
        let client = Self::new(config)?;
        client.login(&CallContext::background())?;
        info!(edition = ?client.edition(), "connected to EVE-NG");
        Ok(client)
    }

    /// Log in and replace the session cookie.
    ///
    /// The first successful login also probes `api/status` and fixes the
    /// server edition for the lifetime of the client.
    pub fn login(&self, ctx: &CallContext) -> Result<()> {
        self.session.login(ctx)
    }

    /// True once a session cookie is held.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// The detected edition, or `None` before the first login.
    pub fn edition(&self) -> Option<Edition> {
        self.session.edition()
    }

    /// The detected edition; [`SdkError::NotAuthenticated`] before login.
    pub fn capability(&self) -> Result<Edition> {
        self.session.capability()
    }

    /// The logged-in user.
    pub fn auth(&self, ctx: &CallContext) -> Result<AuthInfo> {
        self.session.auth(ctx)
    }

    /// Server version and resource counters.
    pub fn status(&self, ctx: &CallContext) -> Result<ServerStatus> {
        self.session.status(ctx)
    }

    /// Send a raw request with the session cookie and return the decoded
    /// exchange. `route` is relative to the base URL, e.g. `api/status`.
    pub fn send(
        &self,
        ctx: &CallContext,
        method: Method,
        route: &str,
        body: Option<&Value>,
    ) -> Result<Exchange> {
        self.session.send(ctx, method, route, body)
    }

    /// Split a locator into parent directory and leaf. No I/O.
    pub fn resolve_path(&self, locator: &str) -> ResolvedPath {
        path::resolve(locator)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn labs(&self) -> LabService<'_> {
        LabService::new(self)
    }

    pub fn folders(&self) -> FolderService<'_> {
        FolderService::new(self)
    }

    pub fn nodes(&self) -> NodeService<'_> {
        NodeService::new(self)
    }

    pub fn networks(&self) -> NetworkService<'_> {
        NetworkService::new(self)
    }

    /// Fail with a capability error, before any I/O, unless the server is Pro.
    pub(crate) fn require_pro(&self, operation: &'static str) -> Result<()> {
        match self.capability()? {
            Edition::Pro => Ok(()),
            Edition::Community => Err(SdkError::Capability {
                operation,
                required: Edition::Pro,
            }),
        }
    }
}
