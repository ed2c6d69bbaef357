// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Login, the session cookie and the edition probe.
//!
//! The session owns the only mutable shared state of a client: the cookie and
//! the edition flag. Every request passes through [`Session::send`], which
//! holds the session lock for the whole retried exchange. Requests from one
//! client therefore go out one at a time in lock order, and no request can be
//! built with a cookie that a concurrent login is about to replace.

use std::fmt;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use eveng_http::{CallContext, Method};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::engine::{Engine, Exchange, ResponseMeta};
use crate::error::{Result, SdkError};
use crate::types::{AuthInfo, ServerStatus};

/// Server edition, detected once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edition {
    Community,
    Pro,
}

impl Edition {
    /// Marker the Pro edition carries in its version string.
    pub const PRO_MARKER: &'static str = "pro";

    /// Classify a server version string, e.g. `6.2.0-4-PRO`.
    pub fn from_version(version: &str) -> Self {
        if version.to_ascii_lowercase().contains(Self::PRO_MARKER) {
            Edition::Pro
        } else {
            Edition::Community
        }
    }

    pub fn is_pro(&self) -> bool {
        matches!(self, Edition::Pro)
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edition::Community => f.write_str("Community"),
            Edition::Pro => f.write_str("Pro"),
        }
    }
}

/// Login credentials.
#[derive(Clone)]
pub(crate) struct Credentials {
    pub username: String,
    pub password: String,
    pub html5: Option<bool>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html5: Option<&'static str>,
}

/// State guarded by the send lock.
#[derive(Default)]
struct Wire {
    /// Session token value, without the cookie name.
    token: Option<String>,
}

pub(crate) struct Session {
    engine: Engine,
    credentials: Credentials,
    cookie_name: String,
    wire: Mutex<Wire>,
    edition: OnceLock<Edition>,
}

impl Session {
    pub(crate) fn new(engine: Engine, credentials: Credentials, cookie_name: String) -> Self {
        Self {
            engine,
            credentials,
            cookie_name,
            wire: Mutex::new(Wire::default()),
            edition: OnceLock::new(),
        }
    }

    /// Acquire the send lock. A panic in a previous holder cannot leave the
    /// cookie half-written, so a poisoned lock is taken over as is.
    fn lock(&self) -> MutexGuard<'_, Wire> {
        self.wire.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn exchange(
        &self,
        wire: &Wire,
        ctx: &CallContext,
        method: Method,
        route: &str,
        body: Option<&Value>,
    ) -> Result<Exchange> {
        let body = body.map(serde_json::to_vec).transpose()?;
        let cookie = wire
            .token
            .as_ref()
            .map(|token| format!("{}={}", self.cookie_name, token));
        self.engine
            .execute(ctx, method, route, body.as_deref(), cookie.as_deref())
    }

    /// Send one request with the current session cookie.
    pub(crate) fn send(
        &self,
        ctx: &CallContext,
        method: Method,
        route: &str,
        body: Option<&Value>,
    ) -> Result<Exchange> {
        let wire = self.lock();
        debug!(%method, route, "sending request");
        self.exchange(&wire, ctx, method, route, body)
    }

    /// Log in, replace the session cookie, and detect the edition on first login.
    #[instrument(skip(self, ctx), fields(username = %self.credentials.username))]
    pub(crate) fn login(&self, ctx: &CallContext) -> Result<()> {
        let request = LoginRequest {
            username: &self.credentials.username,
            password: &self.credentials.password,
            html5: self.credentials.html5.map(|on| if on { "1" } else { "0" }),
        };
        let body = serde_json::to_value(&request)?;

        {
            let mut wire = self.lock();
            let exchange = self
                .exchange(&wire, ctx, Method::Post, "api/auth/login", Some(&body))
                .map_err(|err| match err {
                    SdkError::Application { message, .. }
                    | SdkError::ClientRejected { message, .. } => SdkError::Authentication(message),
                    other => other,
                })?;

            let token = session_token(&exchange.meta, &self.cookie_name).ok_or_else(|| {
                SdkError::Authentication(format!(
                    "login response did not set the {} cookie",
                    self.cookie_name
                ))
            })?;
            wire.token = Some(token);
        }
        info!("logged in");

        if self.edition.get().is_none() {
            let status = self.status(ctx)?;
            let edition = Edition::from_version(&status.version);
            if self.edition.set(edition).is_ok() {
                info!(%edition, version = %status.version, "detected server edition");
            }
        }
        Ok(())
    }

    /// True once a session cookie is held.
    pub(crate) fn is_authenticated(&self) -> bool {
        self.lock().token.is_some()
    }

    /// The detected edition, or `None` before the first login.
    pub(crate) fn edition(&self) -> Option<Edition> {
        self.edition.get().copied()
    }

    pub(crate) fn capability(&self) -> Result<Edition> {
        self.edition().ok_or(SdkError::NotAuthenticated)
    }

    /// `GET api/status`.
    pub(crate) fn status(&self, ctx: &CallContext) -> Result<ServerStatus> {
        self.send(ctx, Method::Get, "api/status", None)?
            .envelope
            .into_data()
    }

    /// `GET api/auth`.
    pub(crate) fn auth(&self, ctx: &CallContext) -> Result<AuthInfo> {
        self.send(ctx, Method::Get, "api/auth", None)?
            .envelope
            .into_data()
    }
}

/// Value of the named cookie among the response's `Set-Cookie` headers.
/// The server also sets auxiliary cookies, so position is meaningless.
fn session_token(meta: &ResponseMeta, cookie_name: &str) -> Option<String> {
    meta.set_cookies().find_map(|header| {
        let pair = header.split(';').next()?;
        let (name, value) = pair.split_once('=')?;
        (name.trim() == cookie_name && !value.trim().is_empty())
            .then(|| value.trim().trim_matches('"').to_string())
    })
}
