// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the EVE-NG client.

use std::fmt;
use std::time::Duration;

use crate::error::{Result, SdkError};
use crate::retry::RetryPolicy;

/// Default name of the session cookie set by `api/auth/login`.
pub const DEFAULT_SESSION_COOKIE: &str = "unetlab_session";

/// Default Pro config-set identifier.
pub const DEFAULT_CONFIG_SET: &str = "default";

/// Configuration for [`EveClient`](crate::EveClient).
#[derive(Clone)]
pub struct SdkConfig {
    /// Server base URL, e.g. `https://eve.example.net/`.
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Ask the server for HTML5 (Guacamole) consoles at login.
    pub html5: Option<bool>,
    /// Accept any server certificate. Appliances commonly run with
    /// self-signed certificates; this must be enabled explicitly.
    pub skip_cert_verification: bool,
    pub retry: RetryPolicy,
    /// Name of the cookie carrying the session token.
    pub session_cookie_name: String,
    /// Config-set identifier sent with Pro startup-config requests.
    pub config_set_id: String,
    pub user_agent: String,
    /// TCP connect timeout. No timeout by default.
    pub connect_timeout: Option<Duration>,
    /// Per-exchange timeout. No timeout by default; callers bound calls with
    /// a [`CallContext`](crate::CallContext) deadline instead.
    pub request_timeout: Option<Duration>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            html5: None,
            skip_cert_verification: false,
            retry: RetryPolicy::default(),
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            config_set_id: DEFAULT_CONFIG_SET.to_string(),
            user_agent: concat!("eveng-sdk/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: None,
            request_timeout: None,
        }
    }
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("html5", &self.html5)
            .field("skip_cert_verification", &self.skip_cert_verification)
            .field("retry", &self.retry)
            .field("session_cookie_name", &self.session_cookie_name)
            .field("config_set_id", &self.config_set_id)
            .field("user_agent", &self.user_agent)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl SdkConfig {
    /// Create a configuration for the given server and credentials.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `EVE_HOST`: Server base URL (required)
    /// - `EVE_USER`: Username (required)
    /// - `EVE_PASSWORD`: Password (required)
    /// - `EVE_HTML5`: Request HTML5 consoles ("1"/"true" or "0"/"false")
    /// - `EVE_SKIP_CERT_VERIFICATION`: Accept any certificate (default: "false")
    /// - `EVE_RETRY_MAX`: Attempts per request (default: 5)
    /// - `EVE_RETRY_WAIT_MIN_MS`: Minimum backoff in milliseconds (default: 100)
    /// - `EVE_RETRY_WAIT_MAX_MS`: Maximum backoff in milliseconds (default: 400)
    /// - `EVE_SESSION_COOKIE`: Session cookie name (default: "unetlab_session")
    /// - `EVE_CONFIG_SET`: Pro config-set id (default: "default")
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            std::env::var(name).map_err(|_| SdkError::Config(format!("{} is not set", name)))
        };

        let mut config = Self::new(
            required("EVE_HOST")?,
            required("EVE_USER")?,
            required("EVE_PASSWORD")?,
        );

        if let Ok(value) = std::env::var("EVE_HTML5") {
            config.html5 = Some(parse_flag("EVE_HTML5", &value)?);
        }
        if let Ok(value) = std::env::var("EVE_SKIP_CERT_VERIFICATION") {
            config.skip_cert_verification = parse_flag("EVE_SKIP_CERT_VERIFICATION", &value)?;
        }
        if let Ok(value) = std::env::var("EVE_RETRY_MAX") {
            config.retry.max_attempts = value
                .parse()
                .map_err(|e| SdkError::Config(format!("invalid EVE_RETRY_MAX: {}", e)))?;
        }
        if let Ok(value) = std::env::var("EVE_RETRY_WAIT_MIN_MS") {
            config.retry.min_wait = parse_millis("EVE_RETRY_WAIT_MIN_MS", &value)?;
        }
        if let Ok(value) = std::env::var("EVE_RETRY_WAIT_MAX_MS") {
            config.retry.max_wait = parse_millis("EVE_RETRY_WAIT_MAX_MS", &value)?;
        }
        if let Ok(value) = std::env::var("EVE_SESSION_COOKIE") {
            config.session_cookie_name = value;
        }
        if let Ok(value) = std::env::var("EVE_CONFIG_SET") {
            config.config_set_id = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration and normalize the base URL to end with `/`.
    pub fn validate(&mut self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(SdkError::Config("base URL is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "base URL must start with http:// or https://: {}",
                url
            )));
        }
        let mut url = url.to_string();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;

        if self.retry.max_attempts == 0 {
            return Err(SdkError::Config(
                "retry budget must allow at least one attempt".to_string(),
            ));
        }
        if self.retry.min_wait > self.retry.max_wait {
            return Err(SdkError::Config(format!(
                "minimum backoff {:?} exceeds maximum {:?}",
                self.retry.min_wait, self.retry.max_wait
            )));
        }
        if self.session_cookie_name.is_empty() {
            return Err(SdkError::Config("session cookie name is empty".to_string()));
        }
        Ok(())
    }

    /// Request HTML5 consoles at login.
    pub fn with_html5(mut self, html5: bool) -> Self {
        self.html5 = Some(html5);
        self
    }

    /// Accept any server certificate.
    pub fn with_skip_cert_verification(mut self, skip: bool) -> Self {
        self.skip_cert_verification = skip;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the session cookie name.
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = name.into();
        self
    }

    /// Set the Pro config-set identifier.
    pub fn with_config_set_id(mut self, id: impl Into<String>) -> Self {
        self.config_set_id = id.into();
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the per-exchange timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(SdkError::Config(format!("invalid {}: {}", name, other))),
    }
}

fn parse_millis(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| SdkError::Config(format!("invalid {}: {}", name, e)))
}
