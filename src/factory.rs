//! Factory collaborator: turns a request into a running connection.
//!
//! The HTTP upgrade itself (request construction, TLS, DNS, pooling) belongs
//! to an [`Upgrader`]. The factory only drives the connection lifecycle
//! around it.

use std::future::Future;
use std::sync::Arc;

use crate::codec::{FrameRead, FrameWrite};
use crate::config::Config;
use crate::connection::WebSocket;
use crate::error::Error;
use crate::listener::Listener;

/// Descriptor of the request that initiates a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: String,
    headers: Vec<(String, String)>,
}

impl Request {
    /// Create a request for the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// All headers, in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with this name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Descriptor of the upgrade response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, in order.
    pub headers: Vec<(String, String)>,
}

impl Response {
    /// Create a response with the given status and no headers.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header with this name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// A successfully upgraded stream, split into halves.
#[derive(Debug)]
pub struct Upgraded<R, W> {
    /// Read half, owned by the reader task.
    pub reader: R,
    /// Write half, owned by the writer task.
    pub writer: W,
    /// The upgrade response, passed to `on_open`.
    pub response: Response,
}

/// A failed upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeFailure {
    /// What went wrong.
    pub error: Error,
    /// The HTTP response, if the server sent one.
    pub response: Option<Response>,
}

impl UpgradeFailure {
    /// Create a failure carrying the server's response.
    #[must_use]
    pub fn with_response(error: Error, response: Response) -> Self {
        Self {
            error,
            response: Some(response),
        }
    }
}

impl From<Error> for UpgradeFailure {
    fn from(error: Error) -> Self {
        Self {
            error,
            response: None,
        }
    }
}

/// Performs the HTTP upgrade for a request.
pub trait Upgrader: Send + Sync + 'static {
    /// Read half produced by a successful upgrade.
    type Reader: FrameRead;
    /// Write half produced by a successful upgrade.
    type Writer: FrameWrite;

    /// Upgrade `request` into a duplex frame stream.
    fn upgrade(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Upgraded<Self::Reader, Self::Writer>, UpgradeFailure>> + Send;
}

/// Creates connections through an [`Upgrader`].
///
/// ## Example
///
/// ```rust,ignore
/// use ws_engine::{Config, Request, WebSocketFactory};
///
/// let factory = WebSocketFactory::new(my_upgrader).with_config(Config::default());
/// let ws = factory.new_web_socket(Request::new("wss://example.com/feed"), MyListener);
/// ws.send_text("subscribe");
/// ```
#[derive(Debug)]
pub struct WebSocketFactory<U> {
    upgrader: Arc<U>,
    config: Config,
}

impl<U> Clone for WebSocketFactory<U> {
    fn clone(&self) -> Self {
        Self {
            upgrader: Arc::clone(&self.upgrader),
            config: self.config.clone(),
        }
    }
}

impl<U: Upgrader> WebSocketFactory<U> {
    /// Create a factory with the default configuration.
    #[must_use]
    pub fn new(upgrader: U) -> Self {
        Self {
            upgrader: Arc::new(upgrader),
            config: Config::default(),
        }
    }

    /// Use this configuration for every connection created afterwards.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The configuration applied to new connections.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start connecting and return immediately.
    ///
    /// The handle begins in `Connecting`; messages sent now are transmitted
    /// once the upgrade succeeds. If the upgrade fails, the listener's
    /// `on_failure` is the only callback and receives the server's response
    /// when there is one. Must be called within a tokio runtime.
    pub fn new_web_socket<L: Listener>(&self, request: Request, listener: L) -> WebSocket {
        let ws = WebSocket::connecting(request, self.config.clone(), Arc::new(listener));
        let core = Arc::clone(ws.core());
        let upgrader = Arc::clone(&self.upgrader);
        let handle = tokio::spawn(async move {
            match upgrader.upgrade(core.request()).await {
                Ok(upgraded) => core.start(upgraded),
                Err(failure) => core.fail_upgrade(failure.error, failure.response),
            }
        });
        ws.core().set_connect_task(handle);
        ws
    }
}
