use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::codec::{FrameRead, FrameWrite};
use crate::config::Config;
use crate::connection::ConnectionState;
use crate::connection::machine::Core;
use crate::connection::dispatcher;
use crate::factory::{Request, Upgraded};
use crate::listener::Listener;
use crate::message::Message;

/// Handle to one WebSocket connection.
///
/// Cheap to clone; every clone refers to the same connection. All methods
/// are non-blocking and may be called from any thread, including from inside
/// a [`Listener`] callback. None of them report errors: outcomes are returned
/// as `bool`, and failures reach the listener through `on_failure`.
///
/// A tokio runtime must be running when a `WebSocket` is created.
///
/// ## Example
///
/// ```rust,ignore
/// use ws_engine::{Config, NoopListener, Request, WebSocket};
///
/// let ws = WebSocket::from_upgraded(Request::new("ws://peer"), upgraded, NoopListener, Config::default());
/// ws.send_text("hello");
/// ws.close(1000, "done");
/// ```
#[derive(Clone)]
pub struct WebSocket {
    core: Arc<Core>,
}

impl WebSocket {
    /// Create a handle in `Connecting` and start its dispatcher.
    pub(crate) fn connecting(request: Request, config: Config, listener: Arc<dyn Listener>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let ws = Self {
            core: Arc::new(Core::new(request, config, events_tx)),
        };
        tokio::spawn(dispatcher::run(ws.clone(), listener, events_rx));
        ws
    }

    /// Build a connection over an already-upgraded stream.
    ///
    /// The connection starts `Open`; `on_open` is the first callback.
    pub fn from_upgraded<R, W, L>(
        request: Request,
        upgraded: Upgraded<R, W>,
        listener: L,
        config: Config,
    ) -> Self
    where
        R: FrameRead,
        W: FrameWrite,
        L: Listener,
    {
        let ws = Self::connecting(request, config, Arc::new(listener));
        ws.core.start(upgraded);
        ws
    }

    pub(crate) fn core(&self) -> &Arc<Core> {
        &self.core
    }

    /// The request that initiated this connection.
    #[must_use]
    pub fn request(&self) -> &Request {
        self.core.request()
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.core.state()
    }

    /// Size in bytes of text and binary messages waiting to be transmitted.
    ///
    /// Excludes framing overhead and anything already handed to the stream.
    /// Returns `0` when nothing is queued. May stay nonzero after the
    /// connection was canceled, counting messages that were never sent.
    #[must_use]
    pub fn queue_size(&self) -> usize {
        self.core.queue_size()
    }

    /// Enqueue a text message.
    ///
    /// Returns `false` if the connection is closing, closed or canceled. A
    /// message that would overflow the queue budget is rejected too, and
    /// starts a graceful shutdown with close code 1009.
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.core.enqueue_data(Message::text(text))
    }

    /// Enqueue a binary message. Same rules as [`send_text`](Self::send_text).
    pub fn send_binary(&self, data: impl Into<Bytes>) -> bool {
        self.core.enqueue_data(Message::binary(data))
    }

    /// Start a graceful shutdown.
    ///
    /// Already-queued messages are transmitted before the close frame; later
    /// sends are refused. `code` is an RFC 6455 status code or `0` for none,
    /// `reason` may be empty and is at most 123 bytes.
    ///
    /// Returns `true` only if this call initiated the shutdown. Returns
    /// `false` for an invalid code or reason, or if a close was already
    /// enqueued, or the connection is closed or canceled.
    pub fn close(&self, code: u16, reason: &str) -> bool {
        self.core.close(code, reason)
    }

    /// Release the connection immediately, discarding queued messages.
    ///
    /// Does not wait for the worker tasks. The stream halves are dropped
    /// rather than closed with a handshake. Once open, a cancel produces a
    /// single `on_failure` with [`Error::Canceled`](crate::Error::Canceled);
    /// while connecting it produces no callback at all. Calling it again,
    /// or after the connection ended, does nothing.
    pub fn cancel(&self) {
        self.core.cancel();
    }
}

impl std::fmt::Debug for WebSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocket")
            .field("url", &self.core.request().url())
            .field("state", &self.core.state())
            .field("queue_size", &self.core.queue_size())
            .finish()
    }
}
