//! Application callbacks for connection events.

use bytes::Bytes;

use crate::connection::WebSocket;
use crate::error::Error;
use crate::factory::Response;

/// Receives lifecycle and message events for one connection.
///
/// Every method has an empty default body; implement only the events you
/// care about. Callbacks never overlap: they are delivered one at a time, in
/// order, from a single dispatcher task. `on_open` comes before any message or
/// `on_closing`, and exactly one of `on_closed` / `on_failure` ends the
/// sequence once the connection has left `Connecting`.
///
/// Callbacks may call back into the [`WebSocket`] (send, close, cancel).
/// They run on the runtime, so long blocking work delays later events.
pub trait Listener: Send + Sync + 'static {
    /// The peer accepted the upgrade; messages may now flow.
    fn on_open(&self, _ws: &WebSocket, _response: &Response) {}

    /// A text message arrived.
    fn on_text(&self, _ws: &WebSocket, _text: String) {}

    /// A binary message arrived.
    fn on_binary(&self, _ws: &WebSocket, _data: Bytes) {}

    /// The peer sent its close frame; no more messages will arrive.
    fn on_closing(&self, _ws: &WebSocket, _code: u16, _reason: &str) {}

    /// Both sides closed and the stream was released.
    fn on_closed(&self, _ws: &WebSocket, _code: u16, _reason: &str) {}

    /// The connection failed or was canceled. Queued and in-flight messages
    /// may have been lost.
    fn on_failure(&self, _ws: &WebSocket, _error: &Error, _response: Option<&Response>) {}
}

/// A listener that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl Listener for NoopListener {}
