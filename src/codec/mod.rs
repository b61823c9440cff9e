//! Frame codec collaborator.
//!
//! The engine never touches bytes on the wire. It talks to a stream that has
//! already been split into a read half ([`FrameRead`]) and a write half
//! ([`FrameWrite`]); each half is owned by exactly one task, so the halves
//! need no locking.
//!
//! [`memory::pair`] provides an in-process implementation that connects two
//! endpoints back to back.

pub mod memory;

use std::future::Future;

use bytes::Bytes;

use crate::error::Result;
use crate::message::{CloseFrame, Message};

/// A decoded unit read off the stream.
///
/// Text payloads are handed over as raw bytes; the reader validates UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete text message, not yet validated.
    Text(Vec<u8>),
    /// A complete binary message.
    Binary(Bytes),
    /// A ping control frame.
    Ping(Bytes),
    /// A pong control frame.
    Pong(Bytes),
    /// A close control frame; `None` when it carried no status code.
    Close(Option<CloseFrame>),
}

impl From<Message> for Frame {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(s) => Frame::Text(s.into_bytes()),
            Message::Binary(data) => Frame::Binary(data),
            Message::Pong(data) => Frame::Pong(data),
            Message::Close(frame) => Frame::Close(frame),
        }
    }
}

/// Read half of an upgraded stream.
///
/// Dropping the read half must release it: the connection drops both halves
/// on cancel without calling [`FrameWrite::close_stream`].
pub trait FrameRead: Send + 'static {
    /// Read the next decoded unit.
    ///
    /// Returns `Ok(None)` at end of input.
    fn read_frame(&mut self) -> impl Future<Output = Result<Option<Frame>>> + Send;
}

/// Write half of an upgraded stream.
///
/// Dropping the write half must shut the outgoing direction down, the same
/// as [`close_stream`](FrameWrite::close_stream). Halves that share one socket
/// should close it once both are dropped.
pub trait FrameWrite: Send + 'static {
    /// Encode and write one message, flushing it to the stream.
    fn write_frame(&mut self, message: &Message) -> impl Future<Output = Result<()>> + Send;

    /// Shut down the outgoing direction so the peer observes end of input.
    fn close_stream(&mut self) -> impl Future<Output = Result<()>> + Send;
}
