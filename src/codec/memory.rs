//! In-process duplex stream.
//!
//! Two endpoints joined by bounded channels: whatever one writer sends, the
//! other reader decodes. A full channel blocks the writer, which is how
//! stream backpressure shows up here. Dropping or closing a writer ends the
//! opposite reader's input.

use tokio::sync::mpsc;

use crate::codec::{Frame, FrameRead, FrameWrite};
use crate::error::{Error, Result};
use crate::message::Message;

/// One side of a [`pair`].
#[derive(Debug)]
pub struct Endpoint {
    /// Frames written by the other side.
    pub reader: MemoryReader,
    /// Frames destined for the other side.
    pub writer: MemoryWriter,
}

/// Create two connected endpoints.
///
/// `capacity` is the number of frames each direction buffers before a write
/// blocks. Zero is treated as one.
#[must_use]
pub fn pair(capacity: usize) -> (Endpoint, Endpoint) {
    let (a_tx, b_rx) = mpsc::channel(capacity.max(1));
    let (b_tx, a_rx) = mpsc::channel(capacity.max(1));
    (
        Endpoint {
            reader: MemoryReader { rx: a_rx },
            writer: MemoryWriter { tx: Some(a_tx) },
        },
        Endpoint {
            reader: MemoryReader { rx: b_rx },
            writer: MemoryWriter { tx: Some(b_tx) },
        },
    )
}

/// Read half of an in-memory stream.
#[derive(Debug)]
pub struct MemoryReader {
    rx: mpsc::Receiver<Frame>,
}

impl FrameRead for MemoryReader {
    async fn read_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.rx.recv().await)
    }
}

/// Write half of an in-memory stream.
#[derive(Debug)]
pub struct MemoryWriter {
    tx: Option<mpsc::Sender<Frame>>,
}

impl MemoryWriter {
    /// Send an already-decoded unit to the peer.
    ///
    /// Lets a scripted peer deliver frames an engine would never produce,
    /// such as text that is not valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if this half was closed or the peer's reader is gone.
    pub async fn send_frame(&mut self, frame: Frame) -> Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| Error::Io("stream closed".into()))?;
        tx.send(frame)
            .await
            .map_err(|_| Error::Io("connection reset by peer".into()))
    }

    /// Returns `true` once [`close_stream`](FrameWrite::close_stream) was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }
}

impl FrameWrite for MemoryWriter {
    async fn write_frame(&mut self, message: &Message) -> Result<()> {
        self.send_frame(Frame::from(message.clone())).await
    }

    async fn close_stream(&mut self) -> Result<()> {
        self.tx = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_carries_frames_both_ways() {
        let (mut a, mut b) = pair(4);

        a.writer.write_frame(&Message::text("ping")).await.unwrap();
        b.writer.write_frame(&Message::binary(vec![7])).await.unwrap();

        assert_eq!(
            b.reader.read_frame().await.unwrap(),
            Some(Frame::Text(b"ping".to_vec()))
        );
        assert_eq!(
            a.reader.read_frame().await.unwrap(),
            Some(Frame::Binary(vec![7].into()))
        );
    }

    #[tokio::test]
    async fn test_close_stream_ends_peer_input() {
        let (mut a, mut b) = pair(4);

        a.writer.write_frame(&Message::text("last")).await.unwrap();
        a.writer.close_stream().await.unwrap();
        assert!(a.writer.is_closed());

        assert!(b.reader.read_frame().await.unwrap().is_some());
        assert_eq!(b.reader.read_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_after_close_fails() {
        let (mut a, _b) = pair(4);
        a.writer.close_stream().await.unwrap();

        let result = a.writer.write_frame(&Message::text("late")).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_write_to_dropped_reader_fails() {
        let (mut a, b) = pair(4);
        drop(b);

        let result = a.writer.write_frame(&Message::text("lost")).await;
        assert_eq!(result, Err(Error::Io("connection reset by peer".into())));
    }
}
