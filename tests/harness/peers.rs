//! Stream fixtures: in-memory peers, stalled and failing writers, a
//! controllable upgrader.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Semaphore, mpsc, oneshot};
use ws_engine::codec::memory::{self, Endpoint, MemoryReader, MemoryWriter};
use ws_engine::{
    Config, Error, FrameWrite, Message, Request, Response, Result, UpgradeFailure, Upgraded,
    Upgrader, WebSocket,
};

use super::{Events, Recorder};

/// Wrap an endpoint as an upgraded stream with a `101` response.
pub fn upgraded<W>(reader: MemoryReader, writer: W) -> Upgraded<MemoryReader, W> {
    Upgraded {
        reader,
        writer,
        response: Response::new(101),
    }
}

/// An open connection plus the scripted peer on the other end.
pub fn open(config: Config) -> (WebSocket, Events, Endpoint) {
    let (local, peer) = memory::pair(16);
    let (recorder, events) = Recorder::new();
    let ws = WebSocket::from_upgraded(
        Request::new("ws://peer.test"),
        upgraded(local.reader, local.writer),
        recorder,
        config,
    );
    (ws, events, peer)
}

/// Two engines talking to each other.
pub fn open_pair(config: Config) -> ((WebSocket, Events), (WebSocket, Events)) {
    let (a, b) = memory::pair(16);
    let (a_recorder, a_events) = Recorder::new();
    let (b_recorder, b_events) = Recorder::new();
    let a_ws = WebSocket::from_upgraded(
        Request::new("ws://b.test"),
        upgraded(a.reader, a.writer),
        a_recorder,
        config.clone(),
    );
    let b_ws = WebSocket::from_upgraded(
        Request::new("ws://a.test"),
        upgraded(b.reader, b.writer),
        b_recorder,
        config,
    );
    ((a_ws, a_events), (b_ws, b_events))
}

/// Controls a [`GatedWriter`].
#[derive(Clone)]
pub struct Gate {
    permits: Arc<Semaphore>,
}

impl Gate {
    /// Let `n` more writes through.
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }
}

/// Write half that reports each write attempt and then blocks until the
/// [`Gate`] lets it through.
pub struct GatedWriter {
    inner: MemoryWriter,
    permits: Arc<Semaphore>,
    entered: mpsc::UnboundedSender<()>,
}

impl GatedWriter {
    pub fn new(inner: MemoryWriter) -> (Self, Gate, mpsc::UnboundedReceiver<()>) {
        let permits = Arc::new(Semaphore::new(0));
        let (entered, entered_rx) = mpsc::unbounded_channel();
        (
            Self {
                inner,
                permits: Arc::clone(&permits),
                entered,
            },
            Gate { permits },
            entered_rx,
        )
    }
}

impl FrameWrite for GatedWriter {
    async fn write_frame(&mut self, message: &Message) -> Result<()> {
        let _ = self.entered.send(());
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::Io("gate closed".into()))?;
        permit.forget();
        self.inner.write_frame(message).await
    }

    async fn close_stream(&mut self) -> Result<()> {
        self.inner.close_stream().await
    }
}

/// Write half whose every write fails.
pub struct FailingWriter;

impl FrameWrite for FailingWriter {
    async fn write_frame(&mut self, _message: &Message) -> Result<()> {
        Err(Error::Io("broken pipe".into()))
    }

    async fn close_stream(&mut self) -> Result<()> {
        Ok(())
    }
}

type Outcome = std::result::Result<Upgraded<MemoryReader, MemoryWriter>, UpgradeFailure>;

/// Upgrader whose single upgrade completes when the test says so.
pub struct PendingUpgrader {
    outcome: Mutex<Option<oneshot::Receiver<Outcome>>>,
}

impl PendingUpgrader {
    pub fn new() -> (Self, oneshot::Sender<Outcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                outcome: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

impl Upgrader for PendingUpgrader {
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    async fn upgrade(&self, _request: &Request) -> Outcome {
        let rx = self.outcome.lock().take();
        match rx {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(Error::Upgrade("upgrade abandoned".into()).into())),
            None => Err(Error::Upgrade("upgrader already used".into()).into()),
        }
    }
}
