//! Recording listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::timeout;
use ws_engine::{Error, Listener, Response, WebSocket};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// A listener callback, as observed by the test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Open(u16),
    Text(String),
    Binary(Vec<u8>),
    Closing(u16, String),
    Closed(u16, String),
    Failure(Error, Option<u16>),
}

type Hook = Box<dyn Fn(&WebSocket, &Recorded) + Send + Sync>;

/// Listener that records callbacks and counts overlapping invocations.
pub struct Recorder {
    tx: mpsc::UnboundedSender<Recorded>,
    in_flight: Arc<AtomicUsize>,
    overlaps: Arc<AtomicUsize>,
    hook: Option<Hook>,
}

/// Receiving side of a [`Recorder`].
pub struct Events {
    rx: mpsc::UnboundedReceiver<Recorded>,
    overlaps: Arc<AtomicUsize>,
}

impl Recorder {
    pub fn new() -> (Self, Events) {
        let (tx, rx) = mpsc::unbounded_channel();
        let overlaps = Arc::new(AtomicUsize::new(0));
        (
            Self {
                tx,
                in_flight: Arc::new(AtomicUsize::new(0)),
                overlaps: Arc::clone(&overlaps),
                hook: None,
            },
            Events { rx, overlaps },
        )
    }

    /// Run `hook` inside every callback, after recording it.
    pub fn with_hook(
        mut self,
        hook: impl Fn(&WebSocket, &Recorded) + Send + Sync + 'static,
    ) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    fn record(&self, ws: &WebSocket, event: Recorded) {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let _ = self.tx.send(event.clone());
        if let Some(hook) = &self.hook {
            hook(ws, &event);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Listener for Recorder {
    fn on_open(&self, ws: &WebSocket, response: &Response) {
        self.record(ws, Recorded::Open(response.status));
    }

    fn on_text(&self, ws: &WebSocket, text: String) {
        self.record(ws, Recorded::Text(text));
    }

    fn on_binary(&self, ws: &WebSocket, data: Bytes) {
        self.record(ws, Recorded::Binary(data.to_vec()));
    }

    fn on_closing(&self, ws: &WebSocket, code: u16, reason: &str) {
        self.record(ws, Recorded::Closing(code, reason.to_string()));
    }

    fn on_closed(&self, ws: &WebSocket, code: u16, reason: &str) {
        self.record(ws, Recorded::Closed(code, reason.to_string()));
    }

    fn on_failure(&self, ws: &WebSocket, error: &Error, response: Option<&Response>) {
        self.record(
            ws,
            Recorded::Failure(error.clone(), response.map(|r| r.status)),
        );
    }
}

impl Events {
    /// Wait for the next callback.
    pub async fn next(&mut self) -> Recorded {
        timeout(EVENT_TIMEOUT, self.rx.recv())
            .await
            .expect("timed out waiting for listener event")
            .expect("listener dropped before the expected event")
    }

    /// Wait until the dispatcher has dropped the listener, asserting that no
    /// further callbacks arrive.
    pub async fn assert_finished(&mut self) {
        let next = timeout(EVENT_TIMEOUT, self.rx.recv())
            .await
            .expect("dispatcher did not finish");
        assert_eq!(next, None, "unexpected callback after the last event");
    }

    /// Number of callbacks that started while another one was running.
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }
}
