//! Connection state machine shared by the handle and the worker tasks.
//!
//! Every mutation of lifecycle state, close flags and the outgoing queue
//! happens under one lock. Events for the listener are pushed onto the
//! dispatcher channel while that lock is held, so their order matches the
//! order of the transitions. A terminal transition drops the channel sender,
//! which suppresses every later event.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::futures::Notified;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::codec::{FrameRead, FrameWrite};
use crate::config::Config;
use crate::connection::dispatcher::Event;
use crate::connection::queue::{OutgoingQueue, Rejected};
use crate::connection::state::{CloseFlags, ConnectionState};
use crate::connection::{reader, writer};
use crate::error::Error;
use crate::factory::{Request, Response, Upgraded};
use crate::message::{CloseCode, CloseFrame, Message, NO_STATUS_CODE, close_parts};

/// What the writer task should do next.
pub(crate) enum WriterStep {
    /// Write this message.
    Write(Message),
    /// Both close frames are exchanged and the queue is empty.
    Shutdown,
    /// Nothing queued; wait for a wake-up.
    Wait,
    /// The connection reached a terminal state.
    Stop,
}

#[derive(Default)]
struct Tasks {
    connect: Option<JoinHandle<()>>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
    timer: Option<JoinHandle<()>>,
}

impl Tasks {
    fn abort_all(&mut self) {
        let handles = [
            self.connect.take(),
            self.reader.take(),
            self.writer.take(),
            self.timer.take(),
        ];
        for handle in handles.into_iter().flatten() {
            handle.abort();
        }
    }
}

struct Inner {
    state: ConnectionState,
    queue: OutgoingQueue,
    flags: CloseFlags,
    peer_close: Option<CloseFrame>,
    /// Code and reason of whichever side closed first, reported by `on_closed`.
    close_report: Option<(u16, String)>,
    writer_done: bool,
    reader_done: bool,
    timer_rearmed: bool,
    events: Option<mpsc::UnboundedSender<Event>>,
    tasks: Tasks,
}

impl Inner {
    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    fn emit_terminal(&mut self, event: Event) {
        if let Some(events) = self.events.take() {
            let _ = events.send(event);
        }
    }
}

pub(crate) struct Core {
    inner: Mutex<Inner>,
    writer_wake: Notify,
    config: Config,
    request: Request,
}

impl Core {
    pub(crate) fn new(
        request: Request,
        config: Config,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: ConnectionState::Connecting,
                queue: OutgoingQueue::new(config.max_queue_size),
                flags: CloseFlags::default(),
                peer_close: None,
                close_report: None,
                writer_done: false,
                reader_done: false,
                timer_rearmed: false,
                events: Some(events),
                tasks: Tasks::default(),
            }),
            writer_wake: Notify::new(),
            config,
            request,
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn request(&self) -> &Request {
        &self.request
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    pub(crate) fn queue_size(&self) -> usize {
        self.inner.lock().queue.byte_size()
    }

    // ---------------------------------------------------------------------
    // Application API
    // ---------------------------------------------------------------------

    /// Enqueue a text or binary message.
    pub(crate) fn enqueue_data(&self, message: Message) -> bool {
        let mut inner = self.inner.lock();
        if !inner.state.can_enqueue() {
            return false;
        }
        match inner.queue.push(message) {
            Ok(()) => {
                self.writer_wake.notify_one();
                true
            }
            Err(Rejected::Overflow { size, max }) => {
                warn!(
                    size,
                    max,
                    queued = inner.queue.byte_size(),
                    "Outgoing queue full, starting graceful shutdown"
                );
                let frame = CloseFrame::new(CloseCode::MessageTooBig, "");
                self.enqueue_close(&mut inner, Some(frame));
                false
            }
            Err(Rejected::Closed) => false,
        }
    }

    pub(crate) fn close(&self, code: u16, reason: &str) -> bool {
        let frame = match CloseFrame::validate(code, reason) {
            Ok(frame) => frame,
            Err(error) => {
                debug!(%error, "Rejected close request");
                return false;
            }
        };
        let mut inner = self.inner.lock();
        self.enqueue_close(&mut inner, frame)
    }

    pub(crate) fn cancel(&self) {
        let mut inner = self.inner.lock();
        let state = inner.state;
        match state {
            state if state.is_terminal() => {}
            ConnectionState::Connecting => {
                debug!("Canceled before open");
                inner.state = ConnectionState::Canceled;
                inner.queue.abandon();
                inner.tasks.abort_all();
                inner.events = None;
            }
            _ => self.fail_locked(&mut inner, Error::Canceled, None),
        }
    }

    // ---------------------------------------------------------------------
    // Upgrade
    // ---------------------------------------------------------------------

    pub(crate) fn set_connect_task(&self, handle: JoinHandle<()>) {
        let mut inner = self.inner.lock();
        if inner.state == ConnectionState::Connecting {
            inner.tasks.connect = Some(handle);
        } else if inner.state == ConnectionState::Canceled {
            handle.abort();
        }
    }

    /// Enter `Open` (or `Closing` if a close was enqueued while connecting)
    /// and spawn the reader and writer over the upgraded halves.
    pub(crate) fn start<R: FrameRead, W: FrameWrite>(self: &Arc<Self>, upgraded: Upgraded<R, W>) {
        let Upgraded {
            reader,
            writer,
            response,
        } = upgraded;
        let mut inner = self.inner.lock();
        if inner.state != ConnectionState::Connecting {
            debug!(state = %inner.state, "Upgrade finished after cancel, dropping stream");
            return;
        }
        inner.state = if inner.queue.close_accepted() {
            ConnectionState::Closing
        } else {
            ConnectionState::Open
        };
        debug!(status = response.status, state = %inner.state, "Connection open");
        inner.emit(Event::Open(response));
        inner.tasks.connect = None;
        inner.tasks.writer = Some(tokio::spawn(writer::run(Arc::clone(self), writer)));
        inner.tasks.reader = Some(tokio::spawn(reader::run(Arc::clone(self), reader)));
        self.writer_wake.notify_one();
    }

    pub(crate) fn fail_upgrade(&self, error: Error, response: Option<Response>) {
        let mut inner = self.inner.lock();
        if inner.state == ConnectionState::Connecting {
            self.fail_locked(&mut inner, error, response);
        }
    }

    // ---------------------------------------------------------------------
    // Writer side
    // ---------------------------------------------------------------------

    pub(crate) fn next_outgoing(&self) -> WriterStep {
        let mut inner = self.inner.lock();
        if inner.state.is_terminal() {
            return WriterStep::Stop;
        }
        if let Some(message) = inner.queue.pop_front() {
            return WriterStep::Write(message);
        }
        if inner.flags.both() {
            WriterStep::Shutdown
        } else {
            WriterStep::Wait
        }
    }

    pub(crate) fn wait_for_work(&self) -> Notified<'_> {
        self.writer_wake.notified()
    }

    pub(crate) fn on_close_written(self: &Arc<Self>) {
        let mut inner = self.inner.lock();
        if inner.state.is_terminal() {
            return;
        }
        inner.flags.local_close_sent = true;
        trace!("Close frame written");
        self.arm_timer(&mut inner);
    }

    pub(crate) fn on_writer_finished(&self) {
        let mut inner = self.inner.lock();
        inner.writer_done = true;
        self.maybe_finish(&mut inner);
    }

    // ---------------------------------------------------------------------
    // Reader side
    // ---------------------------------------------------------------------

    /// Forward a received message to the listener.
    pub(crate) fn deliver(&self, event: Event) {
        let inner = self.inner.lock();
        if !inner.state.is_terminal() {
            inner.emit(event);
        }
    }

    pub(crate) fn enqueue_pong(&self, payload: Bytes) {
        let mut inner = self.inner.lock();
        if inner.state.is_terminal() {
            return;
        }
        if inner.queue.push(Message::Pong(payload)).is_ok() {
            self.writer_wake.notify_one();
        }
    }

    pub(crate) fn on_peer_close(self: &Arc<Self>, frame: Option<CloseFrame>) {
        let mut inner = self.inner.lock();
        if inner.state.is_terminal() {
            return;
        }
        let (code, reason) = close_parts(frame.as_ref());
        debug!(code, reason = %reason, "Peer close received");
        inner.flags.peer_close_received = true;
        inner.peer_close = frame;
        if inner.close_report.is_none() {
            inner.close_report = Some((code, reason.clone()));
        }
        if inner.state == ConnectionState::Open {
            inner.state = ConnectionState::Closing;
        }
        inner.emit(Event::Closing { code, reason });
        self.arm_timer(&mut inner);
        self.writer_wake.notify_one();
    }

    /// The read half is finished. After the peer's close this completes the
    /// reader's share of the handshake; the writer may still be draining.
    pub(crate) fn on_end_of_stream(&self) {
        let mut inner = self.inner.lock();
        if inner.state.is_terminal() {
            return;
        }
        if inner.flags.peer_close_received {
            trace!(
                local_close_sent = inner.flags.local_close_sent,
                "End of stream after peer close"
            );
            inner.reader_done = true;
            self.maybe_finish(&mut inner);
        } else {
            self.fail_locked(&mut inner, Error::ConnectionClosed(None), None);
        }
    }

    /// Echo the peer's close frame unless a close was already enqueued.
    pub(crate) fn reply_to_peer_close(&self) {
        let mut inner = self.inner.lock();
        if inner.state.is_terminal() || inner.queue.close_accepted() {
            return;
        }
        let frame = echo_close(inner.peer_close.as_ref());
        trace!("Replying to peer close");
        self.enqueue_close(&mut inner, frame);
    }

    // ---------------------------------------------------------------------
    // Failure and completion
    // ---------------------------------------------------------------------

    pub(crate) fn fail(&self, error: Error) {
        let mut inner = self.inner.lock();
        self.fail_locked(&mut inner, error, None);
    }

    fn fail_locked(&self, inner: &mut Inner, error: Error, response: Option<Response>) {
        if inner.state.is_terminal() {
            return;
        }
        debug!(state = %inner.state, %error, "Connection canceled");
        inner.state = ConnectionState::Canceled;
        inner.queue.abandon();
        inner.tasks.abort_all();
        inner.emit_terminal(Event::Failure { error, response });
    }

    fn maybe_finish(&self, inner: &mut Inner) {
        if inner.state.is_terminal()
            || !inner.flags.both()
            || !inner.writer_done
            || !inner.reader_done
        {
            return;
        }
        inner.state = ConnectionState::Closed;
        if let Some(timer) = inner.tasks.timer.take() {
            timer.abort();
        }
        let (code, reason) = inner
            .close_report
            .take()
            .unwrap_or((NO_STATUS_CODE, String::new()));
        debug!(code, reason = %reason, "Connection closed");
        inner.emit_terminal(Event::Closed { code, reason });
    }

    fn enqueue_close(&self, inner: &mut Inner, frame: Option<CloseFrame>) -> bool {
        if inner.state.is_terminal() {
            return false;
        }
        if inner.queue.push(Message::Close(frame.clone())).is_err() {
            return false;
        }
        if inner.close_report.is_none() {
            inner.close_report = Some(close_parts(frame.as_ref()));
        }
        if inner.state == ConnectionState::Open {
            inner.state = ConnectionState::Closing;
        }
        debug!(state = %inner.state, "Close enqueued");
        self.writer_wake.notify_one();
        true
    }

    // ---------------------------------------------------------------------
    // Graceful-shutdown timer
    // ---------------------------------------------------------------------

    fn arm_timer(self: &Arc<Self>, inner: &mut Inner) {
        if inner.tasks.timer.is_some() {
            return;
        }
        let core = Arc::clone(self);
        let timeout = self.config.close_timeout;
        inner.tasks.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            core.on_close_timeout();
        }));
    }

    fn on_close_timeout(self: &Arc<Self>) {
        let mut inner = self.inner.lock();
        if inner.state.is_terminal() {
            return;
        }
        if !inner.queue.close_accepted() && !inner.timer_rearmed {
            debug!("Close timer expired before local close, replying to peer");
            inner.timer_rearmed = true;
            let frame = echo_close(inner.peer_close.as_ref());
            self.enqueue_close(&mut inner, frame);
            inner.tasks.timer = None;
            self.arm_timer(&mut inner);
            return;
        }
        warn!(timeout = ?self.config.close_timeout, "Close handshake timed out");
        self.fail_locked(&mut inner, Error::CloseTimeout(self.config.close_timeout), None);
    }
}

/// The close frame sent back in answer to the peer's.
fn echo_close(peer: Option<&CloseFrame>) -> Option<CloseFrame> {
    peer.map(|frame| {
        let code = if frame.code.is_valid() {
            frame.code
        } else {
            CloseCode::Normal
        };
        CloseFrame::new(code, "")
    })
}
