//! WebSocket connection engine.
//!
//! A connection runs three tasks over a split stream:
//!
//! - **writer** drains the outgoing queue onto the write half
//! - **reader** reads frames, delivers messages and routes control frames
//! - **dispatcher** invokes the [`Listener`](crate::Listener) one event at a time
//!
//! All of them consult one lock-protected state machine.
//!
//! ## Connection Lifecycle
//!
//! 1. **Connecting** - Upgrade in progress; messages may already be queued
//! 2. **Open** - Messages flow in both directions
//! 3. **Closing** - One side sent its close frame; queued messages still drain
//! 4. **Closed** - Both close frames exchanged and the stream released
//!
//! Any non-terminal state may drop straight to **Canceled** on `cancel()`,
//! an I/O error, a protocol violation or a close handshake timeout.

mod dispatcher;
mod machine;
mod queue;
mod reader;
mod state;
mod websocket;
mod writer;

pub use queue::{OutgoingQueue, Rejected};
pub use state::{CloseFlags, ConnectionState};
pub use websocket::WebSocket;
