//! WebSocket connection lifecycle states.

/// WebSocket connection state.
///
/// ```text
/// Connecting ──► Open ──► Closing ──► Closed
///      │           │         │
///      └───────────┴─────────┴──────► Canceled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ConnectionState {
    /// Upgrade in progress. Messages may be enqueued but are not transmitted.
    #[default]
    Connecting,
    /// Accepted by the peer; messages flow in both directions.
    Open,
    /// One side started the close handshake. Already-queued messages are
    /// still transmitted, new ones are refused.
    Closing,
    /// Both close frames exchanged, queue flushed and stream released.
    Closed,
    /// Abruptly terminated; queued messages were discarded.
    Canceled,
}

impl ConnectionState {
    /// Returns `true` for `Closed` and `Canceled`.
    #[must_use]
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Canceled)
    }

    /// Check if new text or binary messages may be enqueued in this state.
    #[must_use]
    #[inline]
    pub const fn can_enqueue(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Open)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Open => write!(f, "Open"),
            ConnectionState::Closing => write!(f, "Closing"),
            ConnectionState::Closed => write!(f, "Closed"),
            ConnectionState::Canceled => write!(f, "Canceled"),
        }
    }
}

/// The two independent halves of the close handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloseFlags {
    /// Our close frame was written to the stream.
    pub local_close_sent: bool,
    /// The peer's close frame was read from the stream.
    pub peer_close_received: bool,
}

impl CloseFlags {
    /// Both close frames have been exchanged.
    #[must_use]
    #[inline]
    pub const fn both(&self) -> bool {
        self.local_close_sent && self.peer_close_received
    }
}
