//! Configuration for WebSocket connections.

use std::time::Duration;

/// Default ceiling on queued-but-unsent text and binary bytes (16 MiB).
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 16 * 1024 * 1024;

/// Default bound on the close handshake once it has started.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum close reason length in bytes (125 byte control payload minus the code).
pub const MAX_CLOSE_REASON_LEN: usize = 123;

/// WebSocket connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Byte budget for the outgoing queue.
    ///
    /// Counts text and binary payloads that were accepted but not yet handed
    /// to the writer. A send that would exceed it is rejected and starts a
    /// graceful shutdown with close code 1009.
    ///
    /// Default: 16 MiB
    pub max_queue_size: usize,

    /// Graceful-shutdown timer.
    ///
    /// Armed when the peer's close frame arrives or the local close frame is
    /// written. If the handshake has not completed when it fires, the
    /// connection is canceled.
    ///
    /// Default: 60 seconds
    pub close_timeout: Duration,

    /// Echo the peer's close frame after `on_closing` returns.
    ///
    /// When disabled, the application is expected to call `close()` from
    /// `on_closing`; otherwise the first timer expiry enqueues the echo.
    ///
    /// Default: true
    pub auto_close_reply: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            auto_close_reply: true,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the outgoing queue byte budget.
    #[must_use]
    pub const fn with_max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = size;
        self
    }

    /// Set the graceful-shutdown timeout.
    #[must_use]
    pub const fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Enable or disable the automatic close reply.
    #[must_use]
    pub const fn with_auto_close_reply(mut self, enabled: bool) -> Self {
        self.auto_close_reply = enabled;
        self
    }
}
