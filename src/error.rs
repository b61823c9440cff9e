//! Error types for the WebSocket connection engine.
//!
//! Errors never cross the public `send`/`close`/`cancel` boundary. They are
//! either folded into a `bool` return or delivered once through
//! [`Listener::on_failure`](crate::Listener::on_failure).

use std::time::Duration;

use thiserror::Error;

/// Result type alias for engine and codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can terminate a WebSocket connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Protocol violation detected on the incoming stream.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Invalid UTF-8 in a text message.
    #[error("Invalid UTF-8 in text message")]
    InvalidUtf8,

    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(String),

    /// The stream ended before the close handshake completed.
    ///
    /// Carries a close code when the stream reported one.
    #[error("Connection closed unexpectedly: {0:?}")]
    ConnectionClosed(Option<u16>),

    /// The application canceled the connection.
    #[error("Canceled")]
    Canceled,

    /// The close handshake did not complete within the configured timeout.
    #[error("Close handshake timed out after {0:?}")]
    CloseTimeout(Duration),

    /// The HTTP upgrade failed.
    #[error("Upgrade failed: {0}")]
    Upgrade(String),

    /// Close code that may not be sent in a close frame.
    #[error("Invalid close code: {0}")]
    InvalidCloseCode(u16),

    /// Close reason longer than a control frame can carry.
    #[error("Close reason too long: {0} bytes (max: 123)")]
    CloseReasonTooLong(usize),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(_: std::string::FromUtf8Error) -> Self {
        Error::InvalidUtf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::CloseTimeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "Close handshake timed out after 60s");

        let err = Error::ConnectionClosed(Some(1000));
        assert_eq!(err.to_string(), "Connection closed unexpectedly: Some(1000)");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let ws_err: Error = io_err.into();
        assert!(matches!(ws_err, Error::Io(ref msg) if msg == "pipe broken"));
    }

    #[test]
    fn test_error_from_utf8() {
        let err: Error = String::from_utf8(vec![0xff, 0xfe]).unwrap_err().into();
        assert_eq!(err, Error::InvalidUtf8);
    }

    #[test]
    fn test_error_clone() {
        let err = Error::Canceled;
        let cloned = err.clone();
        assert_eq!(err, cloned);
    }
}
