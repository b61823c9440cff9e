//! Outgoing message types and close codes as defined in RFC 6455.

use bytes::Bytes;

use crate::config::MAX_CLOSE_REASON_LEN;
use crate::error::{Error, Result};

/// Close code reported when a close frame carried no status (RFC 6455 7.1.5).
pub const NO_STATUS_CODE: u16 = 1005;

/// WebSocket close status code per RFC 6455 Section 7.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum CloseCode {
    /// Normal closure (1000).
    #[default]
    Normal,
    /// Going away (1001).
    GoingAway,
    /// Protocol error (1002).
    ProtocolError,
    /// Unsupported data (1003).
    UnsupportedData,
    /// Invalid payload (1007), e.g. non-UTF-8 text.
    InvalidPayload,
    /// Policy violation (1008).
    PolicyViolation,
    /// Message too big (1009). Also sent when the outgoing queue overflows.
    MessageTooBig,
    /// Mandatory extension (1010).
    MandatoryExtension,
    /// Internal error (1011).
    InternalError,
    /// Any other code.
    Other(u16),
}

impl CloseCode {
    /// Create a `CloseCode` from its numeric value.
    #[must_use]
    pub const fn from_u16(code: u16) -> Self {
        match code {
            1000 => CloseCode::Normal,
            1001 => CloseCode::GoingAway,
            1002 => CloseCode::ProtocolError,
            1003 => CloseCode::UnsupportedData,
            1007 => CloseCode::InvalidPayload,
            1008 => CloseCode::PolicyViolation,
            1009 => CloseCode::MessageTooBig,
            1010 => CloseCode::MandatoryExtension,
            1011 => CloseCode::InternalError,
            other => CloseCode::Other(other),
        }
    }

    /// Get the numeric value of this close code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        match self {
            CloseCode::Normal => 1000,
            CloseCode::GoingAway => 1001,
            CloseCode::ProtocolError => 1002,
            CloseCode::UnsupportedData => 1003,
            CloseCode::InvalidPayload => 1007,
            CloseCode::PolicyViolation => 1008,
            CloseCode::MessageTooBig => 1009,
            CloseCode::MandatoryExtension => 1010,
            CloseCode::InternalError => 1011,
            CloseCode::Other(code) => *code,
        }
    }

    /// Check if this close code may be sent in a close frame.
    ///
    /// Sendable: 1000-1003, 1007-1014 and the application range 3000-4999.
    /// 1004-1006 and 1015 are reserved and never appear on the wire.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self.as_u16(), 1000..=1003 | 1007..=1014 | 3000..=4999)
    }
}

impl From<u16> for CloseCode {
    fn from(code: u16) -> Self {
        CloseCode::from_u16(code)
    }
}

/// Close frame containing status code and optional reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    /// The close status code.
    pub code: CloseCode,
    /// Human-readable reason for closing (UTF-8, max 123 bytes).
    pub reason: String,
}

impl CloseFrame {
    /// Create a new close frame with the given code and reason.
    #[must_use]
    pub fn new(code: CloseCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Build the close frame for an application `close(code, reason)` call.
    ///
    /// Code `0` means "no status" and produces an empty close frame, which
    /// cannot carry a reason.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCloseCode`] if the code is reserved or out of range
    /// - [`Error::CloseReasonTooLong`] if the reason exceeds 123 bytes
    pub fn validate(code: u16, reason: &str) -> Result<Option<Self>> {
        if reason.len() > MAX_CLOSE_REASON_LEN {
            return Err(Error::CloseReasonTooLong(reason.len()));
        }
        if code == 0 {
            if !reason.is_empty() {
                return Err(Error::InvalidCloseCode(0));
            }
            return Ok(None);
        }
        let code = CloseCode::from_u16(code);
        if !code.is_valid() {
            return Err(Error::InvalidCloseCode(code.as_u16()));
        }
        Ok(Some(Self::new(code, reason)))
    }
}

/// Code and reason as reported to listeners, `1005` standing in for "no status".
pub(crate) fn close_parts(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(frame) => (frame.code.as_u16(), frame.reason.clone()),
        None => (NO_STATUS_CODE, String::new()),
    }
}

/// A message accepted into the outgoing queue.
///
/// Immutable once enqueued. Only text and binary payloads count toward the
/// queue's byte budget.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Message {
    /// A text message (UTF-8 encoded).
    Text(String),
    /// A binary message.
    Binary(Bytes),
    /// A pong control frame, sent in answer to a received ping.
    Pong(Bytes),
    /// A close control frame. Always the last message accepted.
    Close(Option<CloseFrame>),
}

impl Message {
    /// Create a text message.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Message::Text(s.into())
    }

    /// Create a binary message.
    #[must_use]
    pub fn binary(data: impl Into<Bytes>) -> Self {
        Message::Binary(data.into())
    }

    /// Create a close message with status code and reason.
    #[must_use]
    pub fn close(code: CloseCode, reason: impl Into<String>) -> Self {
        Message::Close(Some(CloseFrame::new(code, reason)))
    }

    /// Returns `true` if this is a data message (text or binary).
    #[must_use]
    pub const fn is_data(&self) -> bool {
        matches!(self, Message::Text(_) | Message::Binary(_))
    }

    /// Returns `true` if this is a close message.
    #[must_use]
    pub const fn is_close(&self) -> bool {
        matches!(self, Message::Close(_))
    }

    /// Bytes this message charges against the queue budget.
    ///
    /// Control messages are exempt and report `0`.
    #[must_use]
    pub fn queued_size(&self) -> usize {
        match self {
            Message::Text(s) => s.len(),
            Message::Binary(data) => data.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_code_roundtrip_known_values() {
        for code in [1000, 1001, 1002, 1003, 1007, 1008, 1009, 1010, 1011] {
            assert_eq!(CloseCode::from_u16(code).as_u16(), code);
        }
        assert_eq!(CloseCode::from_u16(1009), CloseCode::MessageTooBig);
        assert_eq!(CloseCode::from(4000), CloseCode::Other(4000));
    }

    #[test]
    fn test_close_code_validity() {
        assert!(CloseCode::Normal.is_valid());
        assert!(CloseCode::MessageTooBig.is_valid());
        assert!(CloseCode::Other(1012).is_valid());
        assert!(CloseCode::Other(1014).is_valid());
        assert!(CloseCode::Other(3000).is_valid());
        assert!(CloseCode::Other(4999).is_valid());

        assert!(!CloseCode::Other(0).is_valid());
        assert!(!CloseCode::Other(999).is_valid());
        assert!(!CloseCode::Other(1004).is_valid());
        assert!(!CloseCode::Other(1005).is_valid());
        assert!(!CloseCode::Other(1006).is_valid());
        assert!(!CloseCode::Other(1015).is_valid());
        assert!(!CloseCode::Other(2999).is_valid());
        assert!(!CloseCode::Other(5000).is_valid());
    }

    #[test]
    fn test_validate_close_accepts_sendable_codes() {
        let frame = CloseFrame::validate(1000, "bye").unwrap();
        assert_eq!(frame, Some(CloseFrame::new(CloseCode::Normal, "bye")));

        let frame = CloseFrame::validate(4000, "").unwrap();
        assert_eq!(frame, Some(CloseFrame::new(CloseCode::Other(4000), "")));
    }

    #[test]
    fn test_validate_close_zero_means_no_status() {
        assert_eq!(CloseFrame::validate(0, "").unwrap(), None);
        assert_eq!(
            CloseFrame::validate(0, "reason"),
            Err(Error::InvalidCloseCode(0))
        );
    }

    #[test]
    fn test_validate_close_rejects_reserved() {
        assert_eq!(
            CloseFrame::validate(1005, ""),
            Err(Error::InvalidCloseCode(1005))
        );
        assert_eq!(
            CloseFrame::validate(1006, ""),
            Err(Error::InvalidCloseCode(1006))
        );
    }

    #[test]
    fn test_validate_close_reason_length() {
        let reason = "a".repeat(MAX_CLOSE_REASON_LEN);
        assert!(CloseFrame::validate(1000, &reason).is_ok());

        let reason = "a".repeat(MAX_CLOSE_REASON_LEN + 1);
        assert_eq!(
            CloseFrame::validate(1000, &reason),
            Err(Error::CloseReasonTooLong(124))
        );
    }

    #[test]
    fn test_close_parts() {
        let frame = CloseFrame::new(CloseCode::GoingAway, "later");
        assert_eq!(close_parts(Some(&frame)), (1001, "later".to_string()));
        assert_eq!(close_parts(None), (NO_STATUS_CODE, String::new()));
    }

    #[test]
    fn test_queued_size() {
        assert_eq!(Message::text("hi").queued_size(), 2);
        assert_eq!(Message::text("héllo").queued_size(), 6);
        assert_eq!(Message::binary(vec![1, 2, 3]).queued_size(), 3);
        assert_eq!(Message::Pong(Bytes::from_static(b"pong")).queued_size(), 0);
        assert_eq!(Message::close(CloseCode::Normal, "bye").queued_size(), 0);
    }

    #[test]
    fn test_message_kind() {
        assert!(Message::text("hello").is_data());
        assert!(Message::binary(vec![1]).is_data());
        assert!(!Message::Close(None).is_data());
        assert!(Message::Close(None).is_close());
        assert!(!Message::Pong(Bytes::new()).is_close());
    }
}
