//! Outgoing message queue with a byte budget.

use std::collections::VecDeque;

use crate::message::Message;

/// Why [`OutgoingQueue::push`] refused a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// A close message was already accepted; nothing may follow it.
    Closed,
    /// Accepting the message would exceed the byte budget.
    Overflow {
        /// Bytes the message would have added.
        size: usize,
        /// Configured budget.
        max: usize,
    },
}

/// FIFO of messages waiting for the writer.
///
/// Only text and binary payloads are charged against the budget; control
/// messages are always admitted until a close message has been accepted.
#[derive(Debug)]
pub struct OutgoingQueue {
    messages: VecDeque<Message>,
    queued_bytes: usize,
    max_bytes: usize,
    close_accepted: bool,
}

impl OutgoingQueue {
    /// Create an empty queue with the given byte budget.
    #[must_use]
    pub fn new(max_bytes: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            queued_bytes: 0,
            max_bytes,
            close_accepted: false,
        }
    }

    /// Append a message.
    ///
    /// # Errors
    ///
    /// - [`Rejected::Closed`] if a close message was already accepted
    /// - [`Rejected::Overflow`] if a data message would push the queued bytes
    ///   past the budget
    pub fn push(&mut self, message: Message) -> Result<(), Rejected> {
        if self.close_accepted {
            return Err(Rejected::Closed);
        }
        let size = message.queued_size();
        if message.is_data() && self.queued_bytes.saturating_add(size) > self.max_bytes {
            return Err(Rejected::Overflow {
                size,
                max: self.max_bytes,
            });
        }
        if message.is_close() {
            self.close_accepted = true;
        }
        self.queued_bytes += size;
        self.messages.push_back(message);
        Ok(())
    }

    /// Pop the oldest message. Its bytes stop counting toward the budget.
    pub fn pop_front(&mut self) -> Option<Message> {
        let message = self.messages.pop_front()?;
        self.queued_bytes -= message.queued_size();
        Some(message)
    }

    /// Text and binary bytes still resident in the queue.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.queued_bytes
    }

    /// Number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if no messages are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns `true` once a close message was accepted.
    #[must_use]
    pub fn close_accepted(&self) -> bool {
        self.close_accepted
    }

    /// Drop every queued message and refuse new ones.
    ///
    /// The byte count is kept so it still reports what was accepted but
    /// never transmitted.
    pub fn abandon(&mut self) {
        self.messages.clear();
        self.close_accepted = true;
    }
}
