//! Shared fixtures for connection engine tests.
//!
//! - [`Recorder`] is a listener that forwards every callback to a channel
//! - [`open`] and [`open_pair`] build connections over in-memory streams
//! - [`GatedWriter`], [`FailingWriter`] and [`PendingUpgrader`] inject stalls
//!   and faults

#![allow(dead_code)]

mod listener;
mod peers;

pub use listener::{Events, Recorded, Recorder};
pub use peers::{FailingWriter, Gate, GatedWriter, PendingUpgrader, open, open_pair, upgraded};
