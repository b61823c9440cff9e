//! # ws-engine - Full-duplex WebSocket connection engine
//!
//! `ws-engine` manages the lifecycle of a single WebSocket from a completed
//! HTTP upgrade through a graceful close handshake or an abrupt cancel. It
//! multiplexes an outgoing message queue against an incoming frame reader,
//! enforces a byte budget on unsent data and delivers events to a
//! [`Listener`] one at a time.
//!
//! Wire encoding and the HTTP upgrade are collaborators: plug in a
//! [`FrameRead`]/[`FrameWrite`] pair and an [`Upgrader`].
//!
//! ## Features
//!
//! - **Non-blocking API** - `send_text`, `send_binary`, `close` and `cancel`
//!   return immediately and never fail with an error
//! - **Backpressure** - a queue that would exceed its byte budget starts a
//!   graceful shutdown instead of silently dropping data
//! - **RFC 6455 close handshake** - independent local and peer close flags,
//!   bounded by a shutdown timer
//! - **Serialized callbacks** - listener methods never overlap
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ws_engine::{Config, Request, WebSocketFactory};
//!
//! let factory = WebSocketFactory::new(upgrader).with_config(Config::default());
//! let ws = factory.new_web_socket(Request::new("wss://example.com"), listener);
//! ws.send_text("hello");
//! ws.close(1000, "bye");
//! ```

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod factory;
pub mod listener;
pub mod message;

pub use codec::{Frame, FrameRead, FrameWrite};
pub use config::Config;
pub use connection::{ConnectionState, WebSocket};
pub use error::{Error, Result};
pub use factory::{Request, Response, UpgradeFailure, Upgraded, Upgrader, WebSocketFactory};
pub use listener::{Listener, NoopListener};
pub use message::{CloseCode, CloseFrame, Message};
