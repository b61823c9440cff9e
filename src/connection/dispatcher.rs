//! Observer dispatcher.
//!
//! Events from the reader, the writer and the application API all funnel
//! into one channel with a single consumer, so listener callbacks never run
//! concurrently. The first terminal event ends the loop.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::connection::WebSocket;
use crate::error::Error;
use crate::factory::Response;
use crate::listener::Listener;

#[derive(Debug)]
pub(crate) enum Event {
    Open(Response),
    Text(String),
    Binary(Bytes),
    Closing { code: u16, reason: String },
    Closed { code: u16, reason: String },
    Failure {
        error: Error,
        response: Option<Response>,
    },
}

pub(crate) async fn run(
    ws: WebSocket,
    listener: Arc<dyn Listener>,
    mut events: mpsc::UnboundedReceiver<Event>,
) {
    while let Some(event) = events.recv().await {
        match event {
            Event::Open(response) => listener.on_open(&ws, &response),
            Event::Text(text) => listener.on_text(&ws, text),
            Event::Binary(data) => listener.on_binary(&ws, data),
            Event::Closing { code, reason } => {
                listener.on_closing(&ws, code, &reason);
                if ws.core().config().auto_close_reply {
                    ws.core().reply_to_peer_close();
                }
            }
            Event::Closed { code, reason } => {
                listener.on_closed(&ws, code, &reason);
                break;
            }
            Event::Failure { error, response } => {
                listener.on_failure(&ws, &error, response.as_ref());
                break;
            }
        }
    }
}
