//! Reader task: reads frames off the read half and feeds the state machine.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::codec::{Frame, FrameRead};
use crate::connection::machine::Core;
use crate::connection::dispatcher::Event;
use crate::error::Error;

pub(crate) async fn run<R: FrameRead>(core: Arc<Core>, mut reader: R) {
    let mut close_received = false;
    loop {
        let frame = match reader.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                core.on_end_of_stream();
                return;
            }
            Err(error) if close_received => {
                debug!(%error, "Read failed after peer close, treating as end of stream");
                core.on_end_of_stream();
                return;
            }
            Err(error) => {
                core.fail(error);
                return;
            }
        };

        if close_received {
            core.fail(Error::ProtocolViolation("frame received after close".into()));
            return;
        }

        match frame {
            Frame::Text(payload) => match String::from_utf8(payload) {
                Ok(text) => core.deliver(Event::Text(text)),
                Err(error) => {
                    core.fail(error.into());
                    return;
                }
            },
            Frame::Binary(data) => core.deliver(Event::Binary(data)),
            Frame::Ping(payload) => {
                trace!(len = payload.len(), "Ping received");
                core.enqueue_pong(payload);
            }
            Frame::Pong(payload) => trace!(len = payload.len(), "Pong received"),
            Frame::Close(frame) => {
                close_received = true;
                core.on_peer_close(frame);
            }
        }
    }
}
