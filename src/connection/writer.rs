//! Writer task: drains the outgoing queue onto the write half.
//!
//! There is exactly one writer per connection. A failed write is fatal and
//! never retried.

use std::sync::Arc;

use tracing::trace;

use crate::codec::FrameWrite;
use crate::connection::machine::{Core, WriterStep};

pub(crate) async fn run<W: FrameWrite>(core: Arc<Core>, mut writer: W) {
    loop {
        match core.next_outgoing() {
            WriterStep::Write(message) => {
                let is_close = message.is_close();
                trace!(size = message.queued_size(), is_close, "Writing message");
                if let Err(error) = writer.write_frame(&message).await {
                    core.fail(error);
                    return;
                }
                if is_close {
                    core.on_close_written();
                }
            }
            WriterStep::Wait => core.wait_for_work().await,
            WriterStep::Shutdown => {
                match writer.close_stream().await {
                    Ok(()) => core.on_writer_finished(),
                    Err(error) => core.fail(error),
                }
                return;
            }
            WriterStep::Stop => return,
        }
    }
}
