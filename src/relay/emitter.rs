// src/relay/emitter.rs

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::relay::protocol::{AssistantMessage, Frame};

#[derive(Error, Debug, PartialEq, Eq)]
#[error("outward stream receiver was dropped")]
pub struct EmitterClosed;

/// Pushes frames to the outward stream in production order.
///
/// Frames are snapshots: a unit updated later is sent again as a new frame
/// with the same identifier, and the consumer keeps the last one per id.
#[derive(Debug)]
pub struct FrameEmitter {
    tx: mpsc::Sender<Frame>,
    emitted: usize,
    finished: bool,
}

impl FrameEmitter {
    pub fn new(tx: mpsc::Sender<Frame>) -> Self {
        Self {
            tx,
            emitted: 0,
            finished: false,
        }
    }

    /// Creates an emitter together with the receiving end of a bounded channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    pub async fn emit(&mut self, message: &AssistantMessage) -> Result<(), EmitterClosed> {
        if self.finished {
            return Err(EmitterClosed);
        }
        self.tx
            .send(Frame::Message(message.clone()))
            .await
            .map_err(|_| EmitterClosed)?;
        self.emitted += 1;
        debug!(unit_id = %message.id, len = message.content.len(), "Emitted frame");
        Ok(())
    }

    /// Sends the end-of-stream sentinel. Only the first call sends anything.
    pub async fn finish(&mut self) -> Result<(), EmitterClosed> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.tx.send(Frame::Done).await.map_err(|_| EmitterClosed)
    }

    /// Number of message frames sent so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
