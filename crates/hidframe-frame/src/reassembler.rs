//! Rebuilding a payload from frames received in order.

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::codec::Frame;
use crate::error::{FrameError, Result};
use crate::position::Position;

#[derive(Debug, Clone, Copy)]
struct InProgress {
    report_id: u8,
    remaining: u16,
}

/// Collects frame data until the `Last` frame of a transfer arrives.
///
/// Any sequencing error discards the partial transfer, so the next frame must
/// open a new one.
#[derive(Debug, Default)]
pub struct Reassembler {
    buf: BytesMut,
    current: Option<InProgress>,
    frames: usize,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the next frame. Returns the payload once the transfer completes.
    pub fn push(&mut self, frame: Frame) -> Result<Option<Bytes>> {
        if let Err(err) = self.check(&frame) {
            debug!(error = %err, frames = self.frames, "discarding partial transfer");
            self.reset();
            return Err(err);
        }

        self.buf.extend_from_slice(frame.data());
        self.frames += 1;
        trace!(
            position = %frame.position,
            remaining = frame.remaining,
            len = frame.data().len(),
            "frame accepted"
        );

        if frame.remaining == 0 {
            let payload = self.buf.split().freeze();
            debug!(frames = self.frames, len = payload.len(), "transfer complete");
            self.current = None;
            self.frames = 0;
            return Ok(Some(payload));
        }

        self.current = Some(InProgress {
            report_id: frame.report_id,
            remaining: frame.remaining,
        });
        Ok(None)
    }

    fn check(&self, frame: &Frame) -> Result<()> {
        let opening = match self.current {
            None => true,
            Some(progress) => {
                if frame.report_id != progress.report_id {
                    return Err(FrameError::ReportIdMismatch {
                        expected: progress.report_id,
                        actual: frame.report_id,
                    });
                }
                let expected = progress.remaining - 1;
                if frame.remaining != expected {
                    return Err(FrameError::OutOfSequence {
                        expected,
                        actual: frame.remaining,
                    });
                }
                false
            }
        };

        let expected = Position::expected(opening, frame.remaining);
        if frame.position != expected {
            return Err(FrameError::UnexpectedPosition {
                expected,
                actual: frame.position,
            });
        }
        Ok(())
    }

    /// Drop any partial transfer.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.current = None;
        self.frames = 0;
    }

    /// True when no transfer is in progress.
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Frames still expected for the transfer in progress (0 when idle).
    pub fn remaining(&self) -> u16 {
        self.current.map_or(0, |p| p.remaining)
    }

    /// Data bytes collected so far for the transfer in progress.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}

/// Reassemble exactly one transfer from `frames`.
pub fn reassemble<I>(frames: I) -> Result<Bytes>
where
    I: IntoIterator<Item = Frame>,
{
    let mut reassembler = Reassembler::new();
    let mut frames = frames.into_iter();

    for frame in frames.by_ref() {
        if let Some(payload) = reassembler.push(frame)? {
            let trailing = frames.count();
            if trailing > 0 {
                return Err(FrameError::TrailingFrames(trailing));
            }
            return Ok(payload);
        }
    }

    // An empty input never opened a transfer; report the one frame it lacks.
    Err(FrameError::Incomplete {
        remaining: reassembler.remaining().max(1),
    })
}
