use bytes::{Bytes, BytesMut};
use hidframe_transport::HidSession;
use tracing::{debug, info};

use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::encoder::encode;
use crate::error::{FrameError, Result};

/// Writes payloads to a HID session as sequences of frames.
///
/// Frames of one payload go out strictly in index order. The writer owns the
/// session for the whole transfer, so transfers never interleave.
pub struct FrameWriter<S> {
    session: S,
    buf: BytesMut,
    config: FrameConfig,
}

impl<S: HidSession> FrameWriter<S> {
    /// Create a new frame writer with default configuration.
    pub fn new(session: S) -> Self {
        Self::with_config(session, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(session: S, config: FrameConfig) -> Self {
        let buf = BytesMut::with_capacity(config.max_report_len());
        Self {
            session,
            buf,
            config,
        }
    }

    /// Frame `payload` and write every frame. Returns the number of frames written.
    ///
    /// Configuration and capacity errors are raised before the first write. A
    /// failed write aborts the transfer; frames already written are not
    /// retracted.
    pub fn send(&mut self, payload: impl Into<Bytes>) -> Result<usize> {
        self.config.validate()?;
        let frames = encode(payload, self.config.report_id, self.config.chunk_capacity)?;
        let count = frames.frame_count();
        let len = frames.payload().len();

        for frame in frames {
            self.write_report(&frame)?;
        }

        info!(len, frames = count, report_id = self.config.report_id, "payload sent");
        Ok(count)
    }

    /// Write one already-built frame as a single report.
    ///
    /// The frame must carry the configured report ID and fit the configured
    /// chunk capacity.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.config.validate()?;
        if frame.report_id != self.config.report_id {
            return Err(FrameError::ReportIdMismatch {
                expected: self.config.report_id,
                actual: frame.report_id,
            });
        }
        if frame.data().len() > self.config.chunk_capacity {
            return Err(FrameError::FrameTooLarge {
                len: frame.data().len(),
                max: self.config.chunk_capacity,
            });
        }
        self.write_report(frame)
    }

    fn write_report(&mut self, frame: &Frame) -> Result<()> {
        self.buf.clear();
        encode_frame(frame, &mut self.buf);
        if let Some(report_size) = self.config.report_size {
            let padded = report_size + 1;
            if self.buf.len() < padded {
                self.buf.resize(padded, 0);
            }
        }

        debug!(
            position = %frame.position,
            remaining = frame.remaining,
            len = frame.data().len(),
            wire = self.buf.len(),
            "writing frame"
        );
        self.session.write(&self.buf)?;
        Ok(())
    }

    /// Close the underlying session.
    pub fn close(&mut self) -> Result<()> {
        self.session.close()?;
        Ok(())
    }

    /// Borrow the underlying session.
    pub fn get_ref(&self) -> &S {
        &self.session
    }

    /// Mutably borrow the underlying session.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Consume the writer and return the inner session.
    pub fn into_inner(self) -> S {
        self.session
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
