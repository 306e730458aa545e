use bytes::Bytes;
use hidframe_transport::HidSession;
use tracing::{debug, warn};

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::reassembler::Reassembler;

/// Reads input reports from a HID session and reassembles payloads.
///
/// Callers always get complete payloads; partial transfers stay buffered
/// between calls.
pub struct FrameReader<S> {
    session: S,
    reassembler: Reassembler,
    config: FrameConfig,
}

impl<S: HidSession> FrameReader<S> {
    /// Create a new frame reader with default configuration.
    pub fn new(session: S) -> Self {
        Self::with_config(session, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(session: S, config: FrameConfig) -> Self {
        Self {
            session,
            reassembler: Reassembler::new(),
            config,
        }
    }

    /// Read and verify the next frame (blocking up to the read timeout).
    pub fn read_frame(&mut self) -> Result<Frame> {
        let report = self
            .session
            .read(self.config.max_report_len(), self.config.read_timeout)?
            .ok_or(FrameError::Timeout(self.config.read_timeout))?;

        decode_frame(&report, self.config.report_id).inspect_err(|err| {
            warn!(error = %err, len = report.len(), "rejected input report");
        })
    }

    /// Read frames until a payload is complete.
    ///
    /// A timeout keeps the partial transfer so a later call can resume it. Any
    /// other error discards it.
    pub fn recv(&mut self) -> Result<Bytes> {
        loop {
            let frame = match self.read_frame() {
                Ok(frame) => frame,
                Err(err @ FrameError::Timeout(_)) => return Err(err),
                Err(err) => {
                    self.reassembler.reset();
                    return Err(err);
                }
            };

            if let Some(payload) = self.reassembler.push(frame)? {
                debug!(len = payload.len(), "payload received");
                return Ok(payload);
            }
        }
    }

    /// True while a transfer is partially received.
    pub fn in_transfer(&self) -> bool {
        !self.reassembler.is_idle()
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

    /// Consume the reader and return the inner session.
    pub fn into_inner(self) -> S {
        self.session
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
