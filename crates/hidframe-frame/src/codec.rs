use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

use crate::crc::{checksum, Crc8};
use crate::error::{FrameError, Result};
use crate::position::Position;

/// Frame header: report ID (1) + flags (1) + remaining (2) + length (1) = 5 bytes.
pub const HEADER_SIZE: usize = 5;

/// Trailing checksum byte.
pub const TRAILER_SIZE: usize = 1;

/// Bytes a frame adds to its data inside a report, excluding the report ID.
pub const BODY_OVERHEAD: usize = HEADER_SIZE - 1 + TRAILER_SIZE;

/// Shortest decodable report: a header and checksum around zero data bytes.
pub const MIN_REPORT_LEN: usize = HEADER_SIZE + TRAILER_SIZE;

/// Largest chunk the 8-bit length field can describe.
pub const MAX_CHUNK_CAPACITY: usize = u8::MAX as usize;

/// Report ID of the vendor-defined comms collection.
pub const REPORT_ID_COMM: u8 = 0x03;

/// Report count declared by the comms report descriptor (excludes the report ID).
pub const COMM_REPORT_SIZE: usize = 48;

/// Chunk capacity that fills one comms report exactly.
pub const DEFAULT_CHUNK_CAPACITY: usize = COMM_REPORT_SIZE - BODY_OVERHEAD;

/// One report-sized slice of a transfer.
///
/// `data` never exceeds [`MAX_CHUNK_CAPACITY`] bytes, so the length byte
/// always describes it exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Channel selector, constant across a transfer.
    pub report_id: u8,
    pub position: Position,
    /// Frames still to follow this one.
    pub remaining: u16,
    data: Bytes,
}

impl Frame {
    /// Create a new frame, rejecting data the length byte cannot describe.
    pub fn new(
        report_id: u8,
        position: Position,
        remaining: u16,
        data: impl Into<Bytes>,
    ) -> Result<Self> {
        let data = data.into();
        if data.len() > MAX_CHUNK_CAPACITY {
            return Err(FrameError::FrameTooLarge {
                len: data.len(),
                max: MAX_CHUNK_CAPACITY,
            });
        }
        Ok(Self::from_parts(report_id, position, remaining, data))
    }

    /// Caller guarantees `data.len() <= MAX_CHUNK_CAPACITY`.
    pub(crate) fn from_parts(
        report_id: u8,
        position: Position,
        remaining: u16,
        data: Bytes,
    ) -> Self {
        debug_assert!(data.len() <= MAX_CHUNK_CAPACITY);
        Self {
            report_id,
            position,
            remaining,
            data,
        }
    }

    /// The data bytes carried by this frame.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume the frame and return its data.
    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// Value of the length byte.
    pub fn length(&self) -> u8 {
        self.data.len() as u8
    }

    /// CRC-8 over flags, remaining, length, and data.
    pub fn checksum(&self) -> u8 {
        let mut crc = Crc8::new();
        let remaining = self.remaining.to_le_bytes();
        crc.update(&[self.position.flag(), remaining[0], remaining[1], self.length()]);
        crc.update(&self.data);
        crc.finish()
    }

    /// The total wire size of this frame (header + data + checksum).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.data.len() + TRAILER_SIZE
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_frame(self, &mut buf);
        buf.freeze()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬───────┬──────────────┬────────┬──────────────┬──────────┐
/// │ Report ID │ Flags │ Remaining    │ Length │ Data         │ CRC-8    │
/// │ (1B)      │ (1B)  │ (2B LE)      │ (1B)   │ (Length B)   │ (1B)     │
/// └───────────┴───────┴──────────────┴────────┴──────────────┴──────────┘
///              └──────────────── checksummed ────────────────┘
/// ```
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) {
    dst.reserve(frame.wire_size());
    let start = dst.len();
    dst.put_u8(frame.report_id);
    dst.put_u8(frame.position.flag());
    dst.put_u16_le(frame.remaining);
    dst.put_u8(frame.length());
    dst.put_slice(&frame.data);
    let crc = checksum(&dst[start + 1..]);
    dst.put_u8(crc);
}

/// Decode and verify one report.
///
/// Bytes past the checksum are zero padding added to fill the fixed report
/// size and are ignored.
pub fn decode_frame(report: &[u8], report_id: u8) -> Result<Frame> {
    let (body_end, received) = split_report(report)?;

    if report[0] != report_id {
        return Err(FrameError::ReportIdMismatch {
            expected: report_id,
            actual: report[0],
        });
    }

    let position = Position::from_flag(report[1]).ok_or(FrameError::InvalidFlags(report[1]))?;

    let computed = checksum(&report[1..body_end]);
    if computed != received {
        return Err(FrameError::ChecksumMismatch { computed, received });
    }

    Ok(Frame::from_parts(
        report_id,
        position,
        u16::from_le_bytes([report[2], report[3]]),
        Bytes::copy_from_slice(&report[HEADER_SIZE..body_end]),
    ))
}

/// Check a report's length and checksum without decoding it.
pub fn verify_report(report: &[u8]) -> bool {
    match split_report(report) {
        Ok((body_end, received)) => checksum(&report[1..body_end]) == received,
        Err(_) => false,
    }
}

/// Returns the end of the checksummed body and the received checksum.
fn split_report(report: &[u8]) -> Result<(usize, u8)> {
    if report.len() < MIN_REPORT_LEN {
        return Err(FrameError::Truncated {
            len: report.len(),
            need: MIN_REPORT_LEN,
        });
    }

    let body_end = HEADER_SIZE + report[4] as usize;
    if report.len() < body_end + TRAILER_SIZE {
        return Err(FrameError::Truncated {
            len: report.len(),
            need: body_end + TRAILER_SIZE,
        });
    }

    Ok((body_end, report[body_end]))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Report ID stamped on every frame. Default: 0x03.
    pub report_id: u8,
    /// Data bytes per frame. Default: 43.
    pub chunk_capacity: usize,
    /// Fixed report size (excluding the report ID). Outgoing reports are
    /// zero-padded to it when set. Default: 48.
    pub report_size: Option<usize>,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            report_id: REPORT_ID_COMM,
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            report_size: Some(COMM_REPORT_SIZE),
            read_timeout: None,
        }
    }
}

impl FrameConfig {
    /// Configuration whose chunks fill reports of `report_size` bytes.
    pub fn for_report_size(report_id: u8, report_size: usize) -> Result<Self> {
        if report_size <= BODY_OVERHEAD {
            return Err(FrameError::InvalidConfig(format!(
                "report size {report_size} leaves no room for data (overhead {BODY_OVERHEAD})"
            )));
        }

        Ok(Self {
            report_id,
            chunk_capacity: (report_size - BODY_OVERHEAD).min(MAX_CHUNK_CAPACITY),
            report_size: Some(report_size),
            ..Self::default()
        })
    }

    /// Check the capacity range and that a full chunk fits the report size.
    pub fn validate(&self) -> Result<()> {
        validate_chunk_capacity(self.chunk_capacity)?;

        if let Some(report_size) = self.report_size {
            if self.chunk_capacity + BODY_OVERHEAD > report_size {
                return Err(FrameError::InvalidConfig(format!(
                    "chunk capacity {} exceeds report size {report_size} minus overhead {BODY_OVERHEAD}",
                    self.chunk_capacity
                )));
            }
        }

        Ok(())
    }

    /// Largest report, including the report ID, this configuration produces
    /// or accepts.
    pub fn max_report_len(&self) -> usize {
        match self.report_size {
            Some(size) => size + 1,
            None => HEADER_SIZE + self.chunk_capacity + TRAILER_SIZE,
        }
    }
}

pub(crate) fn validate_chunk_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 || capacity > MAX_CHUNK_CAPACITY {
        return Err(FrameError::InvalidChunkCapacity {
            capacity,
            max: MAX_CHUNK_CAPACITY,
        });
    }
    Ok(())
}
