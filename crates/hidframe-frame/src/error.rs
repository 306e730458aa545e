use std::time::Duration;

use crate::position::Position;

/// Errors that can occur during frame encoding, decoding, and transfer.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The chunk capacity is outside the range the 8-bit length field can describe.
    #[error("invalid chunk capacity {capacity} (must be 1..={max})")]
    InvalidChunkCapacity { capacity: usize, max: usize },

    /// The configuration is internally inconsistent.
    #[error("invalid frame configuration: {0}")]
    InvalidConfig(String),

    /// The payload needs more frames than the 16-bit remaining counter can express.
    #[error("payload of {size} bytes needs {frames} frames (max {max})")]
    TooManyFrames {
        size: usize,
        frames: usize,
        max: usize,
    },

    /// A frame carries more data than the length byte or the chunk capacity allows.
    #[error("frame of {len} data bytes exceeds capacity {max}")]
    FrameTooLarge { len: usize, max: usize },

    /// The report is shorter than its header or declared length.
    #[error("truncated report ({len} bytes, need {need})")]
    Truncated { len: usize, need: usize },

    /// The report carries an unexpected report ID.
    #[error("report ID mismatch (expected {expected:#04x}, got {actual:#04x})")]
    ReportIdMismatch { expected: u8, actual: u8 },

    /// The flags byte does not hold exactly one position bit.
    #[error("invalid position flags {0:#04x}")]
    InvalidFlags(u8),

    /// The frame body does not match its checksum.
    #[error("checksum mismatch (computed {computed:#04x}, received {received:#04x})")]
    ChecksumMismatch { computed: u8, received: u8 },

    /// The remaining counter did not count down by one.
    #[error("frame out of sequence (expected remaining {expected}, got {actual})")]
    OutOfSequence { expected: u16, actual: u16 },

    /// The position flag disagrees with the frame's place in the transfer.
    #[error("unexpected {actual} frame (expected {expected})")]
    UnexpectedPosition { expected: Position, actual: Position },

    /// The frame sequence ended before the last frame.
    #[error("transfer incomplete ({remaining} frames missing)")]
    Incomplete { remaining: u16 },

    /// Frames followed the last frame of a transfer.
    #[error("{0} trailing frames after transfer end")]
    TrailingFrames(usize),

    /// No report arrived before the read timeout.
    #[error("timed out waiting for report (timeout {0:?})")]
    Timeout(Option<Duration>),

    /// The underlying HID session failed.
    #[error("transport error: {0}")]
    Transport(#[from] hidframe_transport::TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
