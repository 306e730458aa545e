//! Chunked, CRC-8 checked framing for fixed-size HID reports.
//!
//! A payload of any length is split into frames that each fit one report:
//! - 1-byte report ID selecting the comms collection
//! - 1-byte position flag (FIRST, MIDDLE, or LAST)
//! - 2-byte little-endian count of frames still to follow
//! - 1-byte data length, the data, and a CRC-8 over everything but the report ID
//!
//! The receiver needs no out-of-band length: the countdown reaching zero on a
//! LAST frame ends the transfer.

pub mod codec;
pub mod crc;
pub mod encoder;
pub mod error;
pub mod position;
pub mod reader;
pub mod reassembler;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, verify_report, Frame, FrameConfig, BODY_OVERHEAD,
    COMM_REPORT_SIZE, DEFAULT_CHUNK_CAPACITY, HEADER_SIZE, MAX_CHUNK_CAPACITY, MIN_REPORT_LEN,
    REPORT_ID_COMM, TRAILER_SIZE,
};
pub use crc::{checksum, Crc8};
pub use encoder::{encode, frame_count, Frames, MAX_FRAMES};
pub use error::{FrameError, Result};
pub use position::{Position, FLAG_FIRST, FLAG_LAST, FLAG_MIDDLE};
pub use reader::FrameReader;
pub use reassembler::{reassemble, Reassembler};
pub use writer::FrameWriter;
