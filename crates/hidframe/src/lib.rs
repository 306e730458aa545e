//! Chunked transfers over fixed-size HID reports.
//!
//! hidframe moves payloads of any length through a HID interface whose reports
//! are only a few dozen bytes, by splitting them into CRC-8 checked frames
//! that count down to the end of the transfer.
//!
//! # Crate Structure
//!
//! - [`transport`] — HID session and backend traits, device selection, in-memory backend
//! - [`frame`] — Checksum, frame codec, encoder, reassembly, and session reader/writer

/// Re-export transport types.
pub mod transport {
    pub use hidframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use hidframe_frame::*;
}
