//! HID report transport abstraction.
//!
//! Models the platform HID access layer as two traits:
//! - [`HidBackend`] enumerates devices and opens sessions by path
//! - [`HidSession`] writes and reads whole reports on an open device
//!
//! This is the lowest layer of hidframe. The frame layer only ever talks to a
//! [`HidSession`], so real devices and the in-memory [`MemoryBackend`] are
//! interchangeable.

pub mod discovery;
pub mod error;
pub mod memory;
pub mod traits;

pub use discovery::{open_device, DeviceFilter, COMM_INTERFACE, PRODUCT_ID, VENDOR_ID};
pub use error::{Result, TransportError};
pub use memory::{MemoryBackend, MemoryDevice, MemorySession};
pub use traits::{DeviceInfo, HidBackend, HidSession};
