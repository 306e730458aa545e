use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;

/// One enumerated HID interface.
///
/// Composite devices show up once per interface, so the same vendor/product
/// pair can appear several times with different `interface_number` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Platform-specific path accepted by [`HidBackend::open`].
    pub path: String,
    /// USB interface number, or -1 when the platform does not report it.
    pub interface_number: i32,
    pub usage_page: u16,
    pub usage: u16,
}

/// An open HID device that exchanges whole reports.
///
/// Every `write` carries exactly one output report with the report ID in the
/// first byte. Implementations must not split or coalesce reports.
pub trait HidSession {
    /// Write one output report.
    fn write(&mut self, report: &[u8]) -> Result<()>;

    /// Read one input report of at most `max_len` bytes.
    ///
    /// Returns `Ok(None)` when `timeout` elapses without a report. A `None`
    /// timeout blocks until a report arrives.
    fn read(&mut self, max_len: usize, timeout: Option<Duration>) -> Result<Option<Bytes>>;

    /// Release the device. Further writes and reads fail with
    /// [`TransportError::Closed`](crate::TransportError::Closed).
    fn close(&mut self) -> Result<()>;
}

impl<S: HidSession + ?Sized> HidSession for &mut S {
    fn write(&mut self, report: &[u8]) -> Result<()> {
        (**self).write(report)
    }

    fn read(&mut self, max_len: usize, timeout: Option<Duration>) -> Result<Option<Bytes>> {
        (**self).read(max_len, timeout)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<S: HidSession + ?Sized> HidSession for Box<S> {
    fn write(&mut self, report: &[u8]) -> Result<()> {
        (**self).write(report)
    }

    fn read(&mut self, max_len: usize, timeout: Option<Duration>) -> Result<Option<Bytes>> {
        (**self).read(max_len, timeout)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Platform HID access layer: enumeration plus opening by path.
pub trait HidBackend {
    type Session: HidSession;

    /// List every HID interface currently visible.
    fn enumerate(&self) -> Result<Vec<DeviceInfo>>;

    /// Open the interface at `path`.
    fn open(&self, path: &str) -> Result<Self::Session>;
}
