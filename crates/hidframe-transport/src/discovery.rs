//! Selecting the comms interface among enumerated HID devices.

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{DeviceInfo, HidBackend};

/// Vendor ID the keyboard firmware enumerates with.
pub const VENDOR_ID: u16 = 0x303A;

/// Product ID the keyboard firmware enumerates with.
pub const PRODUCT_ID: u16 = 0x1324;

/// Interface number of the vendor-defined comms HID interface.
///
/// Interface 0 is the boot keyboard and never accepts comms reports.
pub const COMM_INTERFACE: i32 = 1;

/// Identifies the comms interface of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFilter {
    pub vendor_id: u16,
    pub product_id: u16,
    pub interface_number: i32,
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self {
            vendor_id: VENDOR_ID,
            product_id: PRODUCT_ID,
            interface_number: COMM_INTERFACE,
        }
    }
}

impl DeviceFilter {
    /// True if `device` belongs to the filtered vendor/product pair.
    pub fn matches_device(&self, device: &DeviceInfo) -> bool {
        device.vendor_id == self.vendor_id && device.product_id == self.product_id
    }

    /// True if `device` is the filtered interface of the filtered device.
    pub fn matches(&self, device: &DeviceInfo) -> bool {
        self.matches_device(device) && device.interface_number == self.interface_number
    }

    /// Pick the comms interface from an enumeration result.
    ///
    /// The first matching entry wins when the platform lists an interface more
    /// than once (e.g. one entry per top-level collection).
    pub fn select<'a>(&self, devices: &'a [DeviceInfo]) -> Option<&'a DeviceInfo> {
        devices.iter().find(|d| self.matches(d))
    }

    fn not_found(&self) -> TransportError {
        TransportError::DeviceNotFound {
            vendor_id: self.vendor_id,
            product_id: self.product_id,
            interface_number: self.interface_number,
        }
    }
}

/// Enumerate through `backend` and open the interface matching `filter`.
pub fn open_device<B: HidBackend>(backend: &B, filter: &DeviceFilter) -> Result<B::Session> {
    let devices = backend.enumerate()?;

    for device in devices.iter().filter(|d| filter.matches_device(d)) {
        debug!(
            path = %device.path,
            interface_number = device.interface_number,
            usage_page = device.usage_page,
            usage = device.usage,
            "candidate interface"
        );
    }

    let device = filter.select(&devices).ok_or_else(|| filter.not_found())?;
    let session = backend.open(&device.path)?;
    info!(path = %device.path, "opened comms interface");
    Ok(session)
}
