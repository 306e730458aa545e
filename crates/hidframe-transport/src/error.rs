/// Errors that can occur in HID transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Enumeration found no interface matching the filter.
    #[error("no HID device {vendor_id:04x}:{product_id:04x} with interface {interface_number}")]
    DeviceNotFound {
        vendor_id: u16,
        product_id: u16,
        interface_number: i32,
    },

    /// Failed to open the device at the specified path.
    #[error("failed to open {path}: {reason}")]
    Open { path: String, reason: String },

    /// The device rejected or dropped an output report.
    #[error("report write failed: {0}")]
    Write(String),

    /// The session has been closed.
    #[error("session closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
