use std::fmt;
use std::io;

use hidframe_frame::FrameError;
use hidframe_transport::TransportError;

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match err {
        TransportError::DeviceNotFound { .. } => FAILURE,
        TransportError::Open { .. } | TransportError::Write(_) | TransportError::Closed => {
            TRANSPORT_ERROR
        }
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        FrameError::InvalidChunkCapacity { .. } | FrameError::InvalidConfig(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        FrameError::TooManyFrames { .. }
        | FrameError::FrameTooLarge { .. }
        | FrameError::Truncated { .. }
        | FrameError::ReportIdMismatch { .. }
        | FrameError::InvalidFlags(_)
        | FrameError::ChecksumMismatch { .. }
        | FrameError::OutOfSequence { .. }
        | FrameError::UnexpectedPosition { .. }
        | FrameError::Incomplete { .. }
        | FrameError::TrailingFrames(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_usage() {
        let err = frame_error(
            "encode failed",
            FrameError::InvalidChunkCapacity {
                capacity: 0,
                max: 255,
            },
        );
        assert_eq!(err.code, USAGE);
        assert!(err.message.starts_with("encode failed: "));
    }

    #[test]
    fn integrity_errors_are_data_invalid() {
        let err = frame_error(
            "decode failed",
            FrameError::ChecksumMismatch {
                computed: 1,
                received: 2,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn transport_errors_unwrap_through_frame_errors() {
        let err = frame_error(
            "send failed",
            FrameError::Transport(TransportError::Write("stall".to_string())),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);

        let err = frame_error("recv failed", FrameError::Timeout(None));
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn missing_device_is_failure() {
        let err = transport_error(
            "open failed",
            TransportError::DeviceNotFound {
                vendor_id: 0x303A,
                product_id: 0x1324,
                interface_number: 1,
            },
        );
        assert_eq!(err.code, FAILURE);

        let err = transport_error("write failed", TransportError::Closed);
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn oversize_frame_is_data_invalid() {
        let err = frame_error("write failed", FrameError::FrameTooLarge { len: 44, max: 43 });
        assert_eq!(err.code, DATA_INVALID);
    }
}
