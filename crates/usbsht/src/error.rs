//! Driver error types

use protocol::{ProtocolError, TransportError};
use thiserror::Error;

/// Errors surfaced by device session operations
///
/// None of these are retried inside the driver.
#[derive(Debug, Error)]
pub enum SensorError {
    /// No device with the requested vendor/product ID is attached
    #[error("USB device {vendor_id:04x}:{product_id:04x} not found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// The transfer did not complete within the transport timeout
    #[error("USB transfer timed out")]
    TransportTimeout,

    /// Bus or device failure during a transfer
    #[error("USB transfer failed: {0}")]
    Transport(TransportError),

    /// The reply length differs from the requested length
    #[error("Incorrect data message length: expected {expected} bytes, got {actual}")]
    TransportLength { expected: usize, actual: usize },

    /// Not enough bytes to decode an expected field
    #[error("Malformed response: need 2 bytes at offset {offset}, {available} available")]
    MalformedResponse { offset: usize, available: usize },

    /// Echoed values did not match what was sent
    #[error("{mismatches} out of {total} echo transfers failed")]
    EchoTestFailed { mismatches: u32, total: u32 },

    /// Invalid input to a physical formula
    #[error("Domain error: {0}")]
    Domain(String),

    /// Operation attempted on a closed session
    #[error("Device session is closed")]
    SessionClosed,
}

impl From<TransportError> for SensorError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => SensorError::TransportTimeout,
            other => SensorError::Transport(other),
        }
    }
}

impl From<ProtocolError> for SensorError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::LengthMismatch { expected, actual } => {
                SensorError::TransportLength { expected, actual }
            }
            ProtocolError::MalformedResponse { offset, available } => {
                SensorError::MalformedResponse { offset, available }
            }
        }
    }
}

impl From<common::Error> for SensorError {
    fn from(err: common::Error) -> Self {
        match err {
            common::Error::Domain(message) => SensorError::Domain(message),
            other => SensorError::Domain(other.to_string()),
        }
    }
}

/// Type alias for driver results
pub type Result<T> = std::result::Result<T, SensorError>;
