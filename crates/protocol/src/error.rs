//! Protocol error types

use thiserror::Error;

/// Errors raised while validating or decoding a device reply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The device returned a different number of bytes than requested
    #[error("Incorrect data message length: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Not enough bytes at the offset to decode the field
    #[error("Malformed response: need 2 bytes at offset {offset}, {available} available")]
    MalformedResponse { offset: usize, available: usize },
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::LengthMismatch {
            expected: 2,
            actual: 0,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Incorrect data message length"));
        assert!(msg.contains("expected 2"));
        assert!(msg.contains("got 0"));
    }

    #[test]
    fn test_malformed_response_error() {
        let err = ProtocolError::MalformedResponse {
            offset: 3,
            available: 1,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("offset 3"));
    }
}
