//! Request and transfer type definitions
//!
//! This module defines the device-defined request codes, the parameters of a
//! single control transfer, and the error conditions a transport may report.

use std::fmt;
use thiserror::Error;

/// USB vendor ID of the sensor (shared V-USB VID)
pub const DEFAULT_VENDOR_ID: u16 = 0x16C0;

/// USB product ID of the sensor (shared V-USB PID for vendor-class devices)
pub const DEFAULT_PRODUCT_ID: u16 = 0x05DC;

/// Vendor request understood by the sensor firmware
///
/// The numeric values are fixed by the firmware and sent as `bRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RequestCode {
    /// Device sends back `wValue` and `wIndex` (4 bytes). Used with random
    /// data to test the reliability of the communication.
    Echo = 0,
    /// Control-OUT. Bit 0 of the low byte of `wValue` sets the LED.
    SetStatus = 1,
    /// Control-IN. One byte whose bit 0 is the LED state.
    GetStatus = 2,
    /// Control-IN. Raw 14-bit temperature code, high byte first.
    GetTemperature = 3,
    /// Control-IN. Raw 12-bit humidity code, high byte first.
    GetHumidity = 4,
}

impl RequestCode {
    /// Value placed in `bRequest`
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for RequestCode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Echo),
            1 => Ok(Self::SetStatus),
            2 => Ok(Self::GetStatus),
            3 => Ok(Self::GetTemperature),
            4 => Ok(Self::GetHumidity),
            other => Err(other),
        }
    }
}

/// Data phase direction of a control transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Device to host
    In,
    /// Host to device
    Out,
}

/// Parameters for one vendor-class, device-recipient control transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlTransferParams {
    /// Data phase direction
    pub direction: Direction,
    /// Request code (`bRequest`)
    pub request: RequestCode,
    /// `wValue`
    pub value: u16,
    /// `wIndex`
    pub index: u16,
    /// Number of reply bytes expected (`wLength`); zero for OUT requests
    pub expected_length: u16,
}

impl ControlTransferParams {
    /// `bmRequestType` for this transfer
    pub fn request_type(&self) -> u8 {
        match self.direction {
            Direction::In => crate::codec::REQUEST_TYPE_IN,
            Direction::Out => crate::codec::REQUEST_TYPE_OUT,
        }
    }

    /// Whether this is a device-to-host transfer
    pub fn is_in(&self) -> bool {
        self.direction == Direction::In
    }
}

/// LED state reported by `GET_STATUS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    Off,
    On,
}

impl LedState {
    /// Whether the LED is lit
    pub fn is_on(self) -> bool {
        self == LedState::On
    }
}

impl From<bool> for LedState {
    fn from(on: bool) -> Self {
        if on { LedState::On } else { LedState::Off }
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedState::On => write!(f, "on"),
            LedState::Off => write!(f, "off"),
        }
    }
}

/// Transport failure
///
/// Maps to libusb error codes. See rusb::Error for details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Transfer timed out
    #[error("Transfer timed out")]
    Timeout,
    /// Endpoint stalled (request not supported by the device)
    #[error("Control endpoint stalled")]
    Pipe,
    /// Device was disconnected
    #[error("Device disconnected")]
    NoDevice,
    /// Device or entity not found
    #[error("Entity not found")]
    NotFound,
    /// Device is busy
    #[error("Device busy")]
    Busy,
    /// Device sent more data than requested
    #[error("Buffer overflow")]
    Overflow,
    /// I/O error
    #[error("I/O error")]
    Io,
    /// Invalid parameter
    #[error("Invalid parameter")]
    InvalidParam,
    /// Access denied (permissions)
    #[error("Access denied")]
    Access,
    /// Other error with message
    #[error("{message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_code_values() {
        assert_eq!(RequestCode::Echo.code(), 0);
        assert_eq!(RequestCode::SetStatus.code(), 1);
        assert_eq!(RequestCode::GetStatus.code(), 2);
        assert_eq!(RequestCode::GetTemperature.code(), 3);
        assert_eq!(RequestCode::GetHumidity.code(), 4);
    }

    #[test]
    fn test_request_code_try_from() {
        for code in 0u8..=4 {
            assert_eq!(RequestCode::try_from(code).map(RequestCode::code), Ok(code));
        }
        assert_eq!(RequestCode::try_from(5), Err(5));
        assert_eq!(RequestCode::try_from(0xff), Err(0xff));
    }

    #[test]
    fn test_led_state_from_bool() {
        assert!(LedState::from(true).is_on());
        assert!(!LedState::from(false).is_on());
        assert_eq!(LedState::On.to_string(), "on");
        assert_eq!(LedState::Off.to_string(), "off");
    }
}
