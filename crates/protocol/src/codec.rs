//! Control transfer encoding and reply decoding
//!
//! Every request is a vendor-class control transfer addressed to the device:
//!
//! ```text
//! bmRequestType  IN: 0xC0 (vendor | device | IN)   OUT: 0x40 (vendor | device | OUT)
//! bRequest       RequestCode
//! wValue         request specific (LED bit, echo payload)
//! wIndex         0, or the second echo payload word
//! wLength        2 for readings, 4 for echo, 1 for status, 0 for OUT
//! ```
//!
//! Sensor readings come back high byte first. Echo replies carry `wValue`
//! and `wIndex` in the little-endian order the firmware stores them.

use crate::error::{ProtocolError, Result};
use crate::types::{ControlTransferParams, Direction, LedState, RequestCode};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

const USB_TYPE_VENDOR: u8 = 0x02 << 5;
const USB_RECIP_DEVICE: u8 = 0x00;
const USB_ENDPOINT_IN: u8 = 0x80;
const USB_ENDPOINT_OUT: u8 = 0x00;

/// `bmRequestType` for device-to-host vendor requests
pub const REQUEST_TYPE_IN: u8 = USB_TYPE_VENDOR | USB_RECIP_DEVICE | USB_ENDPOINT_IN;

/// `bmRequestType` for host-to-device vendor requests
pub const REQUEST_TYPE_OUT: u8 = USB_TYPE_VENDOR | USB_RECIP_DEVICE | USB_ENDPOINT_OUT;

/// Build a Control-OUT request without a data phase
///
/// # Example
/// ```
/// use protocol::{Direction, RequestCode, encode_set};
///
/// let params = encode_set(RequestCode::SetStatus, 1, 0);
/// assert_eq!(params.direction, Direction::Out);
/// assert_eq!(params.expected_length, 0);
/// ```
pub fn encode_set(request: RequestCode, value: u16, index: u16) -> ControlTransferParams {
    ControlTransferParams {
        direction: Direction::Out,
        request,
        value,
        index,
        expected_length: 0,
    }
}

/// Build a Control-IN request expecting `length` reply bytes
pub fn encode_get(
    request: RequestCode,
    value: u16,
    index: u16,
    length: u16,
) -> ControlTransferParams {
    ControlTransferParams {
        direction: Direction::In,
        request,
        value,
        index,
        expected_length: length,
    }
}

/// Check that a reply has exactly the requested length
///
/// A short or long reply is never passed on as data.
pub fn validate_length(params: &ControlTransferParams, raw: &[u8]) -> Result<()> {
    let expected = params.expected_length as usize;
    if raw.len() != expected {
        return Err(ProtocolError::LengthMismatch {
            expected,
            actual: raw.len(),
        });
    }
    Ok(())
}

/// Decode a 16-bit word stored high byte first at `offset`
///
/// # Example
/// ```
/// use protocol::decode_word;
///
/// assert_eq!(decode_word(&[0x00, 0x01], 0).unwrap(), 1);
/// assert!(decode_word(&[0x00], 0).is_err());
/// ```
pub fn decode_word(raw: &[u8], offset: usize) -> Result<u16> {
    word_at(raw, offset).map(BigEndian::read_u16)
}

/// Decode a 16-bit word stored low byte first at `offset`
pub fn decode_word_le(raw: &[u8], offset: usize) -> Result<u16> {
    word_at(raw, offset).map(LittleEndian::read_u16)
}

/// Decode the LED state from a `GET_STATUS` reply (bit 0 of the first byte)
pub fn decode_status(raw: &[u8]) -> Result<LedState> {
    let byte = raw.first().ok_or(ProtocolError::MalformedResponse {
        offset: 0,
        available: 0,
    })?;
    Ok(LedState::from(byte & 1 != 0))
}

fn word_at(raw: &[u8], offset: usize) -> Result<&[u8]> {
    raw.get(offset..)
        .filter(|rest| rest.len() >= 2)
        .map(|rest| &rest[..2])
        .ok_or(ProtocolError::MalformedResponse {
            offset,
            available: raw.len().saturating_sub(offset),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_type_constants() {
        assert_eq!(REQUEST_TYPE_IN, 0xC0);
        assert_eq!(REQUEST_TYPE_OUT, 0x40);
    }

    #[test]
    fn test_encode_set_has_no_data_phase() {
        let params = encode_set(RequestCode::SetStatus, 0, 0);
        assert_eq!(params.request_type(), REQUEST_TYPE_OUT);
        assert_eq!(params.request, RequestCode::SetStatus);
        assert_eq!(params.expected_length, 0);
        assert!(!params.is_in());
    }

    #[test]
    fn test_encode_get_echo() {
        let params = encode_get(RequestCode::Echo, 0x1234, 0xabcd, 4);
        assert_eq!(params.request_type(), REQUEST_TYPE_IN);
        assert_eq!(params.value, 0x1234);
        assert_eq!(params.index, 0xabcd);
        assert_eq!(params.expected_length, 4);
        assert!(params.is_in());
    }

    #[test]
    fn test_decode_word_big_endian() {
        assert_eq!(decode_word(&[0x00, 0x01], 0).unwrap(), 1);
        assert_eq!(decode_word(&[0x12, 0x34], 0).unwrap(), 0x1234);
        assert_eq!(decode_word(&[0xff, 0x12, 0x34], 1).unwrap(), 0x1234);
    }

    #[test]
    fn test_decode_word_little_endian() {
        assert_eq!(decode_word_le(&[0x34, 0x12, 0xcd, 0xab], 0).unwrap(), 0x1234);
        assert_eq!(decode_word_le(&[0x34, 0x12, 0xcd, 0xab], 2).unwrap(), 0xabcd);
    }

    #[test]
    fn test_decode_word_too_short() {
        assert_eq!(
            decode_word(&[0x01], 0),
            Err(ProtocolError::MalformedResponse {
                offset: 0,
                available: 1
            })
        );
        assert_eq!(
            decode_word(&[0x01, 0x02], 1),
            Err(ProtocolError::MalformedResponse {
                offset: 1,
                available: 1
            })
        );
        // Offset past the end must not panic
        assert_eq!(
            decode_word_le(&[0x01, 0x02], 7),
            Err(ProtocolError::MalformedResponse {
                offset: 7,
                available: 0
            })
        );
    }

    #[test]
    fn test_validate_length() {
        let params = encode_get(RequestCode::GetHumidity, 0, 0, 2);
        assert!(validate_length(&params, &[0x05, 0xdc]).is_ok());
        assert_eq!(
            validate_length(&params, &[]),
            Err(ProtocolError::LengthMismatch {
                expected: 2,
                actual: 0
            })
        );
        assert!(validate_length(&params, &[1, 2, 3]).is_err());
    }

    #[test]
    fn test_decode_status_bit_zero() {
        assert_eq!(decode_status(&[0x01]).unwrap(), LedState::On);
        assert_eq!(decode_status(&[0x00]).unwrap(), LedState::Off);
        assert_eq!(decode_status(&[0xfe]).unwrap(), LedState::Off);
        assert_eq!(decode_status(&[0x03]).unwrap(), LedState::On);
        assert!(decode_status(&[]).is_err());
    }
}
