//! Wire protocol for the USB-SHT sensor
//!
//! This crate describes the vendor-class control transfers understood by the
//! sensor firmware and converts between logical requests and the raw bytes
//! exchanged on endpoint 0. It has no USB dependency: a transport executes
//! the [`ControlTransferParams`] produced here and hands the reply back for
//! decoding.
//!
//! # Example
//!
//! ```
//! use protocol::{RequestCode, decode_word, encode_get, validate_length};
//!
//! // Read the raw temperature code
//! let params = encode_get(RequestCode::GetTemperature, 0, 0, 2);
//! assert_eq!(params.request_type(), 0xC0);
//!
//! // The sensor answers high byte first
//! let reply = [0x19, 0x64];
//! validate_length(&params, &reply).unwrap();
//! assert_eq!(decode_word(&reply, 0).unwrap(), 0x1964);
//! ```

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{
    REQUEST_TYPE_IN, REQUEST_TYPE_OUT, decode_status, decode_word, decode_word_le, encode_get,
    encode_set, validate_length,
};
pub use error::{ProtocolError, Result};
pub use types::{
    ControlTransferParams, DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID, Direction, LedState,
    RequestCode, TransportError,
};
