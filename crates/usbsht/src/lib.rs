//! Host driver for the USB-SHT temperature/humidity sensor
//!
//! The sensor is an SHT1x behind a V-USB firmware that answers vendor-class
//! control transfers. [`DeviceSession`] owns one open transport and exposes
//! the device operations: echo test, LED control, and temperature, humidity
//! and dew point readings.
//!
//! # Example
//!
//! ```
//! use usbsht::DeviceSession;
//! use usbsht::test_utils::{SimulatedBus, SimulatedDevice};
//! use protocol::{DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID};
//!
//! let device = SimulatedDevice::new().with_temperature_raw(6510);
//! let bus = SimulatedBus::new().with_device(DEFAULT_VENDOR_ID, DEFAULT_PRODUCT_ID, device);
//!
//! let mut session = DeviceSession::open(&bus, DEFAULT_VENDOR_ID, DEFAULT_PRODUCT_ID).unwrap();
//! let temperature = session.temperature().unwrap();
//! assert!((temperature - 25.0).abs() < 1e-9);
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod test_utils;
pub mod usb;

pub use command::Command;
pub use error::{Result, SensorError};
pub use usb::{
    DEFAULT_ECHO_COUNT, DeviceSession, EchoReport, RusbProvider, Transport, TransportProvider,
};
