//! Test utilities for usbsht
//!
//! Provides a simulated sensor that answers control transfers the way the
//! device firmware does, plus a simulated bus to open it from.
//!
//! # Example
//!
//! ```
//! use usbsht::DeviceSession;
//! use usbsht::test_utils::{SimulatedBus, SimulatedDevice};
//!
//! let device = SimulatedDevice::new();
//! let bus = SimulatedBus::new().with_device(0x16c0, 0x05dc, device.clone());
//!
//! let mut session = DeviceSession::open(&bus, 0x16c0, 0x05dc).unwrap();
//! session.led_on().unwrap();
//! assert!(device.led());
//! ```

use crate::error::{Result, SensorError};
use crate::usb::{Transport, TransportProvider};
use protocol::{ControlTransferParams, Direction, RequestCode, TransportError};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Debug, Default)]
struct DeviceState {
    led: bool,
    raw_temperature: u16,
    raw_humidity: u16,
    /// Echo transfer ordinals (0-based) whose reply gets corrupted
    corrupt_echoes: BTreeSet<u32>,
    echoes_seen: u32,
    /// Drop the last byte of every IN reply
    short_replies: bool,
    /// Error returned by the next transfer
    fail_next: Option<TransportError>,
    /// Error returned when selecting the configuration during open
    fail_configuration: Option<TransportError>,
    open_handles: usize,
    transfers: Vec<ControlTransferParams>,
}

/// Simulated USB-SHT sensor
///
/// Clones share the same state, so a test can keep one clone to inspect the
/// device while a session drives another.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDevice {
    state: Rc<RefCell<DeviceState>>,
}

impl SimulatedDevice {
    /// Create a device with the LED off and zeroed readings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw code returned by `GET_TEMPERATURE`
    pub fn with_temperature_raw(self, raw: u16) -> Self {
        self.state.borrow_mut().raw_temperature = raw;
        self
    }

    /// Set the raw code returned by `GET_HUMIDITY`
    pub fn with_humidity_raw(self, raw: u16) -> Self {
        self.state.borrow_mut().raw_humidity = raw;
        self
    }

    /// Corrupt the reply of the given echo transfers (0-based)
    pub fn with_corrupt_echoes(self, ordinals: impl IntoIterator<Item = u32>) -> Self {
        self.state.borrow_mut().corrupt_echoes.extend(ordinals);
        self
    }

    /// Truncate every IN reply by one byte
    pub fn with_short_replies(self) -> Self {
        self.state.borrow_mut().short_replies = true;
        self
    }

    /// Fail configuration selection when the device is opened
    pub fn with_configuration_failure(self, error: TransportError) -> Self {
        self.state.borrow_mut().fail_configuration = Some(error);
        self
    }

    /// Fail the next transfer with `error`
    pub fn fail_next(&self, error: TransportError) {
        self.state.borrow_mut().fail_next = Some(error);
    }

    /// Current LED state
    pub fn led(&self) -> bool {
        self.state.borrow().led
    }

    /// Number of open handles to this device
    pub fn open_handles(&self) -> usize {
        self.state.borrow().open_handles
    }

    /// All transfers received so far, in order
    pub fn transfers(&self) -> Vec<ControlTransferParams> {
        self.state.borrow().transfers.clone()
    }

    /// Produce the reply the firmware would send
    fn respond(
        &self,
        params: &ControlTransferParams,
    ) -> std::result::Result<Vec<u8>, TransportError> {
        let mut state = self.state.borrow_mut();
        state.transfers.push(*params);

        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }

        let mut reply = match params.request {
            RequestCode::Echo => {
                let mut buffer = Vec::with_capacity(4);
                buffer.extend_from_slice(&params.value.to_le_bytes());
                buffer.extend_from_slice(&params.index.to_le_bytes());

                let ordinal = state.echoes_seen;
                state.echoes_seen += 1;
                if state.corrupt_echoes.contains(&ordinal) {
                    buffer[0] ^= 0xff;
                }
                buffer
            }
            RequestCode::SetStatus => {
                state.led = params.value & 1 != 0;
                Vec::new()
            }
            RequestCode::GetStatus => vec![u8::from(state.led)],
            RequestCode::GetTemperature => state.raw_temperature.to_be_bytes().to_vec(),
            RequestCode::GetHumidity => state.raw_humidity.to_be_bytes().to_vec(),
        };

        if params.direction == Direction::Out {
            return Ok(Vec::new());
        }

        // The driver never sends more than wLength
        reply.truncate(params.expected_length as usize);
        if state.short_replies {
            reply.pop();
        }
        Ok(reply)
    }
}

/// Open handle to a [`SimulatedDevice`]
///
/// Counts as open until dropped.
#[derive(Debug)]
pub struct SimulatedHandle {
    device: SimulatedDevice,
}

impl Transport for SimulatedHandle {
    fn transfer(
        &mut self,
        params: &ControlTransferParams,
        _data: &[u8],
    ) -> std::result::Result<Vec<u8>, TransportError> {
        self.device.respond(params)
    }
}

impl Drop for SimulatedHandle {
    fn drop(&mut self) {
        self.device.state.borrow_mut().open_handles -= 1;
    }
}

/// Simulated bus holding devices by vendor/product ID
#[derive(Debug, Default)]
pub struct SimulatedBus {
    devices: Vec<(u16, u16, SimulatedDevice)>,
}

impl SimulatedBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a device
    pub fn with_device(
        mut self,
        vendor_id: u16,
        product_id: u16,
        device: SimulatedDevice,
    ) -> Self {
        self.devices.push((vendor_id, product_id, device));
        self
    }
}

impl TransportProvider for SimulatedBus {
    type Transport = SimulatedHandle;

    fn open(&self, vendor_id: u16, product_id: u16) -> Result<SimulatedHandle> {
        let device = self
            .devices
            .iter()
            .find(|(vid, pid, _)| *vid == vendor_id && *pid == product_id)
            .map(|(_, _, device)| device.clone())
            .ok_or(SensorError::DeviceNotFound {
                vendor_id,
                product_id,
            })?;

        device.state.borrow_mut().open_handles += 1;
        let handle = SimulatedHandle { device };

        // Dropping `handle` on this path releases it
        let failure = handle.device.state.borrow_mut().fail_configuration.take();
        if let Some(error) = failure {
            return Err(SensorError::from(error));
        }

        Ok(handle)
    }
}
