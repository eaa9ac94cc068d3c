//! USB control transfer execution
//!
//! [`Transport`] is the seam between the device session and the bus: it runs
//! one vendor control transfer and returns the reply bytes. [`RusbProvider`]
//! opens the sensor through libusb and hands out a [`RusbTransport`].

use crate::error::{Result, SensorError};
use protocol::{ControlTransferParams, TransportError};
use rusb::{Context, DeviceHandle, UsbContext};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for USB transfers (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A single exclusively owned channel to the device's control endpoint
pub trait Transport {
    /// Execute one control transfer
    ///
    /// IN transfers return the bytes read (at most `expected_length`). OUT
    /// transfers send `data` and return an empty vector.
    fn transfer(
        &mut self,
        params: &ControlTransferParams,
        data: &[u8],
    ) -> std::result::Result<Vec<u8>, TransportError>;
}

/// Locates a device by vendor/product ID and opens a transport to it
pub trait TransportProvider {
    type Transport: Transport;

    /// Open the device and select its configuration
    ///
    /// Fails with [`SensorError::DeviceNotFound`] if nothing matches. Anything
    /// acquired before a later step fails is released before returning.
    fn open(&self, vendor_id: u16, product_id: u16) -> Result<Self::Transport>;
}

/// libusb-backed transport provider
pub struct RusbProvider {
    context: Context,
    timeout: Duration,
    configuration: u8,
}

impl RusbProvider {
    /// Create a provider with its own libusb context
    pub fn new(timeout: Duration, configuration: u8) -> Result<Self> {
        let context = Context::new().map_err(map_rusb_error)?;
        Ok(Self {
            context,
            timeout,
            configuration,
        })
    }
}

impl TransportProvider for RusbProvider {
    type Transport = RusbTransport;

    fn open(&self, vendor_id: u16, product_id: u16) -> Result<RusbTransport> {
        let handle = self
            .context
            .open_device_with_vid_pid(vendor_id, product_id)
            .ok_or(SensorError::DeviceNotFound {
                vendor_id,
                product_id,
            })?;

        debug!("Opened device {:04x}:{:04x}", vendor_id, product_id);

        // Not supported on every platform; control transfers to the device
        // recipient work without it.
        if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
            debug!("Kernel driver auto-detach unavailable: {}", e);
        }

        // Only switch configuration when needed, re-setting the active one
        // resets the device on some hosts.
        let active = handle.active_configuration().unwrap_or(0);
        if active != self.configuration {
            handle
                .set_active_configuration(self.configuration)
                .map_err(|e| {
                    warn!(
                        "Failed to set configuration {} on {:04x}:{:04x}: {}",
                        self.configuration, vendor_id, product_id, e
                    );
                    map_rusb_error(e)
                })?;
        }

        info!(
            "Device {:04x}:{:04x} ready (configuration {})",
            vendor_id, product_id, self.configuration
        );

        Ok(RusbTransport {
            handle,
            timeout: self.timeout,
        })
    }
}

/// Open libusb handle to the sensor
///
/// Dropping it closes the handle.
pub struct RusbTransport {
    handle: DeviceHandle<Context>,
    timeout: Duration,
}

impl Transport for RusbTransport {
    fn transfer(
        &mut self,
        params: &ControlTransferParams,
        data: &[u8],
    ) -> std::result::Result<Vec<u8>, TransportError> {
        let request_type = params.request_type();
        let request = params.request.code();

        let result = if params.is_in() {
            let mut buffer = vec![0u8; params.expected_length as usize];
            self.handle
                .read_control(
                    request_type,
                    request,
                    params.value,
                    params.index,
                    &mut buffer,
                    self.timeout,
                )
                .map(|len| {
                    buffer.truncate(len);
                    buffer
                })
        } else {
            self.handle
                .write_control(
                    request_type,
                    request,
                    params.value,
                    params.index,
                    data,
                    self.timeout,
                )
                .map(|_len| Vec::new())
        };

        result.map_err(|e| {
            warn!("Control transfer failed: {}", e);
            map_transport_error(e)
        })
    }
}

/// Map rusb::Error to the driver's transport error
pub fn map_transport_error(err: rusb::Error) -> TransportError {
    match err {
        rusb::Error::Timeout => TransportError::Timeout,
        rusb::Error::Pipe => TransportError::Pipe,
        rusb::Error::NoDevice => TransportError::NoDevice,
        rusb::Error::NotFound => TransportError::NotFound,
        rusb::Error::Busy => TransportError::Busy,
        rusb::Error::Overflow => TransportError::Overflow,
        rusb::Error::Io => TransportError::Io,
        rusb::Error::InvalidParam => TransportError::InvalidParam,
        rusb::Error::Access => TransportError::Access,
        _ => TransportError::Other {
            message: err.to_string(),
        },
    }
}

/// Map rusb::Error straight to a session error
pub fn map_rusb_error(err: rusb::Error) -> SensorError {
    SensorError::from(map_transport_error(err))
}
