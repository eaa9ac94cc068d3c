//! Device session
//!
//! A [`DeviceSession`] is either open, holding its transport, or closed. It
//! maps each device operation onto one or more control transfers and turns
//! the replies into physical values.

use crate::error::{Result, SensorError};
use crate::usb::transport::{Transport, TransportProvider};
use common::conversion;
use protocol::{
    ControlTransferParams, LedState, RequestCode, decode_status, decode_word, decode_word_le,
    encode_get, encode_set, validate_length,
};
use rand::Rng;
use tracing::{debug, info, warn};

/// Number of echo transfers in a default echo test
pub const DEFAULT_ECHO_COUNT: u32 = 100;

/// Outcome of a successful echo test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoReport {
    /// Echo transfers issued
    pub total: u32,
    /// Transfers whose reply did not match
    pub mismatches: u32,
}

/// Open connection to one sensor
pub struct DeviceSession<T: Transport> {
    transport: Option<T>,
}

impl<T: Transport> DeviceSession<T> {
    /// Open the first device matching `vendor_id`/`product_id`
    pub fn open<P>(provider: &P, vendor_id: u16, product_id: u16) -> Result<Self>
    where
        P: TransportProvider<Transport = T>,
    {
        let transport = provider.open(vendor_id, product_id)?;
        info!("Session opened on {:04x}:{:04x}", vendor_id, product_id);
        Ok(Self::from_transport(transport))
    }

    /// Wrap an already open transport
    pub fn from_transport(transport: T) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    /// Check if the session is open
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Release the transport
    ///
    /// Later operations fail with [`SensorError::SessionClosed`]. Closing a
    /// closed session does nothing.
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            info!("Session closed");
        }
    }

    /// Send random words and check the device echoes them back unchanged
    ///
    /// Every iteration is run; the test fails with
    /// [`SensorError::EchoTestFailed`] if any reply differed.
    pub fn echo_test<R: Rng + ?Sized>(&mut self, count: u32, rng: &mut R) -> Result<EchoReport> {
        let mut mismatches = 0u32;

        for i in 0..count {
            let value: u16 = rng.random();
            let index: u16 = rng.random();

            let reply = self.get(RequestCode::Echo, value, index, 4)?;
            let echo_value = decode_word_le(&reply, 0)?;
            let echo_index = decode_word_le(&reply, 2)?;

            if echo_value != value || echo_index != index {
                mismatches += 1;
                warn!(
                    "Echo {} mismatch: sent ({:#06x}, {:#06x}), got ({:#06x}, {:#06x})",
                    i, value, index, echo_value, echo_index
                );
            }
        }

        if mismatches > 0 {
            return Err(SensorError::EchoTestFailed {
                mismatches,
                total: count,
            });
        }

        debug!("Echo test passed ({} transfers)", count);
        Ok(EchoReport {
            total: count,
            mismatches,
        })
    }

    /// Switch the LED on
    pub fn led_on(&mut self) -> Result<()> {
        self.set_led(LedState::On)
    }

    /// Switch the LED off
    pub fn led_off(&mut self) -> Result<()> {
        self.set_led(LedState::Off)
    }

    /// Set the LED state
    pub fn set_led(&mut self, state: LedState) -> Result<()> {
        self.set(RequestCode::SetStatus, u16::from(state.is_on()), 0)
    }

    /// Read the LED state
    pub fn led_status(&mut self) -> Result<LedState> {
        let reply = self.get(RequestCode::GetStatus, 0, 0, 1)?;
        Ok(decode_status(&reply)?)
    }

    /// Measure the temperature in °C
    pub fn temperature(&mut self) -> Result<f64> {
        let raw = self.read_raw(RequestCode::GetTemperature)?;
        let temperature = conversion::temperature_from_raw(raw);
        debug!("Temperature raw={} -> {:.2} °C", raw, temperature);
        Ok(temperature)
    }

    /// Measure the relative humidity in %RH
    ///
    /// Takes a fresh temperature measurement for the compensation.
    pub fn humidity(&mut self) -> Result<f64> {
        let raw = self.read_raw(RequestCode::GetHumidity)?;
        let temperature = self.temperature()?;
        let humidity = conversion::humidity_from_raw(raw, temperature);

        if humidity == conversion::HUMIDITY_MIN || humidity == conversion::HUMIDITY_MAX {
            warn!(
                "Humidity raw={} at {:.2} °C clamped to {} %RH",
                raw, temperature, humidity
            );
        } else {
            debug!("Humidity raw={} -> {:.2} %RH", raw, humidity);
        }
        Ok(humidity)
    }

    /// Compute the dew point in °C from fresh temperature and humidity readings
    pub fn dew_point(&mut self) -> Result<f64> {
        let temperature = self.temperature()?;
        let humidity = self.humidity()?;
        Ok(conversion::dew_point(temperature, humidity)?)
    }

    fn read_raw(&mut self, request: RequestCode) -> Result<u16> {
        let reply = self.get(request, 0, 0, 2)?;
        Ok(decode_word(&reply, 0)?)
    }

    fn set(&mut self, request: RequestCode, value: u16, index: u16) -> Result<()> {
        let params = encode_set(request, value, index);
        self.execute(&params)?;
        Ok(())
    }

    fn get(
        &mut self,
        request: RequestCode,
        value: u16,
        index: u16,
        length: u16,
    ) -> Result<Vec<u8>> {
        let params = encode_get(request, value, index, length);
        let reply = self.execute(&params)?;
        validate_length(&params, &reply)?;
        Ok(reply)
    }

    fn execute(&mut self, params: &ControlTransferParams) -> Result<Vec<u8>> {
        let transport = self.transport.as_mut().ok_or(SensorError::SessionClosed)?;

        debug!(
            "Control transfer: request_type={:#x}, request={:#x}, value={:#x}, index={:#x}, length={}",
            params.request_type(),
            params.request.code(),
            params.value,
            params.index,
            params.expected_length
        );

        Ok(transport.transfer(params, &[])?)
    }
}

impl<T: Transport> Drop for DeviceSession<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::TransportError;

    /// Transport that replays canned replies
    struct Scripted {
        replies: Vec<std::result::Result<Vec<u8>, TransportError>>,
        sent: Vec<ControlTransferParams>,
    }

    impl Scripted {
        fn new(mut replies: Vec<std::result::Result<Vec<u8>, TransportError>>) -> Self {
            replies.reverse();
            Self {
                replies,
                sent: Vec::new(),
            }
        }
    }

    impl Transport for Scripted {
        fn transfer(
            &mut self,
            params: &ControlTransferParams,
            _data: &[u8],
        ) -> std::result::Result<Vec<u8>, TransportError> {
            self.sent.push(*params);
            self.replies.pop().unwrap_or(Ok(Vec::new()))
        }
    }

    #[test]
    fn test_temperature_decodes_big_endian() {
        let mut session =
            DeviceSession::from_transport(Scripted::new(vec![Ok(vec![0x00, 0x01])]));
        let t = session.temperature().unwrap();
        assert!((t - (-40.09)).abs() < 1e-9);
    }

    #[test]
    fn test_short_reply_is_length_error() {
        let mut session = DeviceSession::from_transport(Scripted::new(vec![Ok(vec![0x19])]));
        assert!(matches!(
            session.temperature(),
            Err(SensorError::TransportLength {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_humidity_reads_humidity_then_temperature() {
        let mut session = DeviceSession::from_transport(Scripted::new(vec![
            Ok(2000u16.to_be_bytes().to_vec()),
            Ok(6510u16.to_be_bytes().to_vec()),
        ]));
        let rh = session.humidity().unwrap();
        assert!((rh - 65.8).abs() < 1e-6, "got {}", rh);

        let sent = &session.transport.as_ref().unwrap().sent;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].request, RequestCode::GetHumidity);
        assert_eq!(sent[1].request, RequestCode::GetTemperature);
    }

    #[test]
    fn test_timeout_propagates() {
        let mut session =
            DeviceSession::from_transport(Scripted::new(vec![Err(TransportError::Timeout)]));
        assert!(matches!(
            session.led_status(),
            Err(SensorError::TransportTimeout)
        ));
    }

    #[test]
    fn test_closed_session_rejects_operations() {
        let mut session = DeviceSession::from_transport(Scripted::new(vec![]));
        session.close();
        assert!(!session.is_open());
        assert!(matches!(session.led_on(), Err(SensorError::SessionClosed)));
        assert!(matches!(session.temperature(), Err(SensorError::SessionClosed)));
    }
}
