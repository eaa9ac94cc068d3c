//! Command-line operations
//!
//! Each [`Command`] runs one device operation and renders the one-line result
//! the tool prints.

use crate::error::Result;
use crate::usb::{DeviceSession, Transport};
use clap::ValueEnum;
use rand::RngCore;

/// Operation selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Command {
    /// Run the echo test
    Echo,
    /// Switch the LED on
    On,
    /// Switch the LED off
    Off,
    /// Show the LED state
    Status,
    /// Measure temperature
    Temp,
    /// Compute the dew point
    Dew,
    /// Measure relative humidity
    Hum,
}

impl Command {
    /// Execute the command and return the line to print
    ///
    /// `echo_count` and `rng` are only used by [`Command::Echo`].
    pub fn run<T: Transport>(
        self,
        session: &mut DeviceSession<T>,
        echo_count: u32,
        rng: &mut dyn RngCore,
    ) -> Result<String> {
        let line = match self {
            Command::Echo => {
                session.echo_test(echo_count, rng)?;
                "Echo test successful!".to_string()
            }
            Command::On => {
                session.led_on()?;
                "LED switched on".to_string()
            }
            Command::Off => {
                session.led_off()?;
                "LED switched off".to_string()
            }
            Command::Status => format!("LED is {}", session.led_status()?),
            Command::Temp => format!("Temperature : {:.2}", session.temperature()?),
            Command::Dew => format!("Dew Point : {:.2}", session.dew_point()?),
            Command::Hum => format!("Relative Humidity : {:.2}", session.humidity()?),
        };
        Ok(line)
    }
}
