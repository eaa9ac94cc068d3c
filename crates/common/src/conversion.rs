//! Raw sensor code to physical unit conversion
//!
//! Coefficients are the SHT1x datasheet values for a 5 V supply. The
//! temperature and compensation terms assume 14-bit resolution, the linear
//! humidity curve 12-bit resolution. They are fixed calibration constants.
//!
//! All functions here are pure: no I/O, no cached readings.

use crate::{Error, Result};

/// Temperature offset `d1` in °C (Vdd = 5 V)
pub const D1: f64 = -40.1;
/// Temperature slope `d2` in °C per count (14-bit)
pub const D2: f64 = 0.01;

/// Linear humidity curve, constant term (12-bit)
pub const C1: f64 = -4.0;
/// Linear humidity curve, first order term (12-bit)
pub const C2: f64 = 0.0405;
/// Linear humidity curve, second order term (12-bit)
pub const C3: f64 = -2.8e-6;

/// Temperature compensation, constant term (14-bit)
pub const T1: f64 = 0.01;
/// Temperature compensation, first order term (14-bit)
pub const T2: f64 = 0.00008;

/// Lowest relative humidity reported
pub const HUMIDITY_MIN: f64 = 0.1;
/// Highest relative humidity reported
pub const HUMIDITY_MAX: f64 = 100.0;

/// Magnus coefficient `b`
const MAGNUS_B: f64 = 17.62;
/// Magnus coefficient `c` in °C
const MAGNUS_C: f64 = 243.12;
/// log10(e), turns a decimal logarithm into a natural one
const LOG10_E: f64 = 0.4343;

/// Convert a raw temperature code to °C
///
/// `T = d1 + d2 * raw`
///
/// # Example
/// ```
/// use common::temperature_from_raw;
///
/// assert!((temperature_from_raw(6510) - 25.0).abs() < 1e-9);
/// ```
pub fn temperature_from_raw(raw: u16) -> f64 {
    D1 + D2 * f64::from(raw)
}

/// Convert a raw humidity code to temperature-compensated %RH
///
/// The result is cut to the physically possible range `[0.1, 100]`; values
/// inside the range are returned unmodified.
pub fn humidity_from_raw(raw: u16, temperature_c: f64) -> f64 {
    let raw = f64::from(raw);
    let linear = C1 + C2 * raw + C3 * raw * raw;
    let corrected = (temperature_c - 25.0) * (T1 + T2 * raw) + linear;

    // A NaN temperature would otherwise escape both bounds
    if corrected.is_nan() {
        return HUMIDITY_MIN;
    }
    if corrected > HUMIDITY_MAX {
        HUMIDITY_MAX
    } else if corrected < HUMIDITY_MIN {
        HUMIDITY_MIN
    } else {
        corrected
    }
}

/// Dew point in °C from temperature and relative humidity (Magnus formula)
///
/// ```text
/// k  = (log10(RH) - 2) / 0.4343 + (17.62 * T) / (243.12 + T)
/// Td = 243.12 * k / (17.62 - k)
/// ```
///
/// Fails with [`Error::Domain`] when the humidity is not positive, an input is
/// not finite, or the formula has no finite result.
pub fn dew_point(temperature_c: f64, humidity_pct: f64) -> Result<f64> {
    if !temperature_c.is_finite() || !humidity_pct.is_finite() {
        return Err(Error::Domain(format!(
            "dew point undefined for T={} °C, RH={} %",
            temperature_c, humidity_pct
        )));
    }
    if humidity_pct <= 0.0 {
        return Err(Error::Domain(format!(
            "dew point requires positive humidity, got {} %RH",
            humidity_pct
        )));
    }

    let k = (humidity_pct.log10() - 2.0) / LOG10_E
        + (MAGNUS_B * temperature_c) / (MAGNUS_C + temperature_c);
    let dew_point = MAGNUS_C * k / (MAGNUS_B - k);

    if !dew_point.is_finite() {
        return Err(Error::Domain(format!(
            "dew point diverges for T={} °C, RH={} %",
            temperature_c, humidity_pct
        )));
    }
    Ok(dew_point)
}
