//! Common utilities for usbsht
//!
//! This crate provides the functionality shared by the driver library and the
//! command-line tool: conversion of raw SHT1x codes into physical quantities,
//! error handling, and logging setup.

pub mod conversion;
pub mod error;
pub mod logging;

pub use conversion::{dew_point, humidity_from_raw, temperature_from_raw};
pub use error::{Error, Result};
pub use logging::setup_logging;
