//! USB subsystem
//!
//! Opens the sensor and executes its control transfers.
//!
//! This module is split into:
//! - `transport`: the transport seam and its rusb implementation
//! - `session`: the device operations built on top of a transport
//!
//! All transfers are synchronous and blocking. A session owns its transport
//! exclusively; callers that share one across threads must lock around it.

pub mod session;
pub mod transport;

pub use session::{DEFAULT_ECHO_COUNT, DeviceSession, EchoReport};
pub use transport::{
    DEFAULT_TIMEOUT, RusbProvider, RusbTransport, Transport, TransportProvider, map_rusb_error,
    map_transport_error,
};
