//! Hardware table contract for the switchapi port control plane.
//!
//! The port control plane never programs the ASIC itself. Every table
//! mutation goes through the narrow PD ("program dependent") contract
//! defined here, so the same control-plane code runs against real hardware,
//! the in-memory [`SimulatedPd`], or the [`NoopPd`] stub.
//!
//! # Architecture
//!
//! - [`error`]: switchapi status codes and the error type built on them
//! - [`types`]: hardware table-entry handles
//! - [`api`]: the adapter traits ([`PortPd`], [`StormControlPd`], [`SwitchPd`])
//! - [`meter`]: the meter subsystem contract used for storm-control stats
//!
//! # Example
//!
//! ```
//! use switchapi_pd::{PdHandle, PortPd, SimulatedPd};
//! use switchapi_types::PortType;
//!
//! let pd = SimulatedPd::new();
//! let entries = pd
//!     .add_ingress_mapping_entry(0, 3, 4, PortType::Normal)
//!     .unwrap();
//! assert!(entries.iter().all(PdHandle::is_valid));
//! ```

pub mod api;
pub mod error;
pub mod meter;
pub mod sim;
pub mod stub;
pub mod types;

pub use api::{PortPd, StormControlPd, SwitchPd};
pub use error::{SwitchError, SwitchResult, SwitchStatus, SwitchStatusExt};
pub use meter::{MeterInfo, MeterLookup, MeterStatsId, MeterTable, SwitchCounter};
pub use sim::{PdTable, SimEntry, SimulatedPd};
pub use stub::NoopPd;
pub use types::{IngressPortEntries, LagGroupEntry, PdHandle, RawPdHandle};
