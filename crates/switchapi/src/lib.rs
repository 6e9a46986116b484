//! switchapi port control plane.
//!
//! Owns the table of physical ports of a switching ASIC, resolves opaque
//! port handles to port records, and keeps the hardware port tables
//! (lag-group, ingress/egress port mapping, storm control) in sync with the
//! records through the [`switchapi_pd`] adapter contract.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use switchapi::port::{PortManager, PortManagerConfig};
//! use switchapi_pd::{MeterTable, SimulatedPd};
//! use switchapi_types::{HandleType, PacketType, SwitchHandle};
//!
//! let manager = PortManager::new(
//!     PortManagerConfig::default(),
//!     Arc::new(SimulatedPd::new()),
//!     Arc::new(MeterTable::new()),
//! )
//! .unwrap();
//! manager.init(0).unwrap();
//!
//! let port = SwitchHandle::new(HandleType::Port, 5);
//! let meter = SwitchHandle::new(HandleType::Meter, 1);
//! manager
//!     .storm_control_set(0, port, PacketType::Broadcast, meter)
//!     .unwrap();
//! assert_eq!(
//!     manager.storm_control_get(0, port, PacketType::Broadcast).unwrap(),
//!     meter
//! );
//! ```

pub mod config;
pub mod port;

pub use config::{ConfigError, HardwareMode, SwitchApiConfig};
pub use port::{PortManager, PortManagerConfig};
