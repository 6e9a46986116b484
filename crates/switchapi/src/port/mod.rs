//! Port control plane.
//!
//! ```text
//!   set / get / delete / storm_control_*
//!                 │
//!                 ▼
//!           PortManager ──> MeterLookup (storm-control stats)
//!                 │
//!      ┌──────────┴──────────┐
//!      ▼                     ▼
//!  PortTable              SwitchPd
//!  (records + sentinels)  (lag group, ingress/egress mapping, storm control)
//! ```

pub mod ffi;
mod manager;
mod record;
mod table;

pub use manager::{
    PortManager, PortManagerConfig, PortManagerStats, PortSnapshot, StormControlBinding,
    DEFAULT_CPU_PORT, DEFAULT_MAX_PORTS, DEFAULT_NULL_PORT, STORM_CONTROL_DEFAULT_RATE,
};
pub use record::PortRecord;
pub use table::{InitReport, PortSlot, PortTable, ResolvedPort};
