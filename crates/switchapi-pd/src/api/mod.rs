//! Hardware table adapter traits.
//!
//! A port participates in four hardware tables. The calls are split by
//! concern:
//!
//! - [`port`]: lag-group membership and ingress/egress port mapping
//! - [`storm_control`]: storm-control policing entries and meter stats
//!
//! Calls are synchronous round trips. Deletes are idempotent: deleting an
//! entry that is not programmed succeeds.

pub mod port;
pub mod storm_control;

pub use port::PortPd;
pub use storm_control::StormControlPd;

/// The full hardware contract a port manager needs.
pub trait SwitchPd: PortPd + StormControlPd {}

impl<T: PortPd + StormControlPd + ?Sized> SwitchPd for T {}
