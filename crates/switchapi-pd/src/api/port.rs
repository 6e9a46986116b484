//! Port mapping and lag-group table calls.

use switchapi_types::{PortType, SwitchDevice};

use crate::error::SwitchResult;
use crate::types::{IngressPortEntries, LagGroupEntry, PdHandle};

/// Hardware calls programming a port's mapping and lag-group entries.
pub trait PortPd: Send + Sync {
    /// Returns false when no hardware is attached.
    ///
    /// Port bring-up skips table programming entirely on a detached adapter
    /// and leaves every entry handle INVALID.
    fn is_attached(&self) -> bool {
        true
    }

    /// Adds the port to the lag-group table as a single-member group.
    fn add_lag_group_entry(
        &self,
        device: SwitchDevice,
        ifindex: u32,
        port_id: u32,
    ) -> SwitchResult<LagGroupEntry>;

    /// Removes a lag-group table entry.
    fn delete_lag_group_entry(&self, device: SwitchDevice, entry: PdHandle) -> SwitchResult<()>;

    /// Programs the ingress port mapping (port -> ifindex, port type).
    fn add_ingress_mapping_entry(
        &self,
        device: SwitchDevice,
        port_id: u32,
        ifindex: u32,
        port_type: PortType,
    ) -> SwitchResult<IngressPortEntries>;

    /// Removes both ingress port mapping entries.
    fn delete_ingress_mapping_entry(
        &self,
        device: SwitchDevice,
        entries: &IngressPortEntries,
    ) -> SwitchResult<()>;

    /// Programs the egress port mapping.
    fn add_egress_mapping_entry(
        &self,
        device: SwitchDevice,
        port_id: u32,
        ifindex: u32,
        port_type: PortType,
    ) -> SwitchResult<PdHandle>;
}
