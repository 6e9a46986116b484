//! Per-port record.

use switchapi_pd::{IngressPortEntries, PdHandle};
use switchapi_types::{ApiPortInfo, HandleType, PacketType, PortType, SwitchHandle};

/// Software-side state of one port (`switch_port_info_t`).
///
/// Every PD handle starts out INVALID and only holds a real entry handle
/// while the corresponding hardware rule is programmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortRecord {
    /// Dense index, fixed for the life of the table.
    pub id: u32,
    /// External interface number, `id + 1`.
    pub ifindex: u32,
    pub port_type: PortType,
    /// Handle minted for this port at bring-up.
    pub port_handle: SwitchHandle,
    /// LAG this port is a member of, NULL when standalone.
    pub lag_handle: SwitchHandle,
    /// Ingress port mapping entries.
    pub hw_entry: IngressPortEntries,
    /// Egress port mapping entry.
    pub eg_port_entry: PdHandle,
    /// Lag-group table entry.
    pub lg_entry: PdHandle,
    /// Lag selector member handle.
    pub mbr_hdl: PdHandle,
    /// Bound storm-control meter per packet type, NULL when unbound.
    pub meter_handle: [SwitchHandle; PacketType::COUNT],
    /// Storm-control entry per packet type.
    pub meter_pd_hdl: [PdHandle; PacketType::COUNT],
    /// Public configuration, stored verbatim.
    pub api_port_info: ApiPortInfo,
}

impl PortRecord {
    /// Creates the bring-up state of port `id`.
    pub fn new(id: u32, port_type: PortType) -> Self {
        let port_handle = SwitchHandle::new(HandleType::Port, id);
        Self {
            id,
            ifindex: id + 1,
            port_type,
            port_handle,
            api_port_info: ApiPortInfo::new(port_handle),
            ..Default::default()
        }
    }

    pub fn is_cpu(&self) -> bool {
        self.port_type.is_cpu()
    }

    pub fn is_lag_member(&self) -> bool {
        !self.lag_handle.is_null()
    }

    /// Meter bound for `pkt_type`, NULL when unbound.
    pub fn storm_control_meter(&self, pkt_type: PacketType) -> SwitchHandle {
        self.meter_handle[pkt_type.index()]
    }

    /// Storm-control entry programmed for `pkt_type`.
    pub fn storm_control_entry(&self, pkt_type: PacketType) -> PdHandle {
        self.meter_pd_hdl[pkt_type.index()]
    }

    /// True if any of the port's mapping or lag-group rules is programmed.
    pub fn has_hw_entries(&self) -> bool {
        self.hw_entry.iter().any(PdHandle::is_valid)
            || self.eg_port_entry.is_valid()
            || self.lg_entry.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_record() {
        let record = PortRecord::new(5, PortType::Normal);
        assert_eq!(record.id, 5);
        assert_eq!(record.ifindex, 6);
        assert_eq!(record.port_handle, SwitchHandle::new(HandleType::Port, 5));
        assert_eq!(record.api_port_info.port_number, record.port_handle);
        assert!(!record.is_lag_member());
        assert!(!record.has_hw_entries());
    }

    #[test]
    fn test_pd_handles_start_invalid() {
        let record = PortRecord::new(0, PortType::Cpu);
        assert!(record.is_cpu());
        assert_eq!(record.hw_entry, [PdHandle::INVALID; 2]);
        assert_eq!(record.eg_port_entry, PdHandle::INVALID);
        for pkt_type in PacketType::ALL {
            assert!(record.storm_control_meter(pkt_type).is_null());
            assert!(!record.storm_control_entry(pkt_type).is_valid());
        }
    }

    #[test]
    fn test_sentinel_default() {
        let sentinel = PortRecord::default();
        assert_eq!(sentinel.id, 0);
        assert_eq!(sentinel.ifindex, 0);
        assert!(sentinel.port_handle.is_null());
    }
}
