//! Detached hardware adapter.

use switchapi_types::{PacketType, PortType, SwitchDevice};

use crate::api::{PortPd, StormControlPd};
use crate::error::SwitchResult;
use crate::meter::MeterInfo;
use crate::types::{IngressPortEntries, LagGroupEntry, PdHandle};

/// Adapter for builds and environments with no ASIC attached.
///
/// Every call succeeds without programming anything and returns INVALID
/// entry handles, so no port ever looks bound to hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPd;

impl NoopPd {
    pub fn new() -> Self {
        NoopPd
    }
}

impl PortPd for NoopPd {
    fn is_attached(&self) -> bool {
        false
    }

    fn add_lag_group_entry(
        &self,
        _device: SwitchDevice,
        _ifindex: u32,
        _port_id: u32,
    ) -> SwitchResult<LagGroupEntry> {
        Ok(LagGroupEntry::default())
    }

    fn delete_lag_group_entry(&self, _device: SwitchDevice, _entry: PdHandle) -> SwitchResult<()> {
        Ok(())
    }

    fn add_ingress_mapping_entry(
        &self,
        _device: SwitchDevice,
        _port_id: u32,
        _ifindex: u32,
        _port_type: PortType,
    ) -> SwitchResult<IngressPortEntries> {
        Ok([PdHandle::INVALID; 2])
    }

    fn delete_ingress_mapping_entry(
        &self,
        _device: SwitchDevice,
        _entries: &IngressPortEntries,
    ) -> SwitchResult<()> {
        Ok(())
    }

    fn add_egress_mapping_entry(
        &self,
        _device: SwitchDevice,
        _port_id: u32,
        _ifindex: u32,
        _port_type: PortType,
    ) -> SwitchResult<PdHandle> {
        Ok(PdHandle::INVALID)
    }
}

impl StormControlPd for NoopPd {
    fn add_storm_control_entry(
        &self,
        _device: SwitchDevice,
        _port_id: u32,
        _rate: u32,
        _pkt_type: PacketType,
        _meter_id: u32,
    ) -> SwitchResult<PdHandle> {
        Ok(PdHandle::INVALID)
    }

    fn delete_storm_control_entry(
        &self,
        _device: SwitchDevice,
        _entry: PdHandle,
    ) -> SwitchResult<()> {
        Ok(())
    }

    fn refresh_storm_control_stats(
        &self,
        _device: SwitchDevice,
        _meter: &mut MeterInfo,
    ) -> SwitchResult<()> {
        Ok(())
    }
}
