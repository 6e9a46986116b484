//! In-memory ASIC model.
//!
//! [`SimulatedPd`] keeps one entry map per hardware table and hands out
//! entry handles from a shared allocator, the way the driver does. It backs
//! `switchapid --hardware simulated` and lets tests assert exactly what was
//! programmed. Failures can be injected per table.

use std::collections::{HashMap, HashSet};
use std::fmt;

use parking_lot::Mutex;
use tracing::debug;

use switchapi_types::{PacketType, PortType, SwitchDevice};

use crate::api::{PortPd, StormControlPd};
use crate::error::{SwitchError, SwitchResult, SwitchStatus};
use crate::meter::{MeterInfo, MeterStatsId, SwitchCounter};
use crate::types::{IngressPortEntries, LagGroupEntry, PdHandle, RawPdHandle};

/// Hardware tables a port is programmed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PdTable {
    LagGroup,
    IngressPortMapping,
    EgressPortMapping,
    StormControl,
}

impl PdTable {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PdTable::LagGroup => "lag_group",
            PdTable::IngressPortMapping => "ingress_port_mapping",
            PdTable::EgressPortMapping => "egress_port_mapping",
            PdTable::StormControl => "storm_control",
        }
    }
}

impl fmt::Display for PdTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One programmed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEntry {
    LagGroup {
        port_id: u32,
        ifindex: u32,
        member: PdHandle,
    },
    PortMapping {
        port_id: u32,
        ifindex: u32,
        port_type: PortType,
    },
    StormControl {
        port_id: u32,
        rate: u32,
        pkt_type: PacketType,
        meter_id: u32,
    },
}

#[derive(Debug, Default)]
struct SimState {
    next_handle: RawPdHandle,
    tables: HashMap<PdTable, HashMap<PdHandle, SimEntry>>,
    failing: HashSet<PdTable>,
    meter_counters: HashMap<u32, [SwitchCounter; MeterStatsId::COUNT]>,
}

impl SimState {
    /// Hands out the next entry handle. The INVALID value is never issued.
    fn alloc(&mut self, table: PdTable) -> SwitchResult<PdHandle> {
        let handle = PdHandle::from_raw(self.next_handle);
        if !handle.is_valid() {
            return Err(SwitchError::hardware(
                table.as_str(),
                SwitchStatus::InsufficientResources,
            ));
        }
        self.next_handle += 1;
        Ok(handle)
    }

    fn check(&self, table: PdTable) -> SwitchResult<()> {
        if self.failing.contains(&table) {
            Err(SwitchError::hardware(table.as_str(), SwitchStatus::HwFailure))
        } else {
            Ok(())
        }
    }

    fn insert(&mut self, table: PdTable, entry: SimEntry) -> SwitchResult<PdHandle> {
        let handle = self.alloc(table)?;
        debug!(%table, %handle, ?entry, "programmed entry");
        self.tables.entry(table).or_default().insert(handle, entry);
        Ok(handle)
    }

    fn remove(&mut self, table: PdTable, handle: PdHandle) {
        if !handle.is_valid() {
            return;
        }
        match self.tables.get_mut(&table).and_then(|t| t.remove(&handle)) {
            Some(_) => debug!(%table, %handle, "removed entry"),
            None => debug!(%table, %handle, "entry not programmed, nothing to remove"),
        }
    }
}

/// In-memory hardware adapter.
#[derive(Debug, Default)]
pub struct SimulatedPd {
    state: Mutex<SimState>,
}

impl SimulatedPd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent add/delete/refresh on `table` fail.
    pub fn fail_table(&self, table: PdTable) {
        self.state.lock().failing.insert(table);
    }

    pub fn clear_failures(&self) {
        self.state.lock().failing.clear();
    }

    /// Number of rules currently programmed in `table`.
    pub fn entry_count(&self, table: PdTable) -> usize {
        self.state.lock().tables.get(&table).map_or(0, HashMap::len)
    }

    /// Returns the rule behind `handle` in `table`, if programmed.
    pub fn entry(&self, table: PdTable, handle: PdHandle) -> Option<SimEntry> {
        self.state
            .lock()
            .tables
            .get(&table)
            .and_then(|t| t.get(&handle))
            .cloned()
    }

    /// Sets the hardware counter a later stats refresh will read for a meter.
    pub fn set_meter_counter(&self, meter_id: u32, id: MeterStatsId, counter: SwitchCounter) {
        let mut state = self.state.lock();
        let counters = state
            .meter_counters
            .entry(meter_id)
            .or_insert([SwitchCounter::default(); MeterStatsId::COUNT]);
        counters[id.index()] = counter;
    }
}

impl PortPd for SimulatedPd {
    fn add_lag_group_entry(
        &self,
        _device: SwitchDevice,
        ifindex: u32,
        port_id: u32,
    ) -> SwitchResult<LagGroupEntry> {
        let mut state = self.state.lock();
        state.check(PdTable::LagGroup)?;
        let member = state.alloc(PdTable::LagGroup)?;
        let group_entry = state.insert(
            PdTable::LagGroup,
            SimEntry::LagGroup {
                port_id,
                ifindex,
                member,
            },
        )?;
        Ok(LagGroupEntry {
            member,
            group_entry,
        })
    }

    fn delete_lag_group_entry(&self, _device: SwitchDevice, entry: PdHandle) -> SwitchResult<()> {
        let mut state = self.state.lock();
        state.check(PdTable::LagGroup)?;
        state.remove(PdTable::LagGroup, entry);
        Ok(())
    }

    fn add_ingress_mapping_entry(
        &self,
        _device: SwitchDevice,
        port_id: u32,
        ifindex: u32,
        port_type: PortType,
    ) -> SwitchResult<IngressPortEntries> {
        let mut state = self.state.lock();
        state.check(PdTable::IngressPortMapping)?;
        let entry = SimEntry::PortMapping {
            port_id,
            ifindex,
            port_type,
        };
        let first = state.insert(PdTable::IngressPortMapping, entry.clone())?;
        match state.insert(PdTable::IngressPortMapping, entry) {
            Ok(second) => Ok([first, second]),
            Err(e) => {
                state.remove(PdTable::IngressPortMapping, first);
                Err(e)
            }
        }
    }

    fn delete_ingress_mapping_entry(
        &self,
        _device: SwitchDevice,
        entries: &IngressPortEntries,
    ) -> SwitchResult<()> {
        let mut state = self.state.lock();
        state.check(PdTable::IngressPortMapping)?;
        for entry in entries {
            state.remove(PdTable::IngressPortMapping, *entry);
        }
        Ok(())
    }

    fn add_egress_mapping_entry(
        &self,
        _device: SwitchDevice,
        port_id: u32,
        ifindex: u32,
        port_type: PortType,
    ) -> SwitchResult<PdHandle> {
        let mut state = self.state.lock();
        state.check(PdTable::EgressPortMapping)?;
        state.insert(
            PdTable::EgressPortMapping,
            SimEntry::PortMapping {
                port_id,
                ifindex,
                port_type,
            },
        )
    }
}

impl StormControlPd for SimulatedPd {
    fn add_storm_control_entry(
        &self,
        _device: SwitchDevice,
        port_id: u32,
        rate: u32,
        pkt_type: PacketType,
        meter_id: u32,
    ) -> SwitchResult<PdHandle> {
        let mut state = self.state.lock();
        state.check(PdTable::StormControl)?;
        state.insert(
            PdTable::StormControl,
            SimEntry::StormControl {
                port_id,
                rate,
                pkt_type,
                meter_id,
            },
        )
    }

    fn delete_storm_control_entry(
        &self,
        _device: SwitchDevice,
        entry: PdHandle,
    ) -> SwitchResult<()> {
        let mut state = self.state.lock();
        state.check(PdTable::StormControl)?;
        state.remove(PdTable::StormControl, entry);
        Ok(())
    }

    fn refresh_storm_control_stats(
        &self,
        _device: SwitchDevice,
        meter: &mut MeterInfo,
    ) -> SwitchResult<()> {
        let state = self.state.lock();
        state.check(PdTable::StormControl)?;
        if let Some(counters) = state.meter_counters.get(&meter.meter_id) {
            meter.counters = *counters;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_port_entries() {
        let pd = SimulatedPd::new();
        let lag = pd.add_lag_group_entry(0, 4, 3).unwrap();
        let ingress = pd.add_ingress_mapping_entry(0, 3, 4, PortType::Normal).unwrap();
        let egress = pd.add_egress_mapping_entry(0, 3, 4, PortType::Normal).unwrap();

        assert_ne!(lag.member, lag.group_entry);
        assert_ne!(ingress[0], ingress[1]);
        assert_eq!(pd.entry_count(PdTable::LagGroup), 1);
        assert_eq!(pd.entry_count(PdTable::IngressPortMapping), 2);
        assert_eq!(
            pd.entry(PdTable::EgressPortMapping, egress),
            Some(SimEntry::PortMapping {
                port_id: 3,
                ifindex: 4,
                port_type: PortType::Normal,
            })
        );
    }

    #[test]
    fn test_delete_is_idempotent() {
        let pd = SimulatedPd::new();
        let ingress = pd.add_ingress_mapping_entry(0, 1, 2, PortType::Cpu).unwrap();
        pd.delete_ingress_mapping_entry(0, &ingress).unwrap();
        pd.delete_ingress_mapping_entry(0, &ingress).unwrap();
        pd.delete_lag_group_entry(0, PdHandle::INVALID).unwrap();
        assert_eq!(pd.entry_count(PdTable::IngressPortMapping), 0);
    }

    #[test]
    fn test_failure_injection() {
        let pd = SimulatedPd::new();
        pd.fail_table(PdTable::StormControl);
        let err = pd
            .add_storm_control_entry(0, 1, 1000, PacketType::Broadcast, 7)
            .unwrap_err();
        assert_eq!(err.status(), SwitchStatus::HwFailure);
        assert_eq!(pd.entry_count(PdTable::StormControl), 0);

        pd.clear_failures();
        assert!(pd
            .add_storm_control_entry(0, 1, 1000, PacketType::Broadcast, 7)
            .is_ok());
    }

    #[test]
    fn test_refresh_stats() {
        let pd = SimulatedPd::new();
        let counter = SwitchCounter {
            num_packets: 10,
            num_bytes: 640,
        };
        pd.set_meter_counter(7, MeterStatsId::Yellow, counter);

        let mut meter = MeterInfo::new(7);
        pd.refresh_storm_control_stats(0, &mut meter).unwrap();
        assert_eq!(meter.counter(MeterStatsId::Yellow), counter);
        assert_eq!(meter.counter(MeterStatsId::Green), SwitchCounter::default());
    }

    #[test]
    fn test_allocator_never_issues_invalid_handle() {
        let pd = SimulatedPd::new();
        pd.state.lock().next_handle = PdHandle::INVALID.as_raw() - 1;

        let last = pd
            .add_storm_control_entry(0, 1, 1000, PacketType::Broadcast, 7)
            .unwrap();
        assert!(last.is_valid());

        let err = pd
            .add_storm_control_entry(0, 1, 1000, PacketType::Unicast, 7)
            .unwrap_err();
        assert_eq!(err.status(), SwitchStatus::InsufficientResources);
        let err = pd.add_lag_group_entry(0, 2, 1).unwrap_err();
        assert_eq!(err.status(), SwitchStatus::InsufficientResources);
        assert_eq!(pd.entry_count(PdTable::StormControl), 1);
        assert_eq!(pd.entry_count(PdTable::LagGroup), 0);
    }

    #[test]
    fn test_ingress_pair_is_all_or_nothing() {
        let pd = SimulatedPd::new();
        pd.state.lock().next_handle = PdHandle::INVALID.as_raw() - 1;

        let err = pd
            .add_ingress_mapping_entry(0, 1, 2, PortType::Normal)
            .unwrap_err();
        assert_eq!(err.status(), SwitchStatus::InsufficientResources);
        assert_eq!(pd.entry_count(PdTable::IngressPortMapping), 0);
    }
}
