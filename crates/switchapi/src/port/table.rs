//! Fixed-capacity port table.
//!
//! The table owns one [`PortRecord`] per port index for its whole lifetime,
//! plus two sentinel records. Handle resolution never fails: anything
//! outside the addressable range lands on a sentinel, so a caller that
//! forgets to check a status still touches inert memory.

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use switchapi_pd::SwitchPd;
use switchapi_types::{PortType, SwitchDevice, SwitchHandle};

use super::record::PortRecord;

/// Where a handle resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortSlot {
    /// A real port at this index.
    Port(u32),
    /// The reserved null-port index.
    Null,
    /// Any other out-of-range index.
    Dummy,
}

impl PortSlot {
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, PortSlot::Port(_))
    }
}

/// Result of [`PortTable::resolve`]: always a usable record, tagged with
/// whether it is a real port.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPort<'a> {
    slot: PortSlot,
    record: &'a Mutex<PortRecord>,
}

impl<'a> ResolvedPort<'a> {
    pub fn slot(&self) -> PortSlot {
        self.slot
    }

    pub fn is_sentinel(&self) -> bool {
        self.slot.is_sentinel()
    }

    /// Copy of the record as it is right now.
    pub fn record(&self) -> PortRecord {
        self.record.lock().clone()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'a, PortRecord> {
        self.record.lock()
    }
}

/// Outcome of bringing up every port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Ports brought up.
    pub ports: usize,
    /// Hardware calls that failed and were skipped.
    pub hw_failures: usize,
}

/// Owned store of all port records.
#[derive(Debug)]
pub struct PortTable {
    ports: Box<[Mutex<PortRecord>]>,
    null_port: Mutex<PortRecord>,
    dummy_port: Mutex<PortRecord>,
    cpu_port: u32,
    null_port_id: u32,
}

impl PortTable {
    /// Allocates `max_ports` records. Port `cpu_port` is the CPU port.
    pub fn new(max_ports: u32, cpu_port: u32, null_port_id: u32) -> Self {
        let ports = (0..max_ports)
            .map(|id| Mutex::new(PortRecord::new(id, Self::port_type_of(id, cpu_port))))
            .collect();
        Self {
            ports,
            null_port: Mutex::new(PortRecord::default()),
            dummy_port: Mutex::new(PortRecord::default()),
            cpu_port,
            null_port_id,
        }
    }

    fn port_type_of(id: u32, cpu_port: u32) -> PortType {
        if id == cpu_port {
            PortType::Cpu
        } else {
            PortType::Normal
        }
    }

    pub fn max_ports(&self) -> u32 {
        self.ports.len() as u32
    }

    pub fn cpu_port(&self) -> u32 {
        self.cpu_port
    }

    pub fn null_port_id(&self) -> u32 {
        self.null_port_id
    }

    /// Resolves a handle to its record, redirecting to a sentinel when the
    /// index is out of range.
    pub fn resolve(&self, handle: SwitchHandle) -> ResolvedPort<'_> {
        let index = handle.index();
        if let Some(record) = self.ports.get(index as usize) {
            ResolvedPort {
                slot: PortSlot::Port(index),
                record,
            }
        } else if index == self.null_port_id {
            ResolvedPort {
                slot: PortSlot::Null,
                record: &self.null_port,
            }
        } else {
            ResolvedPort {
                slot: PortSlot::Dummy,
                record: &self.dummy_port,
            }
        }
    }

    /// Bounds-checked access by raw index. No sentinel redirection.
    pub fn get(&self, index: u32) -> Option<&Mutex<PortRecord>> {
        self.ports.get(index as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mutex<PortRecord>> {
        self.ports.iter()
    }

    /// Resets every record and programs its lag-group, ingress and egress
    /// mapping entries.
    ///
    /// A failed hardware call is logged and skipped; the loop always runs to
    /// the end (best-effort bring-up). A detached adapter gets no calls at
    /// all and every entry handle stays INVALID.
    pub fn initialize_all(&self, device: SwitchDevice, pd: &dyn SwitchPd) -> InitReport {
        let attached = pd.is_attached();
        let mut report = InitReport::default();

        for (index, slot) in self.ports.iter().enumerate() {
            let id = index as u32;
            let mut port = slot.lock();
            *port = PortRecord::new(id, Self::port_type_of(id, self.cpu_port));

            if attached {
                report.hw_failures += Self::program_port(device, pd, &mut port);
            }

            debug!(
                port = id,
                ifindex = port.ifindex,
                port_type = %port.port_type,
                handle = %port.port_handle,
                "port initialized"
            );
            report.ports += 1;
        }

        info!(
            device,
            ports = report.ports,
            hw_failures = report.hw_failures,
            attached,
            "port table initialized"
        );
        report
    }

    /// Programs one port's bring-up entries. Returns the number of failed calls.
    fn program_port(device: SwitchDevice, pd: &dyn SwitchPd, port: &mut PortRecord) -> usize {
        let mut failures = 0;

        match pd.add_lag_group_entry(device, port.ifindex, port.id) {
            Ok(entry) => {
                port.mbr_hdl = entry.member;
                port.lg_entry = entry.group_entry;
            }
            Err(e) => {
                warn!(port = port.id, error = %e, "lag group entry add failed");
                failures += 1;
            }
        }

        match pd.add_ingress_mapping_entry(device, port.id, port.ifindex, port.port_type) {
            Ok(entries) => port.hw_entry = entries,
            Err(e) => {
                warn!(port = port.id, error = %e, "ingress port mapping add failed");
                failures += 1;
            }
        }

        match pd.add_egress_mapping_entry(device, port.id, port.ifindex, port.port_type) {
            Ok(entry) => port.eg_port_entry = entry,
            Err(e) => {
                warn!(port = port.id, error = %e, "egress port mapping add failed");
                failures += 1;
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use switchapi_pd::{NoopPd, PdHandle, PdTable, SimulatedPd};
    use switchapi_types::HandleType;

    fn table() -> PortTable {
        PortTable::new(8, 0, 511)
    }

    #[test]
    fn test_resolve_in_range() {
        let table = table();
        for id in 0..8 {
            let resolved = table.resolve(SwitchHandle::new(HandleType::Port, id));
            assert_eq!(resolved.slot(), PortSlot::Port(id));
            let record = resolved.record();
            assert_eq!(record.id, id);
            assert_eq!(record.ifindex, id + 1);
        }
    }

    #[test]
    fn test_resolve_null_port() {
        let table = table();
        let resolved = table.resolve(SwitchHandle::new(HandleType::Port, 511));
        assert_eq!(resolved.slot(), PortSlot::Null);
        assert!(resolved.is_sentinel());
        assert_eq!(resolved.record(), PortRecord::default());
    }

    #[test]
    fn test_resolve_dummy_port() {
        let table = table();
        for id in [8u64, 9, 100, 510, 512, 4096] {
            let resolved = table.resolve(SwitchHandle::from_raw(id));
            assert_eq!(resolved.slot(), PortSlot::Dummy);
            assert_eq!(resolved.record(), PortRecord::default());
        }
    }

    #[test]
    fn test_cpu_port_type() {
        let table = PortTable::new(4, 2, 511);
        let cpu: Vec<u32> = table
            .iter()
            .filter(|slot| slot.lock().is_cpu())
            .map(|slot| slot.lock().id)
            .collect();
        assert_eq!(cpu, vec![2]);
    }

    #[test]
    fn test_initialize_all_programs_hardware() {
        let table = table();
        let pd = SimulatedPd::new();
        let report = table.initialize_all(0, &pd);

        assert_eq!(report, InitReport { ports: 8, hw_failures: 0 });
        assert_eq!(pd.entry_count(PdTable::LagGroup), 8);
        assert_eq!(pd.entry_count(PdTable::IngressPortMapping), 16);
        assert_eq!(pd.entry_count(PdTable::EgressPortMapping), 8);
        assert!(table.iter().all(|slot| slot.lock().has_hw_entries()));
    }

    #[test]
    fn test_initialize_all_continues_past_failures() {
        let table = table();
        let pd = SimulatedPd::new();
        pd.fail_table(PdTable::IngressPortMapping);
        let report = table.initialize_all(0, &pd);

        assert_eq!(report.ports, 8);
        assert_eq!(report.hw_failures, 8);
        assert_eq!(pd.entry_count(PdTable::LagGroup), 8);
        assert_eq!(pd.entry_count(PdTable::EgressPortMapping), 8);
        let port = table.get(3).unwrap().lock();
        assert_eq!(port.hw_entry, [PdHandle::INVALID; 2]);
        assert!(port.eg_port_entry.is_valid());
    }

    #[test]
    fn test_initialize_all_detached() {
        let table = table();
        let report = table.initialize_all(0, &NoopPd::new());
        assert_eq!(report, InitReport { ports: 8, hw_failures: 0 });
        assert!(table.iter().all(|slot| !slot.lock().has_hw_entries()));
        assert_eq!(
            table.get(7).unwrap().lock().port_handle,
            SwitchHandle::new(HandleType::Port, 7)
        );
    }

    #[test]
    fn test_get_is_bounds_checked() {
        let table = table();
        assert!(table.get(7).is_some());
        assert!(table.get(8).is_none());
        assert!(table.get(511).is_none());
    }
}
