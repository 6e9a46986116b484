//! Meter subsystem contract.
//!
//! Meters are created and destroyed by a separate meter subsystem. Storm
//! control only binds existing meters to ports and reads their counters, so
//! all the port control plane needs is [`MeterLookup`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use switchapi_types::{HandleType, SwitchHandle};

/// Per-color meter counter selector (`switch_meter_stats_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterStatsId {
    Green = 0,
    Yellow = 1,
    Red = 2,
}

impl MeterStatsId {
    pub const COUNT: usize = 3;

    pub const ALL: [MeterStatsId; MeterStatsId::COUNT] =
        [MeterStatsId::Green, MeterStatsId::Yellow, MeterStatsId::Red];

    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for MeterStatsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeterStatsId::Green => write!(f, "green"),
            MeterStatsId::Yellow => write!(f, "yellow"),
            MeterStatsId::Red => write!(f, "red"),
        }
    }
}

/// Packet and byte counter pair (`switch_counter_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwitchCounter {
    pub num_packets: u64,
    pub num_bytes: u64,
}

/// State of one meter as seen by the port control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterInfo {
    /// Dense meter index programmed into hardware.
    pub meter_id: u32,
    /// Counter snapshot, indexed by [`MeterStatsId`].
    pub counters: [SwitchCounter; MeterStatsId::COUNT],
}

impl MeterInfo {
    pub fn new(meter_id: u32) -> Self {
        Self {
            meter_id,
            counters: [SwitchCounter::default(); MeterStatsId::COUNT],
        }
    }

    pub fn counter(&self, id: MeterStatsId) -> SwitchCounter {
        self.counters[id.index()]
    }
}

/// Lookup side of the meter subsystem.
pub trait MeterLookup: Send + Sync {
    /// Returns the meter behind `meter`, or None if no such meter exists.
    fn lookup_meter(&self, meter: SwitchHandle) -> Option<Arc<Mutex<MeterInfo>>>;
}

/// Minimal in-process meter store.
///
/// Stands in for the meter subsystem when the port control plane runs on its
/// own (daemon, tests).
#[derive(Debug, Default)]
pub struct MeterTable {
    meters: RwLock<HashMap<SwitchHandle, Arc<Mutex<MeterInfo>>>>,
}

impl MeterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers meter index `meter_id` and returns its handle.
    pub fn create(&self, meter_id: u32) -> SwitchHandle {
        let handle = SwitchHandle::new(HandleType::Meter, meter_id);
        self.meters
            .write()
            .insert(handle, Arc::new(Mutex::new(MeterInfo::new(meter_id))));
        handle
    }

    /// Forgets a meter. Returns false if it was not registered.
    pub fn remove(&self, meter: SwitchHandle) -> bool {
        self.meters.write().remove(&meter).is_some()
    }

    pub fn len(&self) -> usize {
        self.meters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.read().is_empty()
    }
}

impl MeterLookup for MeterTable {
    fn lookup_meter(&self, meter: SwitchHandle) -> Option<Arc<Mutex<MeterInfo>>> {
        self.meters.read().get(&meter).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_table_create_lookup() {
        let table = MeterTable::new();
        let handle = table.create(7);
        assert_eq!(handle.index(), 7);
        assert_eq!(handle.handle_type(), Some(HandleType::Meter));

        let meter = table.lookup_meter(handle).unwrap();
        assert_eq!(meter.lock().meter_id, 7);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_meter_table_remove() {
        let table = MeterTable::new();
        let handle = table.create(1);
        assert!(table.remove(handle));
        assert!(!table.remove(handle));
        assert!(table.lookup_meter(handle).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_counter_by_id() {
        let mut info = MeterInfo::new(0);
        info.counters[MeterStatsId::Red.index()] = SwitchCounter {
            num_packets: 3,
            num_bytes: 192,
        };
        assert_eq!(info.counter(MeterStatsId::Red).num_packets, 3);
        assert_eq!(info.counter(MeterStatsId::Green), SwitchCounter::default());
    }
}
