//! PortManager - handle resolution and hardware table sync for ports.
//!
//! Every state-changing operation updates the port record and issues the
//! matching hardware table calls while holding that port's lock, so two
//! mutations of one port never interleave their table calls. A failed
//! hardware call is returned to the caller; local state already updated
//! before the failing call stays updated.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use switchapi_pd::{
    MeterLookup, MeterStatsId, PdHandle, SwitchCounter, SwitchError, SwitchPd, SwitchResult,
    SwitchStatus,
};
use switchapi_types::{
    ApiPortInfo, PacketType, PortType, SwitchDevice, SwitchHandle, HANDLE_INDEX_MASK,
};

use super::record::PortRecord;
use super::table::{InitReport, PortTable, ResolvedPort};

/// Default number of ports.
pub const DEFAULT_MAX_PORTS: u32 = 288;
/// Default CPU port index.
pub const DEFAULT_CPU_PORT: u32 = 64;
/// Default reserved null-port index.
pub const DEFAULT_NULL_PORT: u32 = 511;
/// Policing rate programmed with every storm-control entry.
pub const STORM_CONTROL_DEFAULT_RATE: u32 = 1000;

/// Port manager configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortManagerConfig {
    /// Number of ports; fixed for the life of the manager.
    pub max_ports: u32,
    /// Index of the CPU port.
    pub cpu_port: u32,
    /// Index reserved for the null port (outside `0..max_ports`).
    pub null_port: u32,
    /// Rate used for storm-control entries.
    pub storm_control_rate: u32,
}

impl Default for PortManagerConfig {
    fn default() -> Self {
        Self {
            max_ports: DEFAULT_MAX_PORTS,
            cpu_port: DEFAULT_CPU_PORT,
            null_port: DEFAULT_NULL_PORT,
            storm_control_rate: STORM_CONTROL_DEFAULT_RATE,
        }
    }
}

impl PortManagerConfig {
    /// Checks that the port layout is addressable by handles.
    pub fn validate(&self) -> SwitchResult<()> {
        if self.max_ports == 0 {
            return Err(SwitchError::invalid_parameter("max_ports must be non-zero"));
        }
        if u64::from(self.max_ports) > HANDLE_INDEX_MASK {
            return Err(SwitchError::invalid_parameter(format!(
                "max_ports {} does not fit in a handle",
                self.max_ports
            )));
        }
        if self.cpu_port >= self.max_ports {
            return Err(SwitchError::invalid_parameter(format!(
                "cpu_port {} must be below max_ports {}",
                self.cpu_port, self.max_ports
            )));
        }
        if self.null_port < self.max_ports || u64::from(self.null_port) > HANDLE_INDEX_MASK {
            return Err(SwitchError::invalid_parameter(format!(
                "null_port {} must be an unused handle index at or above max_ports {}",
                self.null_port, self.max_ports
            )));
        }
        Ok(())
    }
}

/// Port manager counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortManagerStats {
    pub ports_initialized: u64,
    /// Hardware calls skipped during bring-up.
    pub init_hw_failures: u64,
    pub config_sets: u64,
    pub ports_deleted: u64,
    pub storm_control_binds: u64,
    pub storm_control_unbinds: u64,
    /// Hardware calls that failed after bring-up.
    pub hw_failures: u64,
}

/// A storm-control meter bound to a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StormControlBinding {
    pub pkt_type: PacketType,
    pub meter: SwitchHandle,
    pub entry: Option<u32>,
}

/// Serializable view of one port record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortSnapshot {
    pub id: u32,
    pub ifindex: u32,
    pub port_type: PortType,
    pub port_handle: SwitchHandle,
    pub lag_handle: SwitchHandle,
    pub ingress_entries: [Option<u32>; 2],
    pub egress_entry: Option<u32>,
    pub lag_group_entry: Option<u32>,
    pub storm_control: Vec<StormControlBinding>,
    pub config: ApiPortInfo,
}

fn pd_raw(handle: PdHandle) -> Option<u32> {
    handle.is_valid().then(|| handle.as_raw())
}

impl From<&PortRecord> for PortSnapshot {
    fn from(port: &PortRecord) -> Self {
        let storm_control = PacketType::ALL
            .iter()
            .filter(|pkt_type| !port.storm_control_meter(**pkt_type).is_null())
            .map(|pkt_type| StormControlBinding {
                pkt_type: *pkt_type,
                meter: port.storm_control_meter(*pkt_type),
                entry: pd_raw(port.storm_control_entry(*pkt_type)),
            })
            .collect();

        Self {
            id: port.id,
            ifindex: port.ifindex,
            port_type: port.port_type,
            port_handle: port.port_handle,
            lag_handle: port.lag_handle,
            ingress_entries: [pd_raw(port.hw_entry[0]), pd_raw(port.hw_entry[1])],
            egress_entry: pd_raw(port.eg_port_entry),
            lag_group_entry: pd_raw(port.lg_entry),
            storm_control,
            config: port.api_port_info.clone(),
        }
    }
}

/// The port control plane.
///
/// Owns the [`PortTable`]; callers only ever reach port records through
/// this type.
pub struct PortManager {
    config: PortManagerConfig,
    table: PortTable,
    pd: Arc<dyn SwitchPd>,
    meters: Arc<dyn MeterLookup>,
    stats: Mutex<PortManagerStats>,
    initialized: AtomicBool,
}

impl fmt::Debug for PortManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortManager")
            .field("config", &self.config)
            .field("attached", &self.pd.is_attached())
            .field("initialized", &self.initialized.load(Ordering::Relaxed))
            .field("stats", &*self.stats.lock())
            .finish()
    }
}

impl PortManager {
    /// Creates a manager with every port in its pre-bring-up state.
    ///
    /// Call [`PortManager::init`] before use to program the hardware.
    pub fn new(
        config: PortManagerConfig,
        pd: Arc<dyn SwitchPd>,
        meters: Arc<dyn MeterLookup>,
    ) -> SwitchResult<Self> {
        config.validate()?;
        let table = PortTable::new(config.max_ports, config.cpu_port, config.null_port);
        Ok(Self {
            config,
            table,
            pd,
            meters,
            stats: Mutex::new(PortManagerStats::default()),
            initialized: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &PortManagerConfig {
        &self.config
    }

    pub fn stats(&self) -> PortManagerStats {
        self.stats.lock().clone()
    }

    /// Brings up every port: resets its record and programs the lag-group,
    /// ingress and egress mapping tables. Hardware errors are counted in the
    /// report, not returned.
    ///
    /// Runs once per manager. A second call fails with
    /// `ITEM_ALREADY_EXISTS` and leaves the programmed entries alone, since
    /// resetting the records would drop their entry handles.
    pub fn init(&self, device: SwitchDevice) -> SwitchResult<InitReport> {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            error!(device, "port table already initialized");
            return Err(SwitchError::from_status(SwitchStatus::ItemAlreadyExists));
        }

        let report = self.table.initialize_all(device, self.pd.as_ref());
        let mut stats = self.stats.lock();
        stats.ports_initialized += report.ports as u64;
        stats.init_hw_failures += report.hw_failures as u64;
        Ok(report)
    }

    /// Resolves a handle, redirecting out-of-range indices to a sentinel.
    pub fn resolve(&self, port: SwitchHandle) -> ResolvedPort<'_> {
        self.table.resolve(port)
    }

    /// Handle minted for port `index`.
    pub fn port_handle(&self, index: u32) -> Option<SwitchHandle> {
        self.table.get(index).map(|slot| slot.lock().port_handle)
    }

    /// Handles of all ports, in index order.
    pub fn ports(&self) -> Vec<SwitchHandle> {
        self.table.iter().map(|slot| slot.lock().port_handle).collect()
    }

    pub fn is_cpu_port(&self, port: SwitchHandle) -> bool {
        port.index() == self.config.cpu_port
    }

    /// Replaces the stored configuration of the port named by
    /// `info.port_number`. No merge with the previous value.
    ///
    /// A configuration addressed to a sentinel is accepted and dropped.
    #[instrument(skip(self, info), fields(port = %info.port_number))]
    pub fn set(&self, device: SwitchDevice, info: &ApiPortInfo) -> SwitchResult<()> {
        let resolved = self.table.resolve(info.port_number);
        if resolved.is_sentinel() {
            debug!(slot = ?resolved.slot(), "port config for sentinel ignored");
            return Ok(());
        }

        resolved.lock().api_port_info = info.clone();
        self.stats.lock().config_sets += 1;
        debug!(device, "port config stored");
        Ok(())
    }

    /// Returns a copy of the stored configuration of `port`.
    pub fn get(&self, device: SwitchDevice, port: SwitchHandle) -> SwitchResult<ApiPortInfo> {
        let resolved = self.table.resolve(port);
        debug!(device, %port, slot = ?resolved.slot(), "port config read");
        Ok(resolved.lock().api_port_info.clone())
    }

    /// Removes the port's lag-group and ingress mapping entries, unbinds its
    /// storm-control meters and resets its configuration.
    ///
    /// Every hardware call is attempted; the first failure is returned.
    /// Deleting a sentinel is a no-op.
    #[instrument(skip(self))]
    pub fn delete(&self, device: SwitchDevice, port: SwitchHandle) -> SwitchResult<()> {
        let resolved = self.table.resolve(port);
        if resolved.is_sentinel() {
            debug!(slot = ?resolved.slot(), "delete of sentinel port ignored");
            return Ok(());
        }

        let mut record = resolved.lock();
        let result = self.clear_port(device, &mut record);
        self.stats.lock().ports_deleted += 1;
        match &result {
            Ok(()) => info!(port = record.id, "port deleted"),
            Err(e) => error!(port = record.id, error = %e, "port delete incomplete"),
        }
        result
    }

    fn clear_port(&self, device: SwitchDevice, port: &mut PortRecord) -> SwitchResult<()> {
        let lag = self.pd_call(self.pd.delete_lag_group_entry(device, port.lg_entry));
        if lag.is_ok() {
            port.lg_entry = PdHandle::INVALID;
            port.mbr_hdl = PdHandle::INVALID;
        }

        let ingress = self.pd_call(self.pd.delete_ingress_mapping_entry(device, &port.hw_entry));
        if ingress.is_ok() {
            port.hw_entry = [PdHandle::INVALID; 2];
        }

        let mut storm = Ok(());
        for pkt_type in PacketType::ALL {
            let unbound = self.unbind_storm_control(device, port, pkt_type).map(|_| ());
            storm = storm.and(unbound);
        }

        port.lag_handle = SwitchHandle::NULL;
        port.api_port_info = ApiPortInfo::new(port.port_handle);

        lag.and(ingress).and(storm)
    }

    /// Prints id and ifindex of port `port` to stdout.
    pub fn print_entry(&self, port: u32) -> SwitchResult<()> {
        self.write_entry(&mut io::stdout().lock(), port)
    }

    /// Prints id and ifindex of every port to stdout.
    pub fn print_all(&self) -> SwitchResult<()> {
        self.write_all(&mut io::stdout().lock())
    }

    /// Writes one port's dump. Out-of-range ports are rejected.
    pub fn write_entry<W: Write>(&self, out: &mut W, port: u32) -> SwitchResult<()> {
        let slot = self.table.get(port).ok_or_else(|| {
            SwitchError::invalid_parameter(format!(
                "port {} out of range (max {})",
                port,
                self.table.max_ports()
            ))
        })?;
        let record = slot.lock();
        write_record(out, &record)
    }

    pub fn write_all<W: Write>(&self, out: &mut W) -> SwitchResult<()> {
        for slot in self.table.iter() {
            let record = slot.lock();
            write_record(out, &record)?;
        }
        Ok(())
    }

    /// Snapshot of port `port` by raw index.
    pub fn snapshot(&self, port: u32) -> SwitchResult<PortSnapshot> {
        let slot = self.table.get(port).ok_or_else(|| {
            SwitchError::invalid_parameter(format!(
                "port {} out of range (max {})",
                port,
                self.table.max_ports()
            ))
        })?;
        let record = slot.lock();
        Ok(PortSnapshot::from(&*record))
    }

    pub fn snapshots(&self) -> Vec<PortSnapshot> {
        self.table
            .iter()
            .map(|slot| PortSnapshot::from(&*slot.lock()))
            .collect()
    }

    /// Binds (`meter` non-NULL) or unbinds (`meter` NULL) storm control for
    /// `pkt_type` on `port`.
    ///
    /// Binding over an existing binding removes the old storm-control entry
    /// first. Out-of-range ports are rejected before anything is touched.
    #[instrument(skip(self))]
    pub fn storm_control_set(
        &self,
        device: SwitchDevice,
        port: SwitchHandle,
        pkt_type: PacketType,
        meter: SwitchHandle,
    ) -> SwitchResult<()> {
        let (index, slot) = self.checked_port(port)?;
        let mut record = slot.lock();

        if meter.is_null() {
            if self.unbind_storm_control(device, &mut record, pkt_type)? {
                self.stats.lock().storm_control_unbinds += 1;
                info!(port = index, %pkt_type, "storm control unbound");
            }
            return Ok(());
        }

        let idx = pkt_type.index();
        let stale = record.meter_pd_hdl[idx];
        if stale.is_valid() {
            self.pd_call(self.pd.delete_storm_control_entry(device, stale))?;
            record.meter_pd_hdl[idx] = PdHandle::INVALID;
        }

        record.meter_handle[idx] = meter;
        let entry = self.pd_call(self.pd.add_storm_control_entry(
            device,
            index,
            self.config.storm_control_rate,
            pkt_type,
            meter.index(),
        ))?;
        record.meter_pd_hdl[idx] = entry;

        self.stats.lock().storm_control_binds += 1;
        info!(port = index, %pkt_type, %meter, %entry, "storm control bound");
        Ok(())
    }

    /// Clears the binding for `pkt_type`. Returns true if a hardware entry
    /// was removed.
    fn unbind_storm_control(
        &self,
        device: SwitchDevice,
        port: &mut PortRecord,
        pkt_type: PacketType,
    ) -> SwitchResult<bool> {
        let slot = pkt_type.index();
        port.meter_handle[slot] = SwitchHandle::NULL;

        let entry = port.meter_pd_hdl[slot];
        if !entry.is_valid() {
            return Ok(false);
        }
        self.pd_call(self.pd.delete_storm_control_entry(device, entry))?;
        port.meter_pd_hdl[slot] = PdHandle::INVALID;
        Ok(true)
    }

    /// Meter bound for `pkt_type` on `port`, NULL if none.
    pub fn storm_control_get(
        &self,
        device: SwitchDevice,
        port: SwitchHandle,
        pkt_type: PacketType,
    ) -> SwitchResult<SwitchHandle> {
        let (_, slot) = self.checked_port(port)?;
        let meter = slot.lock().storm_control_meter(pkt_type);
        debug!(device, %port, %pkt_type, %meter, "storm control read");
        Ok(meter)
    }

    /// Refreshes `meter`'s hardware counters and returns the requested ones,
    /// in request order.
    pub fn storm_control_stats_get(
        &self,
        device: SwitchDevice,
        meter: SwitchHandle,
        counter_ids: &[MeterStatsId],
    ) -> SwitchResult<Vec<SwitchCounter>> {
        let meter_info = self
            .meters
            .lookup_meter(meter)
            .ok_or_else(|| SwitchError::not_found(format!("meter {}", meter)))?;

        let mut stats = meter_info.lock();
        self.pd_call(self.pd.refresh_storm_control_stats(device, &mut stats))?;
        Ok(counter_ids.iter().map(|id| stats.counter(*id)).collect())
    }

    /// Deletes the hardware bindings of every port.
    ///
    /// Keeps going after a failure and returns the first one.
    pub fn shutdown(&self, device: SwitchDevice) -> SwitchResult<()> {
        let mut result = Ok(());
        for slot in self.table.iter() {
            let mut record = slot.lock();
            let cleared = self.clear_port(device, &mut record);
            result = result.and(cleared);
        }
        match &result {
            Ok(()) => info!(device, ports = self.table.max_ports(), "port table shut down"),
            Err(e) => error!(device, error = %e, "port table shutdown incomplete"),
        }
        result
    }

    fn checked_port(&self, port: SwitchHandle) -> SwitchResult<(u32, &Mutex<PortRecord>)> {
        let index = port.index();
        self.table
            .get(index)
            .map(|slot| (index, slot))
            .ok_or_else(|| {
                SwitchError::invalid_parameter(format!(
                    "port {} out of range (max {})",
                    index,
                    self.table.max_ports()
                ))
            })
    }

    fn pd_call<T>(&self, result: SwitchResult<T>) -> SwitchResult<T> {
        if let Err(e) = &result {
            self.stats.lock().hw_failures += 1;
            error!(error = %e, "hardware table call failed");
        }
        result
    }
}

fn write_record<W: Write>(out: &mut W, record: &PortRecord) -> SwitchResult<()> {
    write_port(out, record).map_err(|e| SwitchError::internal(format!("port dump failed: {}", e)))
}

fn write_port<W: Write>(out: &mut W, record: &PortRecord) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "port number: {}", record.id)?;
    writeln!(out, "\tifindex: {:x}", record.ifindex)
}
