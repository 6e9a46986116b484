//! Storm-control table calls.

use switchapi_types::{PacketType, SwitchDevice};

use crate::error::SwitchResult;
use crate::meter::MeterInfo;
use crate::types::PdHandle;

/// Hardware calls programming storm-control policing.
pub trait StormControlPd: Send + Sync {
    /// Polices `pkt_type` traffic on `port_id` with meter `meter_id` at `rate`.
    fn add_storm_control_entry(
        &self,
        device: SwitchDevice,
        port_id: u32,
        rate: u32,
        pkt_type: PacketType,
        meter_id: u32,
    ) -> SwitchResult<PdHandle>;

    fn delete_storm_control_entry(&self, device: SwitchDevice, entry: PdHandle)
        -> SwitchResult<()>;

    /// Reads the meter's hardware counters into `meter`.
    fn refresh_storm_control_stats(
        &self,
        device: SwitchDevice,
        meter: &mut MeterInfo,
    ) -> SwitchResult<()>;
}
