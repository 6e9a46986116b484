//! Hardware table-entry handles.
//!
//! A PD handle identifies one programmed rule in one hardware table. It is
//! returned when the rule is added and is the only way to delete it later.

use std::fmt;

/// Raw entry handle value (matches `p4_pd_entry_hdl_t`).
pub type RawPdHandle = u32;

/// Handle of a programmed hardware table entry.
///
/// [`PdHandle::INVALID`] means "nothing programmed". It is deliberately
/// distinct from zero, which is a legal entry handle for most tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PdHandle(RawPdHandle);

impl PdHandle {
    /// No entry programmed (`SWITCH_HW_INVALID_HANDLE`).
    pub const INVALID: Self = PdHandle(RawPdHandle::MAX);

    pub const fn from_raw(raw: RawPdHandle) -> Self {
        PdHandle(raw)
    }

    pub const fn as_raw(&self) -> RawPdHandle {
        self.0
    }

    pub const fn is_valid(&self) -> bool {
        self.0 != RawPdHandle::MAX
    }
}

impl Default for PdHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for PdHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "PdHandle({})", self.0)
        } else {
            write!(f, "PdHandle(INVALID)")
        }
    }
}

impl fmt::Display for PdHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "invalid")
        }
    }
}

/// The two ingress port-mapping entries programmed per port.
pub type IngressPortEntries = [PdHandle; 2];

/// Handles returned when a port is added to the lag-group table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LagGroupEntry {
    /// Member handle in the lag selector.
    pub member: PdHandle,
    /// Lag-group table entry for the port.
    pub group_entry: PdHandle,
}
