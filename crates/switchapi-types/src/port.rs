//! Port and packet classification types.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Device identifier (matches `switch_device_t`).
pub type SwitchDevice = u32;

/// Type of switch port.
///
/// Fixed at initialization: exactly one index is the CPU port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    /// Front-panel or internal data port.
    #[default]
    Normal,
    /// CPU port for control plane traffic.
    Cpu,
}

impl PortType {
    pub const fn is_cpu(&self) -> bool {
        matches!(self, PortType::Cpu)
    }

    /// Value programmed into the port mapping tables.
    pub const fn as_raw(&self) -> u8 {
        match self {
            PortType::Normal => 0,
            PortType::Cpu => 1,
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortType::Normal => write!(f, "normal"),
            PortType::Cpu => write!(f, "cpu"),
        }
    }
}

impl FromStr for PortType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(PortType::Normal),
            "cpu" => Ok(PortType::Cpu),
            _ => Err(ParseError::InvalidPortType(s.to_string())),
        }
    }
}

/// Traffic class used to select a storm-control meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketType {
    Unicast = 0,
    Multicast = 1,
    Broadcast = 2,
}

impl PacketType {
    /// Number of packet types; sizes the per-port meter arrays.
    pub const COUNT: usize = 3;

    pub const ALL: [PacketType; PacketType::COUNT] =
        [PacketType::Unicast, PacketType::Multicast, PacketType::Broadcast];

    /// Creates a packet type from its raw `switch_packet_type_t` value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(PacketType::Unicast),
            1 => Some(PacketType::Multicast),
            2 => Some(PacketType::Broadcast),
            _ => None,
        }
    }

    /// Slot of this packet type in per-port meter arrays.
    pub const fn index(&self) -> usize {
        *self as usize
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            PacketType::Unicast => "unicast",
            PacketType::Multicast => "multicast",
            PacketType::Broadcast => "broadcast",
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PacketType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unicast" | "unknown-unicast" => Ok(PacketType::Unicast),
            "multicast" | "unknown-multicast" => Ok(PacketType::Multicast),
            "broadcast" => Ok(PacketType::Broadcast),
            _ => Err(ParseError::InvalidPacketType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_port_type_parse() {
        assert_eq!("cpu".parse::<PortType>().unwrap(), PortType::Cpu);
        assert_eq!("NORMAL".parse::<PortType>().unwrap(), PortType::Normal);
        assert!("phy".parse::<PortType>().is_err());
    }

    #[test]
    fn test_port_type_default() {
        assert_eq!(PortType::default(), PortType::Normal);
        assert!(PortType::Cpu.is_cpu());
        assert!(!PortType::Normal.is_cpu());
    }

    #[test]
    fn test_packet_type_index() {
        for (slot, pkt_type) in PacketType::ALL.iter().enumerate() {
            assert_eq!(pkt_type.index(), slot);
        }
    }

    #[test]
    fn test_packet_type_from_raw() {
        assert_eq!(PacketType::from_raw(2), Some(PacketType::Broadcast));
        assert_eq!(PacketType::from_raw(3), None);
    }

    #[test]
    fn test_packet_type_parse() {
        assert_eq!("broadcast".parse::<PacketType>().unwrap(), PacketType::Broadcast);
        assert_eq!(
            "unknown-unicast".parse::<PacketType>().unwrap(),
            PacketType::Unicast
        );
        assert!(matches!(
            "anycast".parse::<PacketType>(),
            Err(ParseError::InvalidPacketType(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(PortType::Cpu.to_string(), "cpu");
        assert_eq!(PacketType::Multicast.to_string(), "multicast");
    }
}
