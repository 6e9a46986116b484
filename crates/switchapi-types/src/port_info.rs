//! Public port configuration.
//!
//! [`ApiPortInfo`] is the caller-facing configuration of a port. The port
//! control plane stores it verbatim and hands it back on read; it never
//! interprets the attributes. Only `port_number` matters to the core: it
//! names the port the configuration belongs to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ParseError, SwitchHandle};

/// Port speed in Mbps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortSpeed(u32);

impl PortSpeed {
    pub const GE_1: Self = PortSpeed(1_000);
    pub const GE_10: Self = PortSpeed(10_000);
    pub const GE_25: Self = PortSpeed(25_000);
    pub const GE_40: Self = PortSpeed(40_000);
    pub const GE_50: Self = PortSpeed(50_000);
    pub const GE_100: Self = PortSpeed(100_000);

    pub const fn from_mbps(mbps: u32) -> Self {
        PortSpeed(mbps)
    }

    pub const fn as_mbps(&self) -> u32 {
        self.0
    }

    pub const fn as_gbps(&self) -> u32 {
        self.0 / 1_000
    }
}

/// Forward Error Correction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FecMode {
    #[default]
    None,
    /// Reed-Solomon
    Rs,
    /// Fire Code
    Fc,
    Auto,
}

impl FromStr for FecMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(FecMode::None),
            "rs" => Ok(FecMode::Rs),
            "fc" => Ok(FecMode::Fc),
            "auto" => Ok(FecMode::Auto),
            _ => Err(ParseError::invalid_field("fec", s)),
        }
    }
}

/// Administrative state of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminState {
    #[default]
    Down,
    Up,
}

impl AdminState {
    pub const fn is_up(&self) -> bool {
        matches!(self, AdminState::Up)
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminState::Up => write!(f, "up"),
            AdminState::Down => write!(f, "down"),
        }
    }
}

impl FromStr for AdminState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(AdminState::Up),
            "down" => Ok(AdminState::Down),
            _ => Err(ParseError::invalid_field("admin_status", s)),
        }
    }
}

/// Public configuration of one port (`switch_api_port_info_t`).
///
/// All attributes are optional; an unset attribute means "platform default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPortInfo {
    /// Handle (or raw number) of the port this configuration belongs to.
    pub port_number: SwitchHandle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phy_port_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<PortSpeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_status: Option<AdminState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fec: Option<FecMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ApiPortInfo {
    /// Creates an empty configuration for `port`.
    pub fn new(port: SwitchHandle) -> Self {
        Self {
            port_number: port,
            ..Default::default()
        }
    }

    /// Parses one field-value pair into this configuration.
    pub fn parse_field(&mut self, field: &str, value: &str) -> Result<(), ParseError> {
        match field {
            "phy_port" | "phy_port_number" => {
                self.phy_port_number = Some(parse_u32(field, value)?);
            }
            "speed" => {
                self.speed = Some(PortSpeed::from_mbps(parse_u32(field, value)?));
            }
            "mtu" => {
                self.mtu = Some(parse_u32(field, value)?);
            }
            "admin_status" => {
                self.admin_status = Some(value.parse()?);
            }
            "fec" => {
                self.fec = Some(value.parse()?);
            }
            "learning" => {
                self.learning = Some(parse_bool(field, value)?);
            }
            "description" => {
                self.description = Some(value.to_string());
            }
            _ => return Err(ParseError::UnknownField(field.to_string())),
        }
        Ok(())
    }

    /// Parses a list of field-value pairs, stopping at the first bad one.
    pub fn parse_fields<'a>(
        &mut self,
        fields: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<(), ParseError> {
        for (field, value) in fields {
            self.parse_field(field, value)?;
        }
        Ok(())
    }
}

fn parse_u32(field: &str, value: &str) -> Result<u32, ParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseError::invalid_field(field, value))
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ParseError> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "enable" | "1" => Ok(true),
        "false" | "off" | "disable" | "0" => Ok(false),
        _ => Err(ParseError::invalid_field(field, value)),
    }
}
