//! Opaque object handles.
//!
//! Every switchapi object is addressed by a handle that packs an object type
//! tag above a dense per-type index:
//!
//! ```text
//!  63                       26 25                     0
//! +---------------------------+------------------------+
//! |        handle type        |         index          |
//! +---------------------------+------------------------+
//! ```
//!
//! Decoding never validates the tag. A handle minted for a LAG decodes to a
//! perfectly good port index, so callers must not hand the wrong kind of
//! handle to a port operation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Raw handle value (matches `switch_handle_t`).
pub type RawHandle = u64;

/// Bit position of the handle type tag.
pub const HANDLE_TYPE_SHIFT: u32 = 26;

/// Mask selecting the dense index bits of a handle.
pub const HANDLE_INDEX_MASK: RawHandle = (1 << HANDLE_TYPE_SHIFT) - 1;

/// Object type tag carried in the upper bits of a handle.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleType {
    None = 0,
    Port = 1,
    Lag = 2,
    LagMember = 3,
    Interface = 4,
    Vrf = 5,
    Bd = 6,
    NextHop = 7,
    Neighbor = 8,
    Acl = 9,
    Meter = 10,
    Stp = 11,
    Tunnel = 12,
}

impl HandleType {
    /// Returns the tag for a raw type value, if it is a known one.
    pub fn from_raw(raw: u32) -> Option<Self> {
        let ty = match raw {
            0 => HandleType::None,
            1 => HandleType::Port,
            2 => HandleType::Lag,
            3 => HandleType::LagMember,
            4 => HandleType::Interface,
            5 => HandleType::Vrf,
            6 => HandleType::Bd,
            7 => HandleType::NextHop,
            8 => HandleType::Neighbor,
            9 => HandleType::Acl,
            10 => HandleType::Meter,
            11 => HandleType::Stp,
            12 => HandleType::Tunnel,
            _ => return None,
        };
        Some(ty)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            HandleType::None => "none",
            HandleType::Port => "port",
            HandleType::Lag => "lag",
            HandleType::LagMember => "lag_member",
            HandleType::Interface => "interface",
            HandleType::Vrf => "vrf",
            HandleType::Bd => "bd",
            HandleType::NextHop => "next_hop",
            HandleType::Neighbor => "neighbor",
            HandleType::Acl => "acl",
            HandleType::Meter => "meter",
            HandleType::Stp => "stp",
            HandleType::Tunnel => "tunnel",
        }
    }
}

impl fmt::Display for HandleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandleType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(HandleType::None),
            "port" => Ok(HandleType::Port),
            "lag" => Ok(HandleType::Lag),
            "lag_member" => Ok(HandleType::LagMember),
            "interface" => Ok(HandleType::Interface),
            "vrf" => Ok(HandleType::Vrf),
            "bd" => Ok(HandleType::Bd),
            "next_hop" => Ok(HandleType::NextHop),
            "neighbor" => Ok(HandleType::Neighbor),
            "acl" => Ok(HandleType::Acl),
            "meter" => Ok(HandleType::Meter),
            "stp" => Ok(HandleType::Stp),
            "tunnel" => Ok(HandleType::Tunnel),
            _ => Err(ParseError::InvalidHandleType(s.to_string())),
        }
    }
}

/// Composes a handle from a type tag and a dense index.
///
/// Index bits above [`HANDLE_INDEX_MASK`] are discarded.
pub const fn id_to_handle(ty: HandleType, id: u32) -> RawHandle {
    ((ty as RawHandle) << HANDLE_TYPE_SHIFT) | (id as RawHandle & HANDLE_INDEX_MASK)
}

/// Strips the type tag from a handle and returns the dense index.
///
/// No bounds checking is done; the caller range-checks the result.
pub const fn handle_to_id(handle: RawHandle) -> u32 {
    (handle & HANDLE_INDEX_MASK) as u32
}

/// Returns the raw type tag of a handle.
pub const fn handle_type(handle: RawHandle) -> u32 {
    (handle >> HANDLE_TYPE_SHIFT) as u32
}

/// A switchapi object handle.
///
/// Zero is the null handle: "no object". A bare integer with no tag decodes
/// to itself, which is how callers address ports by raw port number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwitchHandle(RawHandle);

impl SwitchHandle {
    /// The null handle.
    pub const NULL: Self = SwitchHandle(0);

    /// Mints a handle for object `ty` at dense index `id`.
    pub const fn new(ty: HandleType, id: u32) -> Self {
        SwitchHandle(id_to_handle(ty, id))
    }

    pub const fn from_raw(raw: RawHandle) -> Self {
        SwitchHandle(raw)
    }

    pub const fn as_raw(&self) -> RawHandle {
        self.0
    }

    /// Dense index carried by this handle (tag stripped, unchecked).
    pub const fn index(&self) -> u32 {
        handle_to_id(self.0)
    }

    /// Object type tag, if it is a known one.
    pub fn handle_type(&self) -> Option<HandleType> {
        HandleType::from_raw(handle_type(self.0))
    }

    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<RawHandle> for SwitchHandle {
    fn from(raw: RawHandle) -> Self {
        SwitchHandle(raw)
    }
}

impl fmt::Debug for SwitchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handle_type() {
            Some(ty) => write!(f, "{}({}, 0x{:x})", ty, self.index(), self.0),
            None => write!(f, "Handle(0x{:x})", self.0),
        }
    }
}

impl fmt::Display for SwitchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}
