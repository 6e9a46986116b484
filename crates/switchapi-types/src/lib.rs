//! Common switchapi types for port control on a programmable switching ASIC.
//!
//! This crate provides the type-safe primitives shared by the switchapi
//! control plane:
//!
//! - [`SwitchHandle`]: opaque typed object handles and the handle codec
//!   ([`id_to_handle`], [`handle_to_id`])
//! - [`PortType`]: normal vs. CPU port classification
//! - [`PacketType`]: traffic classes used by storm control
//! - [`ApiPortInfo`]: the public port configuration stored per port

mod handle;
mod port;
mod port_info;

pub use handle::{
    handle_to_id, handle_type, id_to_handle, HandleType, RawHandle, SwitchHandle,
    HANDLE_INDEX_MASK, HANDLE_TYPE_SHIFT,
};
pub use port::{PacketType, PortType, SwitchDevice};
pub use port_info::{AdminState, ApiPortInfo, FecMode, PortSpeed};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid port type: {0}")]
    InvalidPortType(String),

    #[error("invalid packet type: {0}")]
    InvalidPacketType(String),

    #[error("invalid handle type: {0}")]
    InvalidHandleType(String),

    #[error("invalid value for {field}: {value}")]
    InvalidField { field: String, value: String },

    #[error("unknown port field: {0}")]
    UnknownField(String),
}

impl ParseError {
    pub(crate) fn invalid_field(field: &str, value: &str) -> Self {
        ParseError::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
