//! switchapi status codes and error handling.
//!
//! Hardware and control-plane failures are reported as [`SwitchStatus`]
//! codes at the C boundary and as [`SwitchError`] inside Rust.

use std::fmt;
use thiserror::Error;

/// switchapi status codes (`switch_status_t`).
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchStatus {
    Success = 0,
    Failure = 1,
    NoMemory = 2,
    InsufficientResources = 3,
    ItemAlreadyExists = 4,
    ItemNotFound = 5,
    InvalidParameter = 6,
    NotSupported = 7,
    HwFailure = 8,
    Uninitialized = 9,
}

impl SwitchStatus {
    /// Creates a status from a raw value. Unknown values map to `Failure`.
    pub fn from_raw(status: i32) -> Self {
        match status {
            0 => SwitchStatus::Success,
            1 => SwitchStatus::Failure,
            2 => SwitchStatus::NoMemory,
            3 => SwitchStatus::InsufficientResources,
            4 => SwitchStatus::ItemAlreadyExists,
            5 => SwitchStatus::ItemNotFound,
            6 => SwitchStatus::InvalidParameter,
            7 => SwitchStatus::NotSupported,
            8 => SwitchStatus::HwFailure,
            9 => SwitchStatus::Uninitialized,
            _ => SwitchStatus::Failure,
        }
    }

    pub const fn as_raw(&self) -> i32 {
        *self as i32
    }

    pub fn is_success(&self) -> bool {
        *self == SwitchStatus::Success
    }

    pub fn is_error(&self) -> bool {
        *self != SwitchStatus::Success
    }

    /// Converts to a Result, returning Ok(()) for success.
    pub fn into_result(self) -> SwitchResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(SwitchError::from_status(self))
        }
    }
}

impl fmt::Display for SwitchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SwitchStatus::Success => "SWITCH_STATUS_SUCCESS",
            SwitchStatus::Failure => "SWITCH_STATUS_FAILURE",
            SwitchStatus::NoMemory => "SWITCH_STATUS_NO_MEMORY",
            SwitchStatus::InsufficientResources => "SWITCH_STATUS_INSUFFICIENT_RESOURCES",
            SwitchStatus::ItemAlreadyExists => "SWITCH_STATUS_ITEM_ALREADY_EXISTS",
            SwitchStatus::ItemNotFound => "SWITCH_STATUS_ITEM_NOT_FOUND",
            SwitchStatus::InvalidParameter => "SWITCH_STATUS_INVALID_PARAMETER",
            SwitchStatus::NotSupported => "SWITCH_STATUS_NOT_SUPPORTED",
            SwitchStatus::HwFailure => "SWITCH_STATUS_HW_FAILURE",
            SwitchStatus::Uninitialized => "SWITCH_STATUS_UNINITIALIZED",
        };
        write!(f, "{}", s)
    }
}

/// Error type for switchapi operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwitchError {
    /// Operation failed with a bare status code.
    #[error("switchapi operation failed: {status}")]
    Status { status: SwitchStatus },

    /// Parameter out of range or malformed.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Referenced object does not exist.
    #[error("Item not found: {item}")]
    NotFound { item: String },

    /// A hardware table call failed.
    #[error("{table} table: {status}")]
    Hardware {
        table: &'static str,
        status: SwitchStatus,
    },

    #[error("Feature not supported: {feature}")]
    NotSupported { feature: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SwitchError {
    /// Creates an error from a status code.
    pub fn from_status(status: SwitchStatus) -> Self {
        match status {
            SwitchStatus::Success => SwitchError::Internal {
                message: "from_status called with success status".to_string(),
            },
            _ => SwitchError::Status { status },
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        SwitchError::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn not_found(item: impl Into<String>) -> Self {
        SwitchError::NotFound { item: item.into() }
    }

    /// Creates a hardware failure for `table` with the status the driver returned.
    pub fn hardware(table: &'static str, status: SwitchStatus) -> Self {
        SwitchError::Hardware { table, status }
    }

    pub fn not_supported(feature: impl Into<String>) -> Self {
        SwitchError::NotSupported {
            feature: feature.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        SwitchError::Internal {
            message: message.into(),
        }
    }

    /// Returns the status code this error reports at the C boundary.
    pub fn status(&self) -> SwitchStatus {
        match self {
            SwitchError::Status { status } => *status,
            SwitchError::InvalidParameter { .. } => SwitchStatus::InvalidParameter,
            SwitchError::NotFound { .. } => SwitchStatus::ItemNotFound,
            SwitchError::Hardware { status, .. } => *status,
            SwitchError::NotSupported { .. } => SwitchStatus::NotSupported,
            SwitchError::Internal { .. } => SwitchStatus::Failure,
        }
    }
}

/// Result type for switchapi operations.
pub type SwitchResult<T> = Result<T, SwitchError>;

/// Extension trait for converting raw status codes and results.
pub trait SwitchStatusExt {
    /// Collapses into the raw status code reported at the C boundary.
    fn to_status(&self) -> SwitchStatus;
}

impl SwitchStatusExt for i32 {
    fn to_status(&self) -> SwitchStatus {
        SwitchStatus::from_raw(*self)
    }
}

impl<T> SwitchStatusExt for SwitchResult<T> {
    fn to_status(&self) -> SwitchStatus {
        match self {
            Ok(_) => SwitchStatus::Success,
            Err(e) => e.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_success() {
        assert!(SwitchStatus::Success.is_success());
        assert!(!SwitchStatus::Success.is_error());
        assert!(SwitchStatus::Success.into_result().is_ok());
    }

    #[test]
    fn test_status_failure() {
        assert!(SwitchStatus::Failure.is_error());
        assert_eq!(
            SwitchStatus::Failure.into_result(),
            Err(SwitchError::Status {
                status: SwitchStatus::Failure
            })
        );
    }

    #[test]
    fn test_status_from_raw() {
        assert_eq!(SwitchStatus::from_raw(0), SwitchStatus::Success);
        assert_eq!(SwitchStatus::from_raw(5), SwitchStatus::ItemNotFound);
        assert_eq!(SwitchStatus::from_raw(6), SwitchStatus::InvalidParameter);
        assert_eq!(SwitchStatus::from_raw(-42), SwitchStatus::Failure);
        assert_eq!(SwitchStatus::HwFailure.as_raw(), 8);
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            SwitchError::invalid_parameter("port 300").status(),
            SwitchStatus::InvalidParameter
        );
        assert_eq!(SwitchError::not_found("meter").status(), SwitchStatus::ItemNotFound);
        assert_eq!(
            SwitchError::hardware("storm_control", SwitchStatus::NoMemory).status(),
            SwitchStatus::NoMemory
        );
        assert_eq!(SwitchError::internal("oops").status(), SwitchStatus::Failure);
    }

    #[test]
    fn test_result_to_status() {
        let ok: SwitchResult<u32> = Ok(1);
        assert_eq!(ok.to_status(), SwitchStatus::Success);
        let err: SwitchResult<u32> = Err(SwitchError::not_found("meter 3"));
        assert_eq!(err.to_status(), SwitchStatus::ItemNotFound);
        assert_eq!(7_i32.to_status(), SwitchStatus::NotSupported);
    }

    #[test]
    fn test_error_display() {
        let err = SwitchError::hardware("lag_group", SwitchStatus::HwFailure);
        assert_eq!(err.to_string(), "lag_group table: SWITCH_STATUS_HW_FAILURE");
    }
}
