use crate::consts::status as code;
use crate::session::ProtocolMode;
use thiserror::Error;

/// A non-OK status code reported by the native transport library.
///
/// This is a pass-through translation: every native condition keeps its
/// numeric code (see [`Status::code`]) and a stable description.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    #[error("invalid handle")]
    InvalidHandle,
    #[error("device not found")]
    DeviceNotFound,
    #[error("device not opened")]
    DeviceNotOpened,
    #[error("IO error")]
    IoError,
    #[error("insufficient resources")]
    InsufficientResources,
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("invalid baud rate")]
    InvalidBaudRate,
    #[error("device not opened for erase")]
    DeviceNotOpenedForErase,
    #[error("device not opened for write")]
    DeviceNotOpenedForWrite,
    #[error("failed to write device")]
    FailedToWriteDevice,
    #[error("EEPROM read failed")]
    EepromReadFailed,
    #[error("EEPROM write failed")]
    EepromWriteFailed,
    #[error("EEPROM erase failed")]
    EepromEraseFailed,
    #[error("EEPROM not present")]
    EepromNotPresent,
    #[error("EEPROM not programmed")]
    EepromNotProgrammed,
    #[error("invalid args")]
    InvalidArgs,
    #[error("not supported")]
    NotSupported,
    #[error("other error")]
    OtherError,
    #[error("device list not ready")]
    DeviceListNotReady,
    /// A code outside the documented native range.
    #[error("unknown error (status {0})")]
    Unknown(u32),
}

impl Status {
    /// Translates a raw native status code. `OK` (0) maps to `Ok(())`.
    pub fn check(raw: u32) -> std::result::Result<(), Status> {
        if raw == code::OK {
            Ok(())
        } else {
            Err(Status::from_code(raw))
        }
    }

    /// Maps a non-OK native code to its `Status`. An OK code has no `Status`
    /// and is reported as `Unknown(0)`; use [`Status::check`] for raw results.
    pub fn from_code(raw: u32) -> Status {
        match raw {
            code::INVALID_HANDLE => Status::InvalidHandle,
            code::DEVICE_NOT_FOUND => Status::DeviceNotFound,
            code::DEVICE_NOT_OPENED => Status::DeviceNotOpened,
            code::IO_ERROR => Status::IoError,
            code::INSUFFICIENT_RESOURCES => Status::InsufficientResources,
            code::INVALID_PARAMETER => Status::InvalidParameter,
            code::INVALID_BAUD_RATE => Status::InvalidBaudRate,
            code::DEVICE_NOT_OPENED_FOR_ERASE => Status::DeviceNotOpenedForErase,
            code::DEVICE_NOT_OPENED_FOR_WRITE => Status::DeviceNotOpenedForWrite,
            code::FAILED_TO_WRITE_DEVICE => Status::FailedToWriteDevice,
            code::EEPROM_READ_FAILED => Status::EepromReadFailed,
            code::EEPROM_WRITE_FAILED => Status::EepromWriteFailed,
            code::EEPROM_ERASE_FAILED => Status::EepromEraseFailed,
            code::EEPROM_NOT_PRESENT => Status::EepromNotPresent,
            code::EEPROM_NOT_PROGRAMMED => Status::EepromNotProgrammed,
            code::INVALID_ARGS => Status::InvalidArgs,
            code::NOT_SUPPORTED => Status::NotSupported,
            code::OTHER_ERROR => Status::OtherError,
            code::DEVICE_LIST_NOT_READY => Status::DeviceListNotReady,
            other => Status::Unknown(other),
        }
    }

    /// The native numeric code for this condition.
    pub fn code(&self) -> u32 {
        match self {
            Status::InvalidHandle => code::INVALID_HANDLE,
            Status::DeviceNotFound => code::DEVICE_NOT_FOUND,
            Status::DeviceNotOpened => code::DEVICE_NOT_OPENED,
            Status::IoError => code::IO_ERROR,
            Status::InsufficientResources => code::INSUFFICIENT_RESOURCES,
            Status::InvalidParameter => code::INVALID_PARAMETER,
            Status::InvalidBaudRate => code::INVALID_BAUD_RATE,
            Status::DeviceNotOpenedForErase => code::DEVICE_NOT_OPENED_FOR_ERASE,
            Status::DeviceNotOpenedForWrite => code::DEVICE_NOT_OPENED_FOR_WRITE,
            Status::FailedToWriteDevice => code::FAILED_TO_WRITE_DEVICE,
            Status::EepromReadFailed => code::EEPROM_READ_FAILED,
            Status::EepromWriteFailed => code::EEPROM_WRITE_FAILED,
            Status::EepromEraseFailed => code::EEPROM_ERASE_FAILED,
            Status::EepromNotPresent => code::EEPROM_NOT_PRESENT,
            Status::EepromNotProgrammed => code::EEPROM_NOT_PROGRAMMED,
            Status::InvalidArgs => code::INVALID_ARGS,
            Status::NotSupported => code::NOT_SUPPORTED,
            Status::OtherError => code::OTHER_ERROR,
            Status::DeviceListNotReady => code::DEVICE_LIST_NOT_READY,
            Status::Unknown(raw) => *raw,
        }
    }
}

/// Errors that can occur when managing an MPSSE session.
///
/// Nothing here is fatal to the process; callers decide whether to retry or
/// abort. No operation in this crate retries on its own.
#[derive(Error, Debug)]
pub enum Error {
    /// The native transport returned a non-OK status.
    #[error("{operation} failed: {status} (status {code})", code = .status.code())]
    Transport {
        /// The transport operation that failed (e.g. `"open"`, `"spi_write"`).
        operation: &'static str,
        /// The translated native status.
        status: Status,
    },
    /// No enumerated device satisfied the open filter.
    ///
    /// Distinct from `Transport { status: Status::DeviceNotFound, .. }`, which
    /// is the chip itself reporting a missing device.
    #[error("No MPSSE device matched filter {filter}")]
    DeviceNotFound {
        /// The filter that was applied, rendered for diagnostics.
        filter: String,
    },
    /// A software-side argument check failed.
    #[error("Invalid parameter `{parameter}`: {message}")]
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// What was wrong with it.
        message: String,
    },
    /// The requested protocol mode conflicts with the one currently active.
    #[error("Cannot use {requested:?} while {active:?} mode is active; deactivate first")]
    ModeConflict {
        /// Mode active on the session.
        active: ProtocolMode,
        /// Mode the caller asked for.
        requested: ProtocolMode,
    },
    /// The session has been closed and can no longer issue transport calls.
    #[error("Session is closed")]
    SessionClosed,
}

/// Result type alias for MPSSE session operations.
pub type Result<T> = std::result::Result<T, Error>;

// Helpers for building context-carrying errors
pub(crate) fn transport(operation: &'static str) -> impl FnOnce(Status) -> Error {
    move |status| Error::Transport { operation, status }
}
pub(crate) fn invalid_parameter(parameter: &'static str, message: impl Into<String>) -> Error {
    Error::InvalidParameter {
        parameter,
        message: message.into(),
    }
}
