//! The closed result-kind enumeration shared by the VFS and the shell.
//!
//! Every fallible operation in this crate returns [`Error`] rather than a
//! per-module error type. The set is closed deliberately: callers match on
//! symbolic kinds (`Entry`, `Access`, ...) instead of inspecting message
//! strings, and the shell's `?` environment variable stores the kind itself.

use std::fmt;

/// Closed set of result kinds returned by VFS and shell operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    Ok,
    Error,
    Memory,
    Access,
    Address,
    Busy,
    Device,
    Idle,
    Interface,
    Invalid,
    Timeout,
    Value,
    Entry,
    Exist,
    Empty,
    Full,
}

impl Error {
    /// Symbolic name as printed by the shell on command failure (§4.10).
    pub const fn name(self) -> &'static str {
        match self {
            Error::Ok => "Ok",
            Error::Error => "Error",
            Error::Memory => "Memory",
            Error::Access => "Access",
            Error::Address => "Address",
            Error::Busy => "Busy",
            Error::Device => "Device",
            Error::Idle => "Idle",
            Error::Interface => "Interface",
            Error::Invalid => "Invalid",
            Error::Timeout => "Timeout",
            Error::Value => "Value",
            Error::Entry => "Entry",
            Error::Exist => "Exist",
            Error::Empty => "Empty",
            Error::Full => "Full",
        }
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Error::Ok)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::error::Error for Error {}

/// Convenience alias; most of the crate's fallible functions return this.
pub type Result<T> = std::result::Result<T, Error>;

/// Process-level failures that are not part of the VFS/shell domain
/// protocol: CLI parsing, boot-time wiring, a poisoned lock. Never returned
/// by VFS or shell APIs — confined to binaries and top-level setup.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("initialization failed: {0}")]
    Init(String),

    #[error("failed to read script file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid command line: {0}")]
    Args(#[from] clap::Error),
}

impl From<Error> for HostError {
    fn from(kind: Error) -> Self {
        HostError::Init(format!("boot-time VFS operation failed: {kind}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ Symbolic names ============

    #[test]
    fn name_round_trips_every_variant() {
        assert_eq!(Error::Entry.name(), "Entry");
        assert_eq!(Error::Access.name(), "Access");
        assert_eq!(Error::Full.name(), "Full");
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(format!("{}", Error::Memory), "Memory");
    }

    #[test]
    fn is_ok_only_for_ok_variant() {
        assert!(Error::Ok.is_ok());
        assert!(!Error::Error.is_ok());
    }

    #[test]
    fn host_error_wraps_domain_error() {
        let host: HostError = Error::Busy.into();
        assert!(format!("{host}").contains("Busy"));
    }
}
