//! The external interface a device-parameter node binds to (§3, §4.6).
//!
//! Concrete transports (serial lines, a real ADC, a display bus) are
//! explicitly out of scope (§1); this module only specifies the contract
//! a device-parameter node drives and a deterministic in-memory double for
//! tests.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// An external, hardware-backed parameter source. `kind` identifies which
/// parameter within the device is addressed (the concrete numbering is
/// device-specific and owned by the caller).
pub trait Interface {
    fn get_parameter(&self, kind: u32) -> Result<i64>;
    fn set_parameter(&self, kind: u32, value: i64) -> Result<()>;
}

/// A deterministic in-memory interface double: every parameter starts at
/// zero and round-trips whatever was last written. Used by tests and by
/// `/dev` entries that have no real backing hardware.
#[derive(Default)]
pub struct MockInterface {
    values: RefCell<HashMap<u32, i64>>,
}

impl MockInterface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Interface for MockInterface {
    fn get_parameter(&self, kind: u32) -> Result<i64> {
        Ok(*self.values.borrow().get(&kind).unwrap_or(&0))
    }

    fn set_parameter(&self, kind: u32, value: i64) -> Result<()> {
        self.values.borrow_mut().insert(kind, value);
        Ok(())
    }
}

/// An interface that always fails, standing in for a detached/faulted
/// device so node tests can exercise the `Device`/`Interface` error paths.
pub struct FaultyInterface;

impl Interface for FaultyInterface {
    fn get_parameter(&self, _kind: u32) -> Result<i64> {
        Err(Error::Device)
    }

    fn set_parameter(&self, _kind: u32, _value: i64) -> Result<()> {
        Err(Error::Device)
    }
}
