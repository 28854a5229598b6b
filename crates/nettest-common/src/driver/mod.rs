//! Device driver seam.
//!
//! Connecting to devices and turning their command output into structured
//! data is the job of an external automation framework. The checks only see
//! it through [`DeviceDriver`]; this crate ships two implementations:
//!
//! - [`SnapshotDriver`] serves recorded JSON output from a directory tree
//! - [`MemoryDriver`] serves data registered in code, for tests

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::testbed::Device;

pub mod memory;
pub mod snapshot;

pub use memory::{DriverCall, MemoryDriver};
pub use snapshot::SnapshotDriver;

// ── Errors ──────────────────────────────────────────────────────────

/// The connection failures a testbed tolerates during common setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectFailureKind {
    Timeout,
    StateMachine,
    Connection,
}

impl fmt::Display for ConnectFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectFailureKind::Timeout => write!(f, "timeout"),
            ConnectFailureKind::StateMachine => write!(f, "state machine error"),
            ConnectFailureKind::Connection => write!(f, "connection error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{device}: {kind}: {reason}")]
pub struct ConnectError {
    pub device: String,
    pub kind: ConnectFailureKind,
    pub reason: String,
}

impl ConnectError {
    pub fn new(device: &Device, kind: ConnectFailureKind, reason: impl Into<String>) -> Self {
        Self {
            device: device.name.clone(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Returned by [`crate::Testbed::connect`] when at least one device stayed down.
#[derive(Debug, Clone, Error)]
#[error("unable to connect to {} of {} device(s)", .failures.len(), .attempted)]
pub struct ConnectAllError {
    pub attempted: usize,
    pub failures: Vec<ConnectError>,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{device}: device is not connected")]
    NotConnected { device: String },
    #[error("{device}: no data available for {what}")]
    Unavailable { device: String, what: String },
    #[error("{device}: failed to read {path}: {source}")]
    Io {
        device: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{device}: invalid JSON in {path}: {source}")]
    Decode {
        device: String,
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// ── Seam ────────────────────────────────────────────────────────────

/// Access to live (or recorded) devices.
pub trait DeviceDriver {
    /// Open a session to the device.
    fn connect(&mut self, device: &Device) -> Result<(), ConnectError>;

    /// Learn a feature (e.g. `interface`) and return its structured model.
    fn learn(&mut self, device: &Device, feature: &str) -> Result<Value, DriverError>;

    /// Run a show command (e.g. `show version`) and return the parsed output.
    fn parse(&mut self, device: &Device, command: &str) -> Result<Value, DriverError>;
}

pub(crate) fn ensure_connected(device: &Device) -> Result<(), DriverError> {
    if device.is_connected() {
        Ok(())
    } else {
        Err(DriverError::NotConnected {
            device: device.name.clone(),
        })
    }
}
