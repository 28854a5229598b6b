//! Testbed topology: the devices under test and how to reach them.
//!
//! Testbeds use the pyATS YAML layout:
//!
//! ```yaml
//! testbed:
//!   name: sandbox
//!   credentials:
//!     default: { username: admin, password: admin }
//! devices:
//!   R1:
//!     os: iosxe
//!     type: router
//!     connections:
//!       cli: { protocol: ssh, ip: 10.10.20.48, port: 22 }
//! ```
//!
//! Devices keep the insertion order of the `devices:` mapping; every check
//! visits them in that order.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::driver::{ConnectAllError, DeviceDriver};

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TestbedError {
    #[error("failed to read testbed file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid testbed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid device {name}: {reason}")]
    InvalidDevice { name: String, reason: String },
}

// ── Topology description ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TestbedInput {
    testbed: TestbedHeader,
    devices: serde_yaml::Mapping,
}

/// The `testbed:` block of a topology file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestbedHeader {
    pub name: Option<String>,
    pub credentials: BTreeMap<String, Credential>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

/// One entry of a device's `connections:` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSpec {
    pub protocol: Option<String>,
    pub ip: Option<String>,
    pub port: Option<u16>,
}

/// Static description of a device, as written in the topology file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSpec {
    /// Operating-system identifier (`ios`, `iosxe`, `nxos`, ...).
    pub os: String,
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    pub platform: Option<String>,
    pub alias: Option<String>,
    pub credentials: BTreeMap<String, Credential>,
    pub connections: BTreeMap<String, ConnectionSpec>,
}

// ── Live model ──────────────────────────────────────────────────────

/// A device under test together with its connection state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub name: String,
    pub spec: DeviceSpec,
    connected: bool,
}

impl Device {
    pub fn new(name: impl Into<String>, spec: DeviceSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            connected: false,
        }
    }

    pub fn os(&self) -> &str {
        &self.spec.os
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// The set of devices under test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Testbed {
    pub header: TestbedHeader,
    devices: Vec<Device>,
}

impl Testbed {
    /// Load a testbed from a YAML topology file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TestbedError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TestbedError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let testbed = Self::from_yaml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            devices = testbed.devices.len(),
            "testbed loaded"
        );
        Ok(testbed)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, TestbedError> {
        let parsed: TestbedInput = if input.trim().is_empty() {
            TestbedInput::default()
        } else {
            serde_yaml::from_str(input)?
        };

        let mut devices = Vec::with_capacity(parsed.devices.len());
        for (key, value) in parsed.devices {
            let name = match key.as_str() {
                Some(name) if !name.trim().is_empty() => name.trim().to_string(),
                _ => {
                    return Err(TestbedError::InvalidDevice {
                        name: format!("{key:?}"),
                        reason: "device names must be non-empty strings".into(),
                    });
                }
            };
            let spec: DeviceSpec = if value.is_null() {
                DeviceSpec::default()
            } else {
                serde_yaml::from_value(value).map_err(|e| TestbedError::InvalidDevice {
                    name: name.clone(),
                    reason: e.to_string(),
                })?
            };
            if spec.os.trim().is_empty() {
                return Err(TestbedError::InvalidDevice {
                    name,
                    reason: "missing `os`".into(),
                });
            }
            devices.push(Device::new(name, spec));
        }

        Ok(Self {
            header: parsed.testbed,
            devices,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.header.name.as_deref()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Devices whose OS identifier is in `supported`, in testbed order.
    pub fn supported_devices<'a>(
        &'a self,
        supported: &'a [String],
    ) -> impl Iterator<Item = &'a Device> + 'a {
        self.devices
            .iter()
            .filter(move |d| supported.iter().any(|os| os == d.os()))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Connect every device that is not connected yet.
    ///
    /// Every device is attempted even when an earlier one fails; the
    /// failures are returned together once all attempts are done.
    pub fn connect(&mut self, driver: &mut dyn DeviceDriver) -> Result<(), ConnectAllError> {
        let mut failures = Vec::new();
        let mut attempted = 0;

        for device in &mut self.devices {
            if device.connected {
                continue;
            }
            attempted += 1;
            tracing::debug!(device = %device.name, os = device.os(), "connecting");
            match driver.connect(device) {
                Ok(()) => {
                    device.connected = true;
                    tracing::info!(device = %device.name, "connected");
                }
                Err(e) => {
                    tracing::warn!(device = %device.name, kind = %e.kind, reason = %e.reason, "connect failed");
                    failures.push(e);
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ConnectAllError {
                attempted,
                failures,
            })
        }
    }
}
