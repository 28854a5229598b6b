//! In-memory driver: devices and their data registered in code.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::{ConnectError, ConnectFailureKind, DeviceDriver, DriverError, ensure_connected};
use crate::testbed::Device;

/// A call made through the driver, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Connect { device: String },
    Learn { device: String, feature: String },
    Parse { device: String, command: String },
}

impl DriverCall {
    pub fn device(&self) -> &str {
        match self {
            DriverCall::Connect { device }
            | DriverCall::Learn { device, .. }
            | DriverCall::Parse { device, .. } => device,
        }
    }
}

/// Driver backed by maps. Devices that were never registered refuse to connect.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    reachable: HashSet<String>,
    connect_failures: HashMap<String, ConnectFailureKind>,
    features: HashMap<(String, String), Value>,
    commands: HashMap<(String, String), Value>,
    calls: Vec<DriverCall>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a device as reachable without registering any data for it.
    pub fn with_device(mut self, device: &str) -> Self {
        self.reachable.insert(device.to_string());
        self
    }

    pub fn with_connect_failure(mut self, device: &str, kind: ConnectFailureKind) -> Self {
        self.connect_failures.insert(device.to_string(), kind);
        self
    }

    pub fn with_feature(mut self, device: &str, feature: &str, data: Value) -> Self {
        self.reachable.insert(device.to_string());
        self.features
            .insert((device.to_string(), feature.to_string()), data);
        self
    }

    pub fn with_command(mut self, device: &str, command: &str, data: Value) -> Self {
        self.reachable.insert(device.to_string());
        self.commands
            .insert((device.to_string(), command.to_string()), data);
        self
    }

    pub fn calls(&self) -> &[DriverCall] {
        &self.calls
    }

    /// Whether any learn or parse call reached `device`.
    pub fn was_queried(&self, device: &str) -> bool {
        self.calls
            .iter()
            .any(|c| !matches!(c, DriverCall::Connect { .. }) && c.device() == device)
    }
}

impl DeviceDriver for MemoryDriver {
    fn connect(&mut self, device: &Device) -> Result<(), ConnectError> {
        self.calls.push(DriverCall::Connect {
            device: device.name.clone(),
        });
        if let Some(kind) = self.connect_failures.get(&device.name) {
            return Err(ConnectError::new(device, *kind, "injected failure"));
        }
        if !self.reachable.contains(&device.name) {
            return Err(ConnectError::new(
                device,
                ConnectFailureKind::Connection,
                "device not reachable",
            ));
        }
        Ok(())
    }

    fn learn(&mut self, device: &Device, feature: &str) -> Result<Value, DriverError> {
        self.calls.push(DriverCall::Learn {
            device: device.name.clone(),
            feature: feature.to_string(),
        });
        ensure_connected(device)?;
        self.features
            .get(&(device.name.clone(), feature.to_string()))
            .cloned()
            .ok_or_else(|| DriverError::Unavailable {
                device: device.name.clone(),
                what: format!("feature {feature}"),
            })
    }

    fn parse(&mut self, device: &Device, command: &str) -> Result<Value, DriverError> {
        self.calls.push(DriverCall::Parse {
            device: device.name.clone(),
            command: command.to_string(),
        });
        ensure_connected(device)?;
        self.commands
            .get(&(device.name.clone(), command.to_string()))
            .cloned()
            .ok_or_else(|| DriverError::Unavailable {
                device: device.name.clone(),
                what: format!("command `{command}`"),
            })
    }
}
