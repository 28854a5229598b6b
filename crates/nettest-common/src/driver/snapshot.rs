//! Snapshot driver: serves recorded device output from disk.
//!
//! Layout under the snapshot root:
//!
//! ```text
//! <root>/<device>/                     exists => device is reachable
//! <root>/<device>/connect.toml         optional, forces a connect failure
//! <root>/<device>/learn/<feature>.json learned feature models
//! <root>/<device>/parse/<command>.json parsed show commands, words joined by `_`
//! ```
//!
//! `connect.toml` holds `error = "timeout" | "state_machine" | "connection"`
//! and an optional `reason`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use super::{ConnectError, ConnectFailureKind, DeviceDriver, DriverError, ensure_connected};
use crate::testbed::Device;

const CONNECT_OVERRIDE: &str = "connect.toml";

#[derive(Debug, Deserialize)]
struct ConnectOverride {
    error: ConnectFailureKind,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SnapshotDriver {
    root: PathBuf,
}

impl SnapshotDriver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn device_dir(&self, device: &Device) -> PathBuf {
        self.root.join(&device.name)
    }

    fn read_json(&self, device: &Device, path: &Path, what: String) -> Result<Value, DriverError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DriverError::Unavailable {
                    device: device.name.clone(),
                    what,
                });
            }
            Err(source) => {
                return Err(DriverError::Io {
                    device: device.name.clone(),
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| DriverError::Decode {
            device: device.name.clone(),
            path: path.display().to_string(),
            source,
        })
    }
}

/// File name a parsed command is stored under: `show version` → `show_version.json`.
pub fn command_file_name(command: &str) -> String {
    let words: Vec<String> = command
        .split_whitespace()
        .map(|w| w.to_ascii_lowercase())
        .collect();
    format!("{}.json", words.join("_"))
}

impl DeviceDriver for SnapshotDriver {
    fn connect(&mut self, device: &Device) -> Result<(), ConnectError> {
        let dir = self.device_dir(device);

        let override_path = dir.join(CONNECT_OVERRIDE);
        if let Ok(content) = std::fs::read_to_string(&override_path) {
            return match toml::from_str::<ConnectOverride>(&content) {
                Ok(o) => Err(ConnectError::new(
                    device,
                    o.error,
                    o.reason.unwrap_or_else(|| "recorded failure".into()),
                )),
                Err(e) => Err(ConnectError::new(
                    device,
                    ConnectFailureKind::Connection,
                    format!("unreadable {}: {e}", override_path.display()),
                )),
            };
        }

        if dir.is_dir() {
            tracing::trace!(device = %device.name, dir = %dir.display(), "snapshot session opened");
            Ok(())
        } else {
            Err(ConnectError::new(
                device,
                ConnectFailureKind::Connection,
                format!("no snapshot directory at {}", dir.display()),
            ))
        }
    }

    fn learn(&mut self, device: &Device, feature: &str) -> Result<Value, DriverError> {
        ensure_connected(device)?;
        let path = self
            .device_dir(device)
            .join("learn")
            .join(format!("{feature}.json"));
        self.read_json(device, &path, format!("feature {feature}"))
    }

    fn parse(&mut self, device: &Device, command: &str) -> Result<Value, DriverError> {
        ensure_connected(device)?;
        let path = self
            .device_dir(device)
            .join("parse")
            .join(command_file_name(command));
        self.read_json(device, &path, format!("command `{command}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testbed::Testbed;

    fn sandbox(prefix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "nettest-{prefix}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn testbed() -> Testbed {
        Testbed::from_yaml_str(
            "devices:\n  R1:\n    os: ios\n  R2:\n    os: iosxe\n  R3:\n    os: nxos\n",
        )
        .unwrap()
    }

    #[test]
    fn command_names_map_to_files() {
        assert_eq!(command_file_name("show version"), "show_version.json");
        assert_eq!(command_file_name("  Show   Interfaces "), "show_interfaces.json");
    }

    #[test]
    fn serves_recorded_output() {
        let root = sandbox("snapshot-serve");
        std::fs::create_dir_all(root.join("R1/parse")).unwrap();
        std::fs::create_dir_all(root.join("R1/learn")).unwrap();
        std::fs::write(
            root.join("R1/parse/show_version.json"),
            r#"{"version": {"version": "15.9(3)M2"}}"#,
        )
        .unwrap();
        std::fs::write(root.join("R1/learn/interface.json"), r#"{"Loopback0": {}}"#).unwrap();

        let mut tb = testbed();
        let mut driver = SnapshotDriver::new(&root);
        let _ = tb.connect(&mut driver);
        let r1 = tb.device("R1").unwrap();
        assert!(r1.is_connected());

        let version = driver.parse(r1, "show version").unwrap();
        assert_eq!(version["version"]["version"], "15.9(3)M2");
        let interfaces = driver.learn(r1, "interface").unwrap();
        assert!(interfaces.get("Loopback0").is_some());

        let err = driver.parse(r1, "show inventory").unwrap_err();
        assert!(matches!(err, DriverError::Unavailable { .. }));

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn missing_directory_and_overrides_fail_connect() {
        let root = sandbox("snapshot-connect");
        std::fs::create_dir_all(root.join("R1")).unwrap();
        std::fs::create_dir_all(root.join("R2")).unwrap();
        std::fs::write(
            root.join("R2/connect.toml"),
            "error = \"state_machine\"\nreason = \"stuck in rommon\"\n",
        )
        .unwrap();

        let mut tb = testbed();
        let mut driver = SnapshotDriver::new(&root);
        let err = tb.connect(&mut driver).unwrap_err();

        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.failures[0].device, "R2");
        assert_eq!(err.failures[0].kind, ConnectFailureKind::StateMachine);
        assert_eq!(err.failures[0].reason, "stuck in rommon");
        assert_eq!(err.failures[1].device, "R3");
        assert_eq!(err.failures[1].kind, ConnectFailureKind::Connection);

        let r3 = tb.device("R3").unwrap();
        assert!(matches!(
            driver.learn(r3, "interface"),
            Err(DriverError::NotConnected { .. })
        ));

        std::fs::remove_dir_all(&root).ok();
    }
}
