//! Check configuration.
//!
//! Every field is optional in the TOML input; an empty file (or no file at
//! all) yields the defaults below.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SUPPORTED_OS: [&str; 4] = ["ios", "iosxe", "iosxr", "nxos"];
pub const DEFAULT_ERROR_COUNTERS: [&str; 3] = ["in_crc_errors", "in_errors", "out_errors"];
pub const DEFAULT_INTERFACE_CSV: &str = "interfaces.csv";
pub const DEFAULT_VERSION_CSV: &str = "device_software.csv";
pub const DEFAULT_SNAPSHOT_DIR: &str = "snapshots";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Input (as written) ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfigInput {
    pub supported_os: Option<Vec<String>>,
    pub interface_errors: InterfaceErrorsInput,
    pub reports: ReportsInput,
    pub driver: DriverInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterfaceErrorsInput {
    pub counters: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportsInput {
    pub interface_csv: Option<PathBuf>,
    pub version_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverInput {
    pub snapshot_dir: Option<PathBuf>,
}

// ── Resolved ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// OS identifiers the checks query; other devices are left alone.
    pub supported_os: Vec<String>,
    /// Counter keys the interface-error check requires to be zero.
    pub error_counters: Vec<String>,
    pub interface_csv: PathBuf,
    pub version_csv: PathBuf,
    pub snapshot_dir: PathBuf,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            supported_os: DEFAULT_SUPPORTED_OS.iter().map(|s| s.to_string()).collect(),
            error_counters: DEFAULT_ERROR_COUNTERS.iter().map(|s| s.to_string()).collect(),
            interface_csv: PathBuf::from(DEFAULT_INTERFACE_CSV),
            version_csv: PathBuf::from(DEFAULT_VERSION_CSV),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
        }
    }
}

/// Trim, drop blanks and duplicates (first occurrence wins).
fn clean_list(what: &str, values: Vec<String>) -> Result<Vec<String>, ConfigError> {
    let mut seen = HashSet::new();
    let out: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect();
    if out.is_empty() {
        return Err(ConfigError::Invalid(format!("`{what}` must not be empty")));
    }
    Ok(out)
}

fn non_empty_path(what: &str, path: Option<PathBuf>, default: &str) -> Result<PathBuf, ConfigError> {
    match path {
        None => Ok(PathBuf::from(default)),
        Some(p) if p.as_os_str().is_empty() => {
            Err(ConfigError::Invalid(format!("`{what}` must not be empty")))
        }
        Some(p) => Ok(p),
    }
}

impl CheckConfigInput {
    pub fn resolve(self) -> Result<CheckConfig, ConfigError> {
        let defaults = CheckConfig::default();

        let supported_os = match self.supported_os {
            Some(list) => clean_list("supported_os", list)?,
            None => defaults.supported_os,
        };
        let error_counters = match self.interface_errors.counters {
            Some(list) => clean_list("interface_errors.counters", list)?,
            None => defaults.error_counters,
        };

        Ok(CheckConfig {
            supported_os,
            error_counters,
            interface_csv: non_empty_path(
                "reports.interface_csv",
                self.reports.interface_csv,
                DEFAULT_INTERFACE_CSV,
            )?,
            version_csv: non_empty_path(
                "reports.version_csv",
                self.reports.version_csv,
                DEFAULT_VERSION_CSV,
            )?,
            snapshot_dir: non_empty_path(
                "driver.snapshot_dir",
                self.driver.snapshot_dir,
                DEFAULT_SNAPSHOT_DIR,
            )?,
        })
    }
}

impl CheckConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(CheckConfig::default());
        }
        let parsed: CheckConfigInput = toml::from_str(input)?;
        parsed.resolve()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    /// Replace the error counters, cleaned and validated like the file value.
    pub fn set_error_counters(&mut self, counters: Vec<String>) -> Result<(), ConfigError> {
        self.error_counters = clean_list("interface_errors.counters", counters)?;
        Ok(())
    }
}
