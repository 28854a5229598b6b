//! Software version export.
//!
//! Parses `show version` on every supported device and appends one
//! `Device,Version` row per device to a persistent report. The header is
//! only written when the report did not exist yet, so rows accumulate
//! across runs.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Context as _;
use nettest_common::Step;
use nettest_common::learned::VersionRecord;
use serde::Serialize;

use crate::harness::{Check, Context};

pub const NAME: &str = "version_check";
pub const SHOW_VERSION: &str = "show version";
pub const HEADER: [&str; 2] = ["Device", "Version"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRow {
    pub device: String,
    pub version: String,
}

/// Append `rows` to `path`, writing the header first if the file is new.
pub fn append_report(path: &Path, rows: &[VersionRow]) -> anyhow::Result<()> {
    crate::ensure_parent_dir(path)?;
    let existed = path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    if !existed {
        writer.write_record(HEADER)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct VersionCheck;

impl VersionCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Check for VersionCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn setup(&mut self, ctx: &mut Context<'_>, _section: &mut Step) -> anyhow::Result<()> {
        for device in ctx.testbed.supported_devices(&ctx.config.supported_os) {
            tracing::info!("{} connected status: {}", device.name, device.is_connected());
        }
        Ok(())
    }

    fn test(&mut self, ctx: &mut Context<'_>, section: &mut Step) -> anyhow::Result<()> {
        let testbed = ctx.testbed;
        let path = ctx.config.version_csv.as_path();

        let step = section.start("Version Read/Write");
        step.describe("Read the software version running on the device and write it to a file");

        let mut rows = Vec::new();
        for device in testbed.supported_devices(&ctx.config.supported_os) {
            let device_step = step.start(format!("Reading version from {}", device.name));
            if !device.is_connected() {
                device_step.failed(format!("{} is not connected", device.name));
                continue;
            }

            let record = match ctx.driver.parse(device, SHOW_VERSION) {
                Ok(value) => VersionRecord::from_value(value),
                Err(e) => {
                    device_step.failed(e.to_string());
                    continue;
                }
            };
            match record.version() {
                Some(version) => {
                    tracing::info!("Version information collected for {}", device.name);
                    rows.push(VersionRow {
                        device: device.name.clone(),
                        version: version.to_string(),
                    });
                }
                None => device_step.errored(format!(
                    "{}: 'version' key not present in show version output",
                    device.name
                )),
            }
        }

        match append_report(path, &rows) {
            Ok(()) => {
                tracing::info!(path = %path.display(), rows = rows.len(), "version report appended");
            }
            Err(e) => step.failed(format!("unable to write {}: {e:#}", path.display())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_only_once() {
        let path = std::env::temp_dir().join(format!("nettest-version-unit-{}.csv", std::process::id()));
        std::fs::remove_file(&path).ok();

        let row = VersionRow {
            device: "R1".into(),
            version: "15.9(3)M2".into(),
        };
        append_report(&path, std::slice::from_ref(&row)).unwrap();
        append_report(&path, &[]).unwrap();
        append_report(&path, &[row]).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Device,Version\nR1,15.9(3)M2\nR1,15.9(3)M2\n"
        );
        std::fs::remove_file(&path).ok();
    }
}
