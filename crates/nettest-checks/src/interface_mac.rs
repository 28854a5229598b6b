//! Interface/MAC export.
//!
//! Parses `show interfaces` on every supported device and writes one
//! `Device,Interface,MAC Address` row per interface. The report is rewritten
//! from scratch on every run.

use std::fs::File;
use std::path::Path;

use anyhow::Context as _;
use nettest_common::Step;
use nettest_common::learned::InterfaceTable;
use serde::Serialize;

use crate::harness::{Check, Context};

pub const NAME: &str = "interface_mac";
pub const SHOW_INTERFACES: &str = "show interfaces";
pub const MAC_PLACEHOLDER: &str = "N/A";
pub const HEADER: [&str; 3] = ["Device", "Interface", "MAC Address"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceRow {
    pub device: String,
    pub interface: String,
    pub mac_address: String,
}

/// Rows for one device, in interface order; interfaces without a MAC get
/// [`MAC_PLACEHOLDER`].
pub fn rows_for(device: &str, interfaces: &InterfaceTable) -> Vec<InterfaceRow> {
    interfaces
        .iter()
        .map(|(name, record)| InterfaceRow {
            device: device.to_string(),
            interface: name.to_string(),
            mac_address: record.mac_address().unwrap_or(MAC_PLACEHOLDER).to_string(),
        })
        .collect()
}

/// Truncate `path` and write the header followed by `rows`.
pub fn write_report(path: &Path, rows: &[InterfaceRow]) -> anyhow::Result<()> {
    crate::ensure_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct InterfaceMac;

impl InterfaceMac {
    pub fn new() -> Self {
        Self
    }
}

impl Check for InterfaceMac {
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
        let path = ctx.config.interface_csv.as_path();

        let step = section.start("Interface Read");
        step.describe("Read the interfaces and MAC addresses on the device and write it to a file");

        let mut rows = Vec::new();
        for device in testbed.supported_devices(&ctx.config.supported_os) {
            let device_step = step.start(format!("Collecting interfaces from {}", device.name));
            if !device.is_connected() {
                device_step.failed(format!("{} is not connected", device.name));
                continue;
            }

            let table = ctx
                .driver
                .parse(device, SHOW_INTERFACES)
                .map_err(anyhow::Error::from)
                .and_then(|value| Ok(InterfaceTable::from_value(value)?));
            match table {
                Ok(table) => {
                    let device_rows = rows_for(&device.name, &table);
                    tracing::debug!(device = %device.name, interfaces = device_rows.len(), "interfaces collected");
                    rows.extend(device_rows);
                }
                Err(e) => device_step.failed(format!("{e:#}")),
            }
        }

        match write_report(path, &rows) {
            Ok(()) => {
                tracing::info!(path = %path.display(), rows = rows.len(), "interface report written");
            }
            Err(e) => step.failed(format!("unable to write {}: {e:#}", path.display())),
        }
        Ok(())
    }
}
