//! Interface error check.
//!
//! Learns the `interface` feature on every supported device and fails each
//! interface reporting a non-zero value for one of the configured error
//! counters.

use nettest_common::Step;
use nettest_common::learned::{CounterReading, InterfaceTable};

use crate::harness::{Check, Context};

pub const NAME: &str = "interface_errors";
pub const LEARN_FEATURE: &str = "interface";

#[derive(Debug, Default)]
pub struct InterfaceErrors {
    learnt: Vec<(String, InterfaceTable)>,
}

impl InterfaceErrors {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Check for InterfaceErrors {
    fn name(&self) -> &'static str {
        NAME
    }

    fn setup(&mut self, ctx: &mut Context<'_>, _section: &mut Step) -> anyhow::Result<()> {
        self.learnt.clear();
        let testbed = ctx.testbed;

        for device in testbed.supported_devices(&ctx.config.supported_os) {
            tracing::info!("{} connected status: {}", device.name, device.is_connected());
            tracing::info!("Learning Interfaces for {}", device.name);

            let table = ctx
                .driver
                .learn(device, LEARN_FEATURE)
                .map_err(anyhow::Error::from)
                .and_then(|value| Ok(InterfaceTable::from_value(value)?));
            match table {
                Ok(table) => {
                    tracing::debug!(device = %device.name, interfaces = table.len(), "interfaces learnt");
                    self.learnt.push((device.name.clone(), table));
                }
                Err(e) => {
                    tracing::error!(device = %device.name, error = %e, "unable to learn interfaces");
                }
            }
        }
        Ok(())
    }

    fn test(&mut self, ctx: &mut Context<'_>, section: &mut Step) -> anyhow::Result<()> {
        for (device, table) in &self.learnt {
            let step = section.start(format!("Looking for Interface Errors on {device}"));
            evaluate(device, table, &ctx.config.error_counters, step);
        }
        Ok(())
    }
}

/// One `Checking Interface {name}` step per interface under `device_step`.
///
/// Interfaces without `counters` are skipped; a missing counter key is only
/// logged; every non-zero counter is reported as its own failure.
pub fn evaluate(device: &str, interfaces: &InterfaceTable, counters: &[String], device_step: &mut Step) {
    for (name, record) in interfaces.iter() {
        let step = device_step.start(format!("Checking Interface {name}"));

        let Some(readings) = record.counters() else {
            step.skipped(format!("Device {device} Interface {name} missing counters"));
            continue;
        };

        for counter in counters {
            match readings.get(counter) {
                CounterReading::Value(0) => {}
                CounterReading::Value(count) => step.failed(format!(
                    "Device {device} Interface {name} has a count of {count} for {counter}"
                )),
                CounterReading::Missing => {
                    tracing::info!("Device {device} Interface {name} missing {counter}");
                }
                CounterReading::Unreadable => {
                    tracing::warn!("Device {device} Interface {name} has an unreadable {counter}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nettest_common::Outcome;
    use serde_json::json;

    fn counters() -> Vec<String> {
        ["in_crc_errors", "in_errors", "out_errors"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn run(data: serde_json::Value) -> Step {
        let table = InterfaceTable::from_value(data).unwrap();
        let mut step = Step::new("Looking for Interface Errors on R1");
        evaluate("R1", &table, &counters(), &mut step);
        step
    }

    #[test]
    fn clean_counters_pass() {
        let step = run(json!({
            "Gi1": {"counters": {"in_crc_errors": 0, "in_errors": 0, "out_errors": 0}}
        }));
        assert_eq!(step.child("Checking Interface Gi1").unwrap().result(), Outcome::Passed);
        assert_eq!(step.result(), Outcome::Passed);
    }

    #[test]
    fn every_violated_counter_is_reported() {
        let step = run(json!({
            "Gi2": {"counters": {"in_crc_errors": 2, "in_errors": 0, "out_errors": 7}}
        }));
        let gi2 = step.child("Checking Interface Gi2").unwrap();
        assert_eq!(gi2.result(), Outcome::Failed);
        assert_eq!(
            gi2.messages(Outcome::Failed).collect::<Vec<_>>(),
            [
                "Device R1 Interface Gi2 has a count of 2 for in_crc_errors",
                "Device R1 Interface Gi2 has a count of 7 for out_errors",
            ]
        );
    }

    #[test]
    fn missing_counters_skip_the_interface() {
        let step = run(json!({"Loopback0": {"enabled": true}}));
        let lo = step.child("Checking Interface Loopback0").unwrap();
        assert_eq!(lo.result(), Outcome::Skipped);
        assert_eq!(
            lo.messages(Outcome::Skipped).collect::<Vec<_>>(),
            ["Device R1 Interface Loopback0 missing counters"]
        );
    }

    #[test]
    fn repeated_counter_override_reports_once() {
        let mut config = nettest_common::CheckConfig::default();
        config
            .set_error_counters(vec!["in_errors".into(), "in_errors".into(), " ".into()])
            .unwrap();

        let table = InterfaceTable::from_value(json!({"Gi1": {"counters": {"in_errors": 4}}})).unwrap();
        let mut step = Step::new("Looking for Interface Errors on R1");
        evaluate("R1", &table, &config.error_counters, &mut step);

        let gi1 = step.child("Checking Interface Gi1").unwrap();
        assert_eq!(
            gi1.messages(Outcome::Failed).collect::<Vec<_>>(),
            ["Device R1 Interface Gi1 has a count of 4 for in_errors"]
        );
    }

    #[test]
    fn missing_key_still_checks_the_others() {
        let step = run(json!({
            "Gi3": {"counters": {"in_errors": 0, "out_errors": 0}},
            "Gi4": {"counters": {"in_errors": 5}},
            "Gi5": {"counters": {"in_errors": "lots", "out_errors": 0}}
        }));
        assert_eq!(step.child("Checking Interface Gi3").unwrap().result(), Outcome::Passed);
        let gi4 = step.child("Checking Interface Gi4").unwrap();
        assert_eq!(gi4.result(), Outcome::Failed);
        assert_eq!(gi4.messages(Outcome::Failed).count(), 1);
        assert_eq!(step.child("Checking Interface Gi5").unwrap().result(), Outcome::Passed);
        assert_eq!(step.result(), Outcome::Failed);
    }
}
