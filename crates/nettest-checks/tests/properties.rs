//! Property-based tests for interface evaluation and the CSV exports.
//!
//! Interface tables are generated with any mix of missing `counters`,
//! missing counter keys, zero and non-zero values, and missing MACs.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use nettest_checks::interface_errors::evaluate;
use nettest_checks::interface_mac::{self, rows_for, write_report};
use nettest_checks::version_check::{self, VersionRow, append_report};
use nettest_common::learned::InterfaceTable;
use nettest_common::{Outcome, Step};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

const COUNTERS: [&str; 3] = ["in_crc_errors", "in_errors", "out_errors"];

// ─── Strategies ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct GeneratedInterface {
    counters: Option<[Option<u64>; 3]>,
    mac: Option<String>,
}

fn interface() -> impl Strategy<Value = GeneratedInterface> {
    (
        prop::option::of(prop::array::uniform3(prop::option::of(0u64..4))),
        prop::option::of("[0-9a-f]{4}\\.[0-9a-f]{4}\\.[0-9a-f]{4}"),
    )
        .prop_map(|(counters, mac)| GeneratedInterface { counters, mac })
}

fn interfaces() -> impl Strategy<Value = Vec<GeneratedInterface>> {
    prop::collection::vec(interface(), 0..8)
}

fn interface_name(i: usize) -> String {
    format!("GigabitEthernet{i}")
}

fn to_table(generated: &[GeneratedInterface]) -> InterfaceTable {
    let mut map = Map::new();
    for (i, intf) in generated.iter().enumerate() {
        let mut fields = Map::new();
        if let Some(values) = intf.counters {
            let mut counters = Map::new();
            for (key, value) in COUNTERS.iter().zip(values) {
                if let Some(v) = value {
                    counters.insert(key.to_string(), json!(v));
                }
            }
            fields.insert("counters".into(), Value::Object(counters));
        }
        if let Some(mac) = &intf.mac {
            fields.insert("mac_address".into(), json!(mac));
        }
        map.insert(interface_name(i), Value::Object(fields));
    }
    InterfaceTable::from_value(Value::Object(map)).unwrap()
}

fn scratch_file(prefix: &str) -> PathBuf {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    std::env::temp_dir().join(format!(
        "nettest-{prefix}-{}-{}.csv",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ))
}

// ─── Properties ─────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Exactly one failure per non-zero counter; no counters means skipped.
    #[test]
    fn evaluation_matches_counters(generated in interfaces()) {
        let table = to_table(&generated);
        let counters: Vec<String> = COUNTERS.iter().map(|s| s.to_string()).collect();
        let mut device = Step::new("Looking for Interface Errors on R1");
        evaluate("R1", &table, &counters, &mut device);

        prop_assert_eq!(device.children().len(), generated.len());
        for (i, intf) in generated.iter().enumerate() {
            let name = interface_name(i);
            let step = device.child(&format!("Checking Interface {name}")).unwrap();
            match intf.counters {
                None => prop_assert_eq!(step.result(), Outcome::Skipped),
                Some(values) => {
                    let expected: Vec<String> = COUNTERS
                        .iter()
                        .zip(values)
                        .filter_map(|(key, v)| match v {
                            Some(n) if n > 0 => Some(format!(
                                "Device R1 Interface {name} has a count of {n} for {key}"
                            )),
                            _ => None,
                        })
                        .collect();
                    let reported: Vec<String> =
                        step.messages(Outcome::Failed).map(String::from).collect();
                    let result = if expected.is_empty() { Outcome::Passed } else { Outcome::Failed };
                    prop_assert_eq!(reported, expected);
                    prop_assert_eq!(step.result(), result);
                }
            }
        }
    }

    /// One row per interface, MAC verbatim or the placeholder.
    #[test]
    fn mac_rows_follow_interfaces(generated in interfaces()) {
        let rows = rows_for("R1", &to_table(&generated));
        prop_assert_eq!(rows.len(), generated.len());
        for (i, (row, intf)) in rows.iter().zip(&generated).enumerate() {
            prop_assert_eq!(&row.interface, &interface_name(i));
            let expected = intf.mac.as_deref().unwrap_or(interface_mac::MAC_PLACEHOLDER);
            prop_assert_eq!(row.mac_address.as_str(), expected);
        }
    }

    /// Rewriting the same rows gives the same bytes.
    #[test]
    fn mac_report_rewrite_is_stable(generated in interfaces()) {
        let rows = rows_for("R1", &to_table(&generated));
        let path = scratch_file("mac-prop");
        write_report(&path, &rows).unwrap();
        let first = std::fs::read(&path).unwrap();
        write_report(&path, &rows).unwrap();
        let second = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        prop_assert_eq!(&first, &second);
        let text = String::from_utf8(first).unwrap();
        prop_assert_eq!(text.lines().count(), rows.len() + 1);
    }

    /// N appends: one header, N copies of the rows.
    #[test]
    fn version_appends_accumulate(runs in 1usize..5, devices in 0usize..4) {
        let rows: Vec<VersionRow> = (0..devices)
            .map(|i| VersionRow { device: format!("R{i}"), version: "17.3.1a".into() })
            .collect();
        let path = scratch_file("version-prop");
        for _ in 0..runs {
            append_report(&path, &rows).unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let header = version_check::HEADER.join(",");
        let lines: Vec<&str> = text.lines().collect();
        prop_assert_eq!(lines.iter().filter(|l| **l == header).count(), 1);
        prop_assert_eq!(lines[0], header.as_str());
        prop_assert_eq!(lines.len(), 1 + runs * devices);
    }
}
