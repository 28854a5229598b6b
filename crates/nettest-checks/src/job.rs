//! Job runner: the four checks in a fixed order, one script each.

use std::fmt::Write as _;

use nettest_common::report::ScriptReport;
use nettest_common::steps::rollup;
use nettest_common::Outcome;

use crate::connection::VerifyConnected;
use crate::harness::{Check, Harness};
use crate::interface_errors::InterfaceErrors;
use crate::interface_mac::InterfaceMac;
use crate::version_check::VersionCheck;

pub struct Task {
    pub id: &'static str,
    pub check: Box<dyn Check>,
}

/// Connection first, then the two exports, then the error check.
pub fn tasks() -> Vec<Task> {
    vec![
        Task {
            id: "Device Connections",
            check: Box::new(VerifyConnected::new()),
        },
        Task {
            id: "Interface_MAC",
            check: Box::new(InterfaceMac::new()),
        },
        Task {
            id: "Version_Check",
            check: Box::new(VersionCheck::new()),
        },
        Task {
            id: "Interface Errors",
            check: Box::new(InterfaceErrors::new()),
        },
    ]
}

#[derive(Debug, Clone)]
pub struct TaskResult {
    pub id: &'static str,
    pub report: ScriptReport,
}

/// Run every task; a failing task never stops the ones after it.
pub fn run(harness: &mut Harness<'_>, tasks: Vec<Task>) -> Vec<TaskResult> {
    tasks
        .into_iter()
        .map(|mut task| {
            tracing::info!(task = task.id, script = task.check.name(), "task starting");
            let report = harness.run(task.check.as_mut());
            TaskResult {
                id: task.id,
                report,
            }
        })
        .collect()
}

pub fn result(results: &[TaskResult]) -> Outcome {
    rollup(results.iter().map(|r| r.report.result()))
}

/// Task id, script name and result per task.
pub fn render_summary(results: &[TaskResult]) -> String {
    let mut out = String::new();
    let rule = "-".repeat(80);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Job Summary");
    let _ = writeln!(out, "{rule}");
    for (i, task) in results.iter().enumerate() {
        let label = format!("Task-{}: {} ({})", i + 1, task.id, task.report.name());
        let _ = writeln!(out, "{label:<72}{}", task.report.result().label());
    }
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{:<72}{}", "Overall", result(results).label());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_order() {
        let ids: Vec<(&str, &str)> = tasks().iter().map(|t| (t.id, t.check.name())).collect();
        assert_eq!(
            ids,
            [
                ("Device Connections", "verify_connected"),
                ("Interface_MAC", "interface_mac"),
                ("Version_Check", "version_check"),
                ("Interface Errors", "interface_errors"),
            ]
        );
    }
}
