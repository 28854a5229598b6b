//! Script reports: the section trees of one script run, rendered as the
//! detailed-results table on stdout and optionally saved as JSON.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::steps::{Outcome, Step, rollup};

const RESULT_COLUMN: usize = 72;
const RULE_WIDTH: usize = 80;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write results to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode results: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ScriptReport {
    name: String,
    started: DateTime<Utc>,
    finished: Option<DateTime<Utc>>,
    sections: Vec<Step>,
}

impl ScriptReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: Utc::now(),
            finished: None,
            sections: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open a top-level section.
    pub fn section(&mut self, name: impl Into<String>) -> &mut Step {
        self.sections.push(Step::new(name));
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    /// Attach a section built elsewhere.
    pub fn push_section(&mut self, section: Step) {
        self.sections.push(section);
    }

    pub fn sections(&self) -> &[Step] {
        &self.sections
    }

    pub fn section_named(&self, name: &str) -> Option<&Step> {
        self.sections.iter().find(|s| s.name() == name)
    }

    pub fn finish(&mut self) {
        self.finished = Some(Utc::now());
    }

    pub fn finished(&self) -> Option<DateTime<Utc>> {
        self.finished
    }

    pub fn result(&self) -> Outcome {
        rollup(self.sections.iter().map(Step::result))
    }

    /// Section results counted per outcome, in [`Outcome::ALL`] order.
    pub fn counts(&self) -> Vec<(Outcome, usize)> {
        Outcome::ALL
            .iter()
            .map(|o| (*o, self.sections.iter().filter(|s| s.result() == *o).count()))
            .collect()
    }

    /// Detailed results: the section tree with a result column, then the
    /// per-outcome summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let rule = "-".repeat(RULE_WIDTH);

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Detailed Results: {}", self.name);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            " {:<width$}RESULT",
            "SECTIONS/TESTCASES",
            width = RESULT_COLUMN - 1
        );
        let _ = writeln!(out, "{rule}");
        out.push_str(".\n");
        render_children(&mut out, &self.sections, "");

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Summary: {}", self.name);
        let _ = writeln!(out, "{rule}");
        for (outcome, count) in self.counts() {
            let _ = writeln!(out, " Number of {:<width$}{count:>3}", outcome.label(), width = RESULT_COLUMN - 14);
        }
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            " {:<width$}{:>5.1} %",
            "Success Rate",
            self.success_rate(),
            width = RESULT_COLUMN - 4
        );
        let _ = writeln!(out, "{rule}");
        out
    }

    /// Percentage of sections that passed or were skipped.
    pub fn success_rate(&self) -> f64 {
        if self.sections.is_empty() {
            return 100.0;
        }
        let ok = self
            .sections
            .iter()
            .filter(|s| s.result().is_success())
            .count();
        ok as f64 * 100.0 / self.sections.len() as f64
    }
}

fn render_children(out: &mut String, steps: &[Step], indent: &str) {
    for (i, step) in steps.iter().enumerate() {
        let last = i + 1 == steps.len();
        let connector = if last { "`-- " } else { "|-- " };
        let label = format!("{indent}{connector}{}", step.name());
        if label.chars().count() < RESULT_COLUMN {
            let _ = writeln!(
                out,
                "{label:<width$}{}",
                step.result().label(),
                width = RESULT_COLUMN
            );
        } else {
            let _ = writeln!(out, "{label} {}", step.result().label());
        }
        for mark in step.marks() {
            if let Some(message) = &mark.message
                && mark.outcome != Outcome::Passed
            {
                let pad = if last { "    " } else { "|   " };
                let _ = writeln!(out, "{indent}{pad}  {}: {message}", mark.outcome.label());
            }
        }
        let child_indent = format!("{indent}{}", if last { "    " } else { "|   " });
        render_children(out, step.children(), &child_indent);
    }
}

impl Serialize for ScriptReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ScriptReport", 5)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("result", &self.result())?;
        s.serialize_field("started", &self.started)?;
        s.serialize_field("finished", &self.finished)?;
        s.serialize_field("sections", &self.sections)?;
        s.end()
    }
}

/// Worst result across several scripts; no scripts at all counts as passed.
pub fn aggregate(reports: &[ScriptReport]) -> Outcome {
    rollup(reports.iter().map(ScriptReport::result))
}

/// Save reports as a pretty-printed JSON array.
pub fn write_json(path: impl AsRef<Path>, reports: &[ScriptReport]) -> Result<(), ReportError> {
    let path = path.as_ref();
    let mut body = serde_json::to_string_pretty(reports)?;
    body.push('\n');
    std::fs::write(path, body).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::info!(path = %path.display(), scripts = reports.len(), "results written");
    Ok(())
}
