//! Nested results tree.
//!
//! Sections, subsections and test steps are all [`Step`]s: a name, the
//! outcomes explicitly recorded on it (each with an optional message), and
//! child steps. Recording an outcome never stops the caller; a step can
//! collect several failures, and evaluation continues with the next step.
//!
//! The result of a step is the rollup of its own outcomes and its children's
//! results, using the severity order of [`Outcome`]. A step with nothing
//! recorded and no children passed.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Step outcome, ordered by rollup severity (lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Skipped,
    Passed,
    Blocked,
    Failed,
    Errored,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Outcome::Passed,
        Outcome::Failed,
        Outcome::Errored,
        Outcome::Blocked,
        Outcome::Skipped,
    ];

    pub fn combine(self, other: Outcome) -> Outcome {
        self.max(other)
    }

    /// Passed and skipped results do not fail a run.
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Passed | Outcome::Skipped)
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Skipped => "SKIPPED",
            Outcome::Passed => "PASSED",
            Outcome::Blocked => "BLOCKED",
            Outcome::Failed => "FAILED",
            Outcome::Errored => "ERRORED",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fold a set of results; an empty set passed.
pub fn rollup(outcomes: impl IntoIterator<Item = Outcome>) -> Outcome {
    outcomes
        .into_iter()
        .reduce(Outcome::combine)
        .unwrap_or(Outcome::Passed)
}

/// An outcome recorded on a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    name: String,
    description: Option<String>,
    marks: Vec<Mark>,
    children: Vec<Step>,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            marks: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Open a child step and return it.
    pub fn start(&mut self, name: impl Into<String>) -> &mut Step {
        let step = Step::new(name);
        tracing::debug!(parent = %self.name, step = %step.name, "starting step");
        self.children.push(step);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn describe(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn mark(&mut self, outcome: Outcome, message: Option<String>) {
        self.marks.push(Mark { outcome, message });
    }

    pub fn passed(&mut self, message: impl Into<String>) {
        self.mark(Outcome::Passed, Some(message.into()));
    }

    pub fn failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(step = %self.name, "{message}");
        self.mark(Outcome::Failed, Some(message));
    }

    pub fn skipped(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(step = %self.name, "skipped: {message}");
        self.mark(Outcome::Skipped, Some(message));
    }

    pub fn errored(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(step = %self.name, "errored: {message}");
        self.mark(Outcome::Errored, Some(message));
    }

    pub fn blocked(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(step = %self.name, "blocked: {message}");
        self.mark(Outcome::Blocked, Some(message));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Messages recorded with `outcome`, in order.
    pub fn messages(&self, outcome: Outcome) -> impl Iterator<Item = &str> {
        self.marks
            .iter()
            .filter(move |m| m.outcome == outcome)
            .filter_map(|m| m.message.as_deref())
    }

    pub fn children(&self) -> &[Step] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Step> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Walk down the tree by child names.
    pub fn find(&self, path: &[&str]) -> Option<&Step> {
        path.iter().try_fold(self, |step, name| step.child(name))
    }

    pub fn result(&self) -> Outcome {
        rollup(
            self.marks
                .iter()
                .map(|m| m.outcome)
                .chain(self.children.iter().map(Step::result)),
        )
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Step", 5)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("result", &self.result())?;
        if let Some(description) = &self.description {
            s.serialize_field("description", description)?;
        } else {
            s.skip_field("description")?;
        }
        s.serialize_field("marks", &self.marks)?;
        s.serialize_field("steps", &self.children)?;
        s.end()
    }
}
