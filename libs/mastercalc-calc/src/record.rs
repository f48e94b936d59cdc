//! Calculation output shared by all calculators

use serde::{Deserialize, Serialize};

/// History snapshot of a successful calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub name: String,
    pub description: String,
    pub result: String,
}

impl HistoryRecord {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            result: result.into(),
        }
    }
}

/// Result of a calculation function
///
/// `value` carries the typed numbers, `display` the multi-line result text
/// and `record` what gets appended to history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation<T> {
    pub value: T,
    pub display: String,
    pub record: HistoryRecord,
}

impl<T> Calculation<T> {
    pub fn new(value: T, display: impl Into<String>, record: HistoryRecord) -> Self {
        Self {
            value,
            display: display.into(),
            record,
        }
    }
}

/// Collects result lines
#[derive(Debug, Default)]
pub(crate) struct Lines {
    lines: Vec<String>,
}

impl Lines {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    pub(crate) fn line_if(self, condition: bool, text: impl Into<String>) -> Self {
        if condition {
            self.line(text)
        } else {
            self
        }
    }

    pub(crate) fn build(self) -> String {
        self.lines.join("\n")
    }
}
