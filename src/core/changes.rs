use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaChange {
    pub description: String,
}

impl SchemaChange {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Output of the schema diff provider. Immutable once produced; `diff` carries
/// ANSI color for terminal logs, `diff_no_color` is what the report renderer
/// embeds in the comment body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDiffReport {
    pub breaking_changes: Vec<SchemaChange>,
    pub dangerous_changes: Vec<SchemaChange>,
    pub diff: String,
    pub diff_no_color: String,
}

/// Read-only view over an optional diff report. Absent report means
/// "no schema change detected". The upstream report is trusted as-is.
#[derive(Debug, Clone, Copy)]
pub struct ChangeSummary<'a> {
    report: Option<&'a SchemaDiffReport>,
}

impl<'a> ChangeSummary<'a> {
    pub fn new(report: Option<&'a SchemaDiffReport>) -> Self {
        Self { report }
    }

    pub fn has_changes(&self) -> bool {
        self.report.is_some()
    }

    pub fn breaking(&self) -> &'a [SchemaChange] {
        self.report
            .map(|r| r.breaking_changes.as_slice())
            .unwrap_or(&[])
    }

    pub fn dangerous(&self) -> &'a [SchemaChange] {
        self.report
            .map(|r| r.dangerous_changes.as_slice())
            .unwrap_or(&[])
    }

    pub fn breaking_count(&self) -> usize {
        self.breaking().len()
    }

    pub fn dangerous_count(&self) -> usize {
        self.dangerous().len()
    }

    pub fn raw_diff(&self) -> Option<&'a str> {
        self.report.map(|r| r.diff_no_color.as_str())
    }
}
