use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// A verified terraform output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct OutputValue {
    #[tabled(rename = "Output")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Result of the destroy that always closes a lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "message")]
pub enum CleanupOutcome {
    Destroyed,
    /// Needs manual remediation; the message holds the full diagnostics.
    Failed(String),
}

impl CleanupOutcome {
    pub fn is_destroyed(&self) -> bool {
        matches!(self, CleanupOutcome::Destroyed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleReport {
    /// In query order.
    pub outputs: Vec<OutputValue>,
    pub cleanup: CleanupOutcome,
}

impl LifecycleReport {
    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|output| output.name == name)
            .map(|output| output.value.as_str())
    }
}

pub fn render_outputs(outputs: &[OutputValue]) -> String {
    Table::new(outputs).with(Style::rounded()).to_string()
}
