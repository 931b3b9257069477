use serde::{Deserialize, Serialize};

/// One parameter's value at a sample point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentEntry {
    /// Parameter name.
    pub name: String,
    /// Physical value after scale and offset.
    pub value: f64,
}

/// Fully resolved parameter values for one evaluation-matrix row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterAssignment {
    /// Evaluation-matrix row this assignment was taken from.
    pub row: usize,
    /// Values in parameter declaration order.
    pub entries: Vec<AssignmentEntry>,
}

impl ParameterAssignment {
    /// Looks up the value assigned to `name`.
    pub fn value_of(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value)
    }

    /// Values in declaration order.
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|entry| entry.value).collect()
    }

    /// Renders the assignment as `name=value` pairs joined by spaces.
    pub fn to_key_values(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}={}", entry.name, entry.value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
