use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do when the mapping table lists the same Fulcrum ID twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Later rows replace earlier ones.
    #[default]
    Overwrite,
    /// A repeated Fulcrum ID is a malformed mapping.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBinding {
    pub index: usize,
    /// Expected header label; checked case-insensitively when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

impl ColumnBinding {
    pub fn at(index: usize) -> Self {
        Self {
            index,
            header: None,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }
}

/// Field name -> column binding for one input sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetLayout {
    columns: BTreeMap<String, ColumnBinding>,
}

impl SheetLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, field: impl Into<String>, binding: ColumnBinding) -> Self {
        self.columns.insert(field.into(), binding);
        self
    }

    pub fn get(&self, field: &str) -> Option<&ColumnBinding> {
        self.columns.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &ColumnBinding)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fields from `required` that this layout does not bind.
    pub fn missing_fields<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|field| !self.columns.contains_key(*field))
            .collect()
    }

    pub fn mapping_default() -> Self {
        Self::new()
            .bind("fulcrum_id", ColumnBinding::at(0))
            .bind("mastercard_id", ColumnBinding::at(1))
    }

    pub fn prism_default() -> Self {
        Self::new()
            .bind("fulcrum_id", ColumnBinding::at(5))
            .bind("hours_type", ColumnBinding::at(17))
            .bind("total_hours", ColumnBinding::at(18))
    }

    pub fn beeline_default() -> Self {
        Self::new()
            .bind("mastercard_id", ColumnBinding::at(10))
            .bind("units", ColumnBinding::at(6))
    }
}

/// Per-run knobs for the reconciliation core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub duplicate_policy: DuplicatePolicy,
    pub mapping_layout: SheetLayout,
    pub prism_layout: SheetLayout,
    pub beeline_layout: SheetLayout,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            mapping_layout: SheetLayout::mapping_default(),
            prism_layout: SheetLayout::prism_default(),
            beeline_layout: SheetLayout::beeline_default(),
        }
    }
}
