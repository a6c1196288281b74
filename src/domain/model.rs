use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const MAPPING_NOT_FOUND: &str = "MasterCard ID mapping not found";
pub const HOURS_MISMATCH: &str = "Discrepancy in hours";
pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimesheetSource {
    Prism,
    Beeline,
}

impl fmt::Display for TimesheetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimesheetSource::Prism => write!(f, "Prism"),
            TimesheetSource::Beeline => write!(f, "Beeline"),
        }
    }
}

/// Fulcrum ID -> MasterCard ID lookup, built once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    entries: HashMap<String, String>,
}

impl IdentityMap {
    pub(crate) fn from_entries(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn get(&self, fulcrum_id: &str) -> Option<&str> {
        self.entries.get(fulcrum_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One data row of the Prism export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrismRecord {
    pub fulcrum_id: String,
    pub hours_type: String,
    pub total_hours: String,
}

/// One data row of the Beeline export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeelineRecord {
    pub mastercard_id: String,
    pub units: String,
}

/// A flagged mismatch for one Prism record.
///
/// Serialized without a tag; the field set tells the variants apart, so the
/// wider variant is listed first for deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Discrepancy {
    HoursMismatch {
        #[serde(rename = "fulcrumId")]
        fulcrum_id: String,
        #[serde(rename = "masterCardId")]
        mastercard_id: String,
        #[serde(rename = "error")]
        reason: String,
    },
    UnmappedIdentity {
        #[serde(rename = "fulcrumId")]
        fulcrum_id: String,
        #[serde(rename = "error")]
        reason: String,
    },
}

impl Discrepancy {
    pub fn unmapped(fulcrum_id: impl Into<String>) -> Self {
        Discrepancy::UnmappedIdentity {
            fulcrum_id: fulcrum_id.into(),
            reason: MAPPING_NOT_FOUND.to_string(),
        }
    }

    pub fn hours_mismatch(fulcrum_id: impl Into<String>, mastercard_id: impl Into<String>) -> Self {
        Discrepancy::HoursMismatch {
            fulcrum_id: fulcrum_id.into(),
            mastercard_id: mastercard_id.into(),
            reason: HOURS_MISMATCH.to_string(),
        }
    }

    pub fn fulcrum_id(&self) -> &str {
        match self {
            Discrepancy::HoursMismatch { fulcrum_id, .. }
            | Discrepancy::UnmappedIdentity { fulcrum_id, .. } => fulcrum_id,
        }
    }

    pub fn mastercard_id(&self) -> Option<&str> {
        match self {
            Discrepancy::HoursMismatch { mastercard_id, .. } => Some(mastercard_id),
            Discrepancy::UnmappedIdentity { .. } => None,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Discrepancy::HoursMismatch { reason, .. }
            | Discrepancy::UnmappedIdentity { reason, .. } => reason,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, Discrepancy::UnmappedIdentity { .. })
    }
}

/// The response body of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub status: String,
    pub discrepancies: Vec<Discrepancy>,
}

impl ReconciliationReport {
    pub fn success(discrepancies: Vec<Discrepancy>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            discrepancies,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub mapping_entries: usize,
    pub prism_records: usize,
    pub beeline_records: usize,
    pub unmapped: usize,
    pub hours_mismatches: usize,
    pub generated_at: DateTime<Utc>,
}

impl ReconciliationSummary {
    pub fn total_discrepancies(&self) -> usize {
        self.unmapped + self.hours_mismatches
    }
}

/// Everything the extract phase hands to transform.
#[derive(Debug, Clone)]
pub struct ExtractedInputs {
    pub identity_map: IdentityMap,
    pub prism: Vec<PrismRecord>,
    pub beeline: Vec<BeelineRecord>,
}

#[derive(Debug, Clone)]
pub struct ReconciliationOutcome {
    pub report: ReconciliationReport,
    pub summary: ReconciliationSummary,
}
