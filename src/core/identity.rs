use crate::core::options::{DuplicatePolicy, SheetLayout};
use crate::core::projection::Projection;
use crate::domain::model::IdentityMap;
use crate::domain::sheet::Sheet;
use crate::utils::error::{ReconError, Result};
use std::collections::HashMap;

pub const MAPPING_FIELDS: [&str; 2] = ["fulcrum_id", "mastercard_id"];

/// Builds the Fulcrum -> MasterCard lookup from the mapping sheet.
#[derive(Debug, Clone)]
pub struct IdentityMapper {
    projection: Projection,
    policy: DuplicatePolicy,
}

impl IdentityMapper {
    pub fn new(layout: &SheetLayout, policy: DuplicatePolicy) -> Result<Self> {
        let projection = Projection::resolve(layout, &MAPPING_FIELDS).map_err(|field| {
            ReconError::ConfigValidationError {
                field: format!("mapping.columns.{}", field),
                message: "mapping layout must bind this field".to_string(),
            }
        })?;
        Ok(Self { projection, policy })
    }

    pub fn build(&self, sheet: &Sheet) -> Result<IdentityMap> {
        let rows = self
            .projection
            .read_sheet(sheet)
            .map_err(|e| ReconError::malformed_mapping(e.row, e.reason))?;

        let mut entries: HashMap<String, String> = HashMap::with_capacity(rows.len());
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (row, cells) in rows {
            let [fulcrum_id, mastercard_id] = <[String; 2]>::try_from(cells)
                .map_err(|_| ReconError::malformed_mapping(row, "expected two mapping cells"))?;
            let fulcrum_id = fulcrum_id.trim().to_string();
            let mastercard_id = mastercard_id.trim().to_string();

            if fulcrum_id.is_empty() {
                return Err(ReconError::malformed_mapping(row, "Fulcrum ID is empty"));
            }
            if mastercard_id.is_empty() {
                return Err(ReconError::malformed_mapping(row, "MasterCard ID is empty"));
            }

            if let Some(&earlier) = first_seen.get(&fulcrum_id) {
                match self.policy {
                    DuplicatePolicy::Reject => {
                        return Err(ReconError::malformed_mapping(
                            row,
                            format!(
                                "Fulcrum ID '{}' already mapped at row {}",
                                fulcrum_id, earlier
                            ),
                        ));
                    }
                    DuplicatePolicy::Overwrite => {
                        tracing::warn!(
                            "⚠️ Fulcrum ID '{}' at row {} overrides mapping from row {}",
                            fulcrum_id,
                            row,
                            earlier
                        );
                    }
                }
            } else {
                first_seen.insert(fulcrum_id.clone(), row);
            }

            entries.insert(fulcrum_id, mastercard_id);
        }

        tracing::debug!("Identity map built with {} entries", entries.len());
        Ok(IdentityMap::from_entries(entries))
    }
}
