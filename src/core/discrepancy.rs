use crate::domain::model::{BeelineRecord, Discrepancy, IdentityMap, PrismRecord};
use std::collections::{HashMap, HashSet};

/// MasterCard ID -> every `units` string reported for it.
///
/// Answers the same question as scanning all Beeline rows for an exact
/// `(id, units)` pair, without the nested loop.
#[derive(Debug, Default)]
pub struct BeelineIndex<'a> {
    units_by_id: HashMap<&'a str, HashSet<&'a str>>,
}

impl<'a> BeelineIndex<'a> {
    pub fn build(records: &'a [BeelineRecord]) -> Self {
        let mut units_by_id: HashMap<&str, HashSet<&str>> = HashMap::new();
        for record in records {
            units_by_id
                .entry(record.mastercard_id.as_str())
                .or_default()
                .insert(record.units.as_str());
        }
        Self { units_by_id }
    }

    /// Exact string comparison: "8.0" does not match "8".
    pub fn contains(&self, mastercard_id: &str, units: &str) -> bool {
        self.units_by_id
            .get(mastercard_id)
            .is_some_and(|units_seen| units_seen.contains(units))
    }
}

/// Walks the Prism records in order and reports each one that has no
/// identity mapping or no Beeline row with identical hours.
pub fn find_discrepancies(
    prism: &[PrismRecord],
    beeline: &[BeelineRecord],
    identity_map: &IdentityMap,
) -> Vec<Discrepancy> {
    let index = BeelineIndex::build(beeline);
    let mut discrepancies = Vec::new();

    for record in prism {
        let Some(mastercard_id) = identity_map.get(&record.fulcrum_id) else {
            tracing::debug!("No MasterCard ID for Fulcrum ID '{}'", record.fulcrum_id);
            discrepancies.push(Discrepancy::unmapped(record.fulcrum_id.as_str()));
            continue;
        };

        if !index.contains(mastercard_id, &record.total_hours) {
            tracing::debug!(
                "Hours '{}' for {} -> {} not found in Beeline",
                record.total_hours,
                record.fulcrum_id,
                mastercard_id
            );
            discrepancies.push(Discrepancy::hours_mismatch(
                record.fulcrum_id.as_str(),
                mastercard_id,
            ));
        }
    }

    discrepancies
}
