use crate::core::discrepancy::find_discrepancies;
use crate::core::extract::{BeelineExtractor, PrismExtractor};
use crate::core::identity::IdentityMapper;
use crate::core::options::ReconcileOptions;
use crate::domain::model::{
    ExtractedInputs, ReconciliationOutcome, ReconciliationReport, ReconciliationSummary,
};
use crate::domain::sheet::Sheet;
use crate::utils::error::Result;

/// Runs the mapper and both extractors over already-parsed sheets.
pub fn extract_inputs(
    mapping: &Sheet,
    prism: &Sheet,
    beeline: &Sheet,
    options: &ReconcileOptions,
) -> Result<ExtractedInputs> {
    let identity_map =
        IdentityMapper::new(&options.mapping_layout, options.duplicate_policy)?.build(mapping)?;
    let prism = PrismExtractor::new(&options.prism_layout)?.extract(prism)?;
    let beeline = BeelineExtractor::new(&options.beeline_layout)?.extract(beeline)?;

    Ok(ExtractedInputs {
        identity_map,
        prism,
        beeline,
    })
}

/// Compares extracted inputs and assembles the report plus run counters.
pub fn compare(inputs: &ExtractedInputs) -> ReconciliationOutcome {
    let discrepancies = find_discrepancies(&inputs.prism, &inputs.beeline, &inputs.identity_map);
    let unmapped = discrepancies.iter().filter(|d| d.is_unmapped()).count();

    let summary = ReconciliationSummary {
        mapping_entries: inputs.identity_map.len(),
        prism_records: inputs.prism.len(),
        beeline_records: inputs.beeline.len(),
        unmapped,
        hours_mismatches: discrepancies.len() - unmapped,
        generated_at: chrono::Utc::now(),
    };

    ReconciliationOutcome {
        report: ReconciliationReport::success(discrepancies),
        summary,
    }
}

/// One full reconciliation over three parsed sheets. Any mapping or
/// extraction error fails the whole call.
pub fn reconcile(
    mapping: &Sheet,
    prism: &Sheet,
    beeline: &Sheet,
    options: &ReconcileOptions,
) -> Result<ReconciliationOutcome> {
    let inputs = extract_inputs(mapping, prism, beeline, options)?;
    Ok(compare(&inputs))
}
