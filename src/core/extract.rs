use crate::core::options::SheetLayout;
use crate::core::projection::Projection;
use crate::domain::model::{BeelineRecord, PrismRecord, TimesheetSource};
use crate::domain::sheet::Sheet;
use crate::utils::error::{ReconError, Result};
use std::marker::PhantomData;

/// A record type that can be built from a fixed list of projected cells.
pub trait ProjectedRecord: Sized {
    const SOURCE: TimesheetSource;
    /// Field names, in the order `from_cells` expects them.
    const FIELDS: &'static [&'static str];

    fn from_cells(cells: Vec<String>) -> Option<Self>;
}

impl ProjectedRecord for PrismRecord {
    const SOURCE: TimesheetSource = TimesheetSource::Prism;
    const FIELDS: &'static [&'static str] = &["fulcrum_id", "hours_type", "total_hours"];

    fn from_cells(cells: Vec<String>) -> Option<Self> {
        let [fulcrum_id, hours_type, total_hours] = <[String; 3]>::try_from(cells).ok()?;
        Some(PrismRecord {
            fulcrum_id,
            hours_type,
            total_hours,
        })
    }
}

impl ProjectedRecord for BeelineRecord {
    const SOURCE: TimesheetSource = TimesheetSource::Beeline;
    const FIELDS: &'static [&'static str] = &["mastercard_id", "units"];

    fn from_cells(cells: Vec<String>) -> Option<Self> {
        let [mastercard_id, units] = <[String; 2]>::try_from(cells).ok()?;
        Some(BeelineRecord {
            mastercard_id,
            units,
        })
    }
}

/// Projects one timesheet export into typed records. All-or-nothing: the
/// first bad row aborts the whole sheet.
#[derive(Debug, Clone)]
pub struct TimesheetExtractor<R: ProjectedRecord> {
    projection: Projection,
    _record: PhantomData<R>,
}

impl<R: ProjectedRecord> TimesheetExtractor<R> {
    pub fn new(layout: &SheetLayout) -> Result<Self> {
        let projection = Projection::resolve(layout, R::FIELDS).map_err(|field| {
            ReconError::ConfigValidationError {
                field: format!("{}.columns.{}", R::SOURCE.to_string().to_lowercase(), field),
                message: format!("{} layout must bind this field", R::SOURCE),
            }
        })?;
        Ok(Self {
            projection,
            _record: PhantomData,
        })
    }

    pub fn extract(&self, sheet: &Sheet) -> Result<Vec<R>> {
        let rows = self
            .projection
            .read_sheet(sheet)
            .map_err(|e| ReconError::extraction(R::SOURCE, e.row, e.reason))?;

        let records = rows
            .into_iter()
            .map(|(row, cells)| {
                R::from_cells(cells).ok_or_else(|| {
                    ReconError::extraction(R::SOURCE, row, "projected cell count mismatch")
                })
            })
            .collect::<Result<Vec<R>>>()?;

        tracing::debug!("Extracted {} {} records", records.len(), R::SOURCE);
        Ok(records)
    }
}

pub type PrismExtractor = TimesheetExtractor<PrismRecord>;
pub type BeelineExtractor = TimesheetExtractor<BeelineRecord>;
