use crate::core::options::SheetLayout;
use crate::domain::sheet::{Cell, Row, Sheet};

/// Where and why a projection failed; callers turn this into the
/// error variant that fits their input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionError {
    pub row: usize,
    pub reason: String,
}

impl ProjectionError {
    fn new(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedColumn {
    field: &'static str,
    index: usize,
    header: Option<String>,
}

/// A layout narrowed to an ordered list of required fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    columns: Vec<ResolvedColumn>,
}

impl Projection {
    /// Fails with the first field `layout` does not bind.
    pub fn resolve(
        layout: &SheetLayout,
        fields: &[&'static str],
    ) -> std::result::Result<Self, &'static str> {
        let columns = fields
            .iter()
            .map(|&field| {
                layout
                    .get(field)
                    .map(|binding| ResolvedColumn {
                        field,
                        index: binding.index,
                        header: binding.header.clone(),
                    })
                    .ok_or(field)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { columns })
    }

    /// Checks the header row reaches every bound column and carries the
    /// expected labels.
    pub fn validate_header(&self, header: &Row) -> std::result::Result<(), ProjectionError> {
        for column in &self.columns {
            let cell = header.cell(column.index).ok_or_else(|| {
                ProjectionError::new(
                    header.index,
                    format!(
                        "header has {} columns but '{}' is bound to column {}",
                        header.width(),
                        column.field,
                        column.index
                    ),
                )
            })?;

            if let Some(expected) = &column.header {
                let found = cell.as_text().map(str::trim).unwrap_or("");
                if !found.eq_ignore_ascii_case(expected.trim()) {
                    return Err(ProjectionError::new(
                        header.index,
                        format!(
                            "expected header '{}' for '{}' at column {}, found '{}'",
                            expected, column.field, column.index, found
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Reads the projected cells of one row, in field order.
    pub fn read_row(&self, row: &Row) -> std::result::Result<Vec<String>, ProjectionError> {
        self.columns
            .iter()
            .map(|column| match row.cell(column.index) {
                Some(Cell::Text(value)) => Ok(value.clone()),
                Some(Cell::Blank) => Err(ProjectionError::new(
                    row.index,
                    format!("'{}' (column {}) is blank", column.field, column.index),
                )),
                Some(Cell::Invalid(_)) => Err(ProjectionError::new(
                    row.index,
                    format!(
                        "'{}' (column {}) is not valid UTF-8 text",
                        column.field, column.index
                    ),
                )),
                None => Err(ProjectionError::new(
                    row.index,
                    format!(
                        "'{}' (column {}) is out of range; row has {} cells",
                        column.field,
                        column.index,
                        row.width()
                    ),
                )),
            })
            .collect()
    }

    /// Validates the header, then projects every data row, stopping at the
    /// first failure.
    pub fn read_sheet(&self, sheet: &Sheet) -> std::result::Result<Vec<(usize, Vec<String>)>, ProjectionError> {
        let Some(header) = sheet.header() else {
            return Ok(Vec::new());
        };
        self.validate_header(header)?;

        sheet
            .data_rows()
            .map(|row| self.read_row(row).map(|cells| (row.index, cells)))
            .collect()
    }
}
