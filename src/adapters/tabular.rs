use crate::domain::ports::TabularReader;
use crate::domain::sheet::{Cell, Row, Sheet};
use crate::utils::error::Result;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Delimited-text reader for CSV and TSV exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvReader {
    delimiter: u8,
}

impl CsvReader {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn csv() -> Self {
        Self::new(b',')
    }

    pub fn tsv() -> Self {
        Self::new(b'\t')
    }

    /// `.tsv` files are tab separated; everything else is read as CSV.
    pub fn for_path(path: &str) -> Self {
        match Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("tsv") => Self::tsv(),
            _ => Self::csv(),
        }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::csv()
    }
}

impl TabularReader for CsvReader {
    fn open(&self, bytes: &[u8]) -> Result<Sheet> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut rows: Vec<Row> = Vec::new();
        for (ordinal, record) in reader.byte_records().enumerate() {
            let record = record?;
            // Physical line, so skipped blank lines keep later row numbers aligned.
            let index = record
                .position()
                .map(|position| position.line().saturating_sub(1) as usize)
                .unwrap_or(ordinal);
            let first = rows.is_empty();
            let cells = record
                .iter()
                .enumerate()
                .map(|(column, value)| {
                    if first && column == 0 {
                        Cell::from_bytes(value.strip_prefix(UTF8_BOM).unwrap_or(value))
                    } else {
                        Cell::from_bytes(value)
                    }
                })
                .collect();
            rows.push(Row::new(index, cells));
        }

        tracing::debug!("Read {} rows (delimiter {:?})", rows.len(), self.delimiter as char);
        Ok(Sheet::new(rows))
    }
}
