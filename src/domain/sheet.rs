/// A single cell as handed over by a tabular reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Blank,
    /// Raw bytes that are not valid UTF-8.
    Invalid(Vec<u8>),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            Cell::Blank | Cell::Invalid(_) => None,
        }
    }

    /// Decodes a raw field; undecodable bytes are kept rather than rejected
    /// so only columns that are actually read can fail.
    pub fn from_bytes(value: &[u8]) -> Self {
        match std::str::from_utf8(value) {
            Ok(text) => Cell::from(text),
            Err(_) => Cell::Invalid(value.to_vec()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Blank
        } else {
            Cell::Text(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Zero-based position in the sheet; row 0 is the header.
    pub index: usize,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(index: usize, cells: Vec<Cell>) -> Self {
        Self { index, cells }
    }

    /// `None` when the row is shorter than `column`.
    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn width(&self) -> usize {
        self.cells.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Builds a sheet from plain strings; empty strings become blank cells.
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, cells)| {
                Row::new(
                    index,
                    cells.into_iter().map(|c| Cell::from(c.as_ref())).collect(),
                )
            })
            .collect();
        Self { rows }
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn data_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().skip(1)
    }

    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}
