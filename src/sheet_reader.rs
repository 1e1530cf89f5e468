use crate::error::ExtractError;
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use std::io::Cursor;
use std::path::Path;

/// Typed access to the text of a worksheet.
///
/// Rows and columns are 1-based, the way they are addressed in the manual.
/// Empty and whitespace-only cells read as `None`.
pub trait RowReader {
    /// Text of a single cell.
    fn cell_text(&self, row: u32, col: u16) -> Option<String>;

    /// Text of every non-empty cell in a row, left to right.
    fn row_texts(&self, row: u32) -> Vec<String>;
}

/// A worksheet loaded into memory with calamine.
pub struct SheetRows {
    name: String,
    range: Range<Data>,
}

impl SheetRows {
    /// Load the first worksheet of an xlsx file.
    pub fn first_sheet(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: calamine::XlsxError| {
            ExtractError::Open {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        Self::from_reader_first(&mut workbook)
    }

    /// Load a named worksheet of an xlsx file.
    pub fn named_sheet(path: impl AsRef<Path>, sheet: &str) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: calamine::XlsxError| {
            ExtractError::Open {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(ExtractError::MissingSheet(sheet.to_string()));
        }
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| ExtractError::Sheet(e.to_string()))?;
        Ok(SheetRows {
            name: sheet.to_string(),
            range,
        })
    }

    /// Load the first worksheet from xlsx bytes already in memory.
    pub fn first_sheet_from_bytes(bytes: &[u8]) -> Result<Self, ExtractError> {
        let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec())).map_err(|e| {
            ExtractError::Open {
                path: "<memory>".into(),
                reason: e.to_string(),
            }
        })?;
        Self::from_reader_first(&mut workbook)
    }

    fn from_reader_first<RS>(workbook: &mut Xlsx<RS>) -> Result<Self, ExtractError>
    where
        RS: std::io::Read + std::io::Seek,
    {
        let name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ExtractError::NoWorksheet)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ExtractError::NoWorksheet)?
            .map_err(|e| ExtractError::Sheet(e.to_string()))?;
        Ok(SheetRows { name, range })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last used 1-based row, or 0 for an empty sheet.
    pub fn last_row(&self) -> u32 {
        self.range.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    /// Last used 1-based column, or 0 for an empty sheet.
    pub fn last_col(&self) -> u16 {
        self.range.end().map(|(_, col)| col as u16 + 1).unwrap_or(0)
    }
}

impl RowReader for SheetRows {
    fn cell_text(&self, row: u32, col: u16) -> Option<String> {
        if row == 0 || col == 0 {
            return None;
        }
        self.range
            .get_value((row - 1, col as u32 - 1))
            .and_then(data_text)
    }

    fn row_texts(&self, row: u32) -> Vec<String> {
        (1..=self.last_col())
            .filter_map(|col| self.cell_text(row, col))
            .collect()
    }
}

// Integral floats print without the trailing ".0" the way Excel shows them.
fn data_text(data: &Data) -> Option<String> {
    let text = match data {
        Data::Empty => return None,
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Error(_) => return None,
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
