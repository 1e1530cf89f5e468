use crate::error::ExtractError;
use crate::sheet_reader::{RowReader, SheetRows};
use crate::text::normalize_email;
use std::path::Path;

pub const ROSTER_SHEET: &str = "検査者一覧";
pub const NAME_HEADER: &str = "氏名";
pub const EMAIL_HEADER: &str = "メールアドレス";

/// A person who can act as operator or reviewer and receive reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspector {
    pub name: String,
    pub email: String,
}

/// Inspector list loaded from the roster workbook.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub inspectors: Vec<Inspector>,
}

impl Roster {
    /// Read the `検査者一覧` sheet. The header row is the first row with a
    /// `氏名` cell and must also name the `メールアドレス` column; rows
    /// below it without a name are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let sheet = SheetRows::named_sheet(path, ROSTER_SHEET)?;
        Self::from_rows(&sheet, sheet.last_row(), sheet.last_col())
    }

    pub fn from_rows(
        reader: &dyn RowReader,
        last_row: u32,
        last_col: u16,
    ) -> Result<Self, ExtractError> {
        let is_header = |row: u32, col: u16, header: &str| {
            reader.cell_text(row, col).as_deref().map(str::trim) == Some(header)
        };
        let header_row = (1..=last_row)
            .find(|&row| (1..=last_col).any(|col| is_header(row, col, NAME_HEADER)))
            .ok_or_else(|| ExtractError::MissingColumn(NAME_HEADER.to_string()))?;
        let find_col = |header: &str| {
            (1..=last_col)
                .find(|&col| is_header(header_row, col, header))
                .ok_or_else(|| ExtractError::MissingColumn(header.to_string()))
        };
        let name_col = find_col(NAME_HEADER)?;
        let email_col = find_col(EMAIL_HEADER)?;

        let inspectors = (header_row + 1..=last_row)
            .filter_map(|row| {
                let name = reader.cell_text(row, name_col)?.trim().to_string();
                let email = reader
                    .cell_text(row, email_col)
                    .map(|e| normalize_email(&e))
                    .unwrap_or_default();
                Some(Inspector { name, email })
            })
            .collect();

        Ok(Roster { inspectors })
    }

    pub fn names(&self) -> Vec<&str> {
        self.inspectors.iter().map(|i| i.name.as_str()).collect()
    }

    /// Addresses of every inspector that has one.
    pub fn emails(&self) -> Vec<&str> {
        self.inspectors
            .iter()
            .map(|i| i.email.as_str())
            .filter(|e| !e.is_empty())
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<&Inspector> {
        self.inspectors.iter().find(|i| i.name == name.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.inspectors.is_empty()
    }
}

/// Load the roster, degrading to an empty list with a diagnostic.
pub fn load_roster(path: impl AsRef<Path>) -> (Roster, Option<String>) {
    match Roster::load(path) {
        Ok(roster) => (roster, None),
        Err(e) => {
            let diagnostic = format!("マスター読込エラー: {}", e);
            log::warn!("{}", diagnostic);
            (Roster::default(), Some(diagnostic))
        }
    }
}
