use crate::model::InspectionItem;
use crate::sheet_reader::{RowReader, SheetRows};
use crate::text::normalize_row_text;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Row-classification rules for the manual's first worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    /// First row of the scan window (1-based, inclusive)
    pub first_row: u32,

    /// Last row of the scan window (inclusive)
    pub last_row: u32,

    /// Column holding the category label (1-based, A = 1)
    pub category_col: u16,

    /// Column holding the item description (D = 4)
    pub description_col: u16,

    /// Rows inside the window known to hold non-item content
    pub excluded_rows: Vec<u32>,

    /// A row is dropped when its normalized text contains any of these
    pub exclusion_keywords: Vec<String>,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            first_row: 11,
            last_row: 45,
            category_col: 1,
            description_col: 4,
            excluded_rows: vec![30, 31],
            exclusion_keywords: ["作成部署", "作成者", "改訂日", "承認"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// Why a row in the scan window did not become an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDecision {
    Item(InspectionItem),
    ExcludedRow,
    Keyword(String),
    Blank,
    NoDescription,
}

/// Outcome of reading a manual. `diagnostic` is set when the workbook could
/// not be read at all, in which case `items` is empty.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub items: Vec<InspectionItem>,
    pub diagnostic: Option<String>,
}

pub struct ItemExtractor<'a> {
    rules: &'a ExtractionRules,
}

impl<'a> ItemExtractor<'a> {
    pub fn new(rules: &'a ExtractionRules) -> Self {
        ItemExtractor { rules }
    }

    /// Decide what a single row of the window is.
    pub fn classify(&self, reader: &dyn RowReader, row: u32) -> RowDecision {
        if self.rules.excluded_rows.contains(&row) {
            return RowDecision::ExcludedRow;
        }

        let row_text = normalize_row_text(&reader.row_texts(row).concat());
        if let Some(keyword) = self
            .rules
            .exclusion_keywords
            .iter()
            .find(|k| !k.is_empty() && row_text.contains(k.as_str()))
        {
            return RowDecision::Keyword(keyword.clone());
        }

        let category = reader.cell_text(row, self.rules.category_col);
        let description = reader.cell_text(row, self.rules.description_col);
        let description = match (category.as_deref(), description.as_deref()) {
            (None, None) => return RowDecision::Blank,
            (_, None) => return RowDecision::NoDescription,
            (_, Some(d)) if d.trim().is_empty() => return RowDecision::NoDescription,
            (_, Some(d)) => d,
        };

        RowDecision::Item(InspectionItem::new(
            row,
            category.as_deref().unwrap_or(""),
            description,
        ))
    }

    /// Scan the window and return the items in row order.
    pub fn extract(&self, reader: &dyn RowReader) -> Vec<InspectionItem> {
        let mut items = Vec::new();
        for row in self.rules.first_row..=self.rules.last_row {
            match self.classify(reader, row) {
                RowDecision::Item(item) => items.push(item),
                RowDecision::Keyword(keyword) => {
                    log::debug!("row {} skipped: contains '{}'", row, keyword);
                }
                other => log::trace!("row {} skipped: {:?}", row, other),
            }
        }
        items
    }
}

/// Read the checklist from a manual on disk.
///
/// Never fails: an unreadable workbook produces no items and a diagnostic.
///
/// # Examples
/// ```no_run
/// use inspection_form::extractor::{ExtractionRules, extract_items};
///
/// let extraction = extract_items("manual.xlsx", &ExtractionRules::default());
/// match extraction.diagnostic {
///     Some(msg) => eprintln!("{}", msg),
///     None => println!("{} items", extraction.items.len()),
/// }
/// ```
pub fn extract_items(path: impl AsRef<Path>, rules: &ExtractionRules) -> Extraction {
    match SheetRows::first_sheet(path.as_ref()) {
        Ok(sheet) => extract_from_sheet(&sheet, rules),
        Err(e) => failed_extraction(e),
    }
}

/// Same as [`extract_items`] for a workbook already in memory.
pub fn extract_items_from_bytes(bytes: &[u8], rules: &ExtractionRules) -> Extraction {
    match SheetRows::first_sheet_from_bytes(bytes) {
        Ok(sheet) => extract_from_sheet(&sheet, rules),
        Err(e) => failed_extraction(e),
    }
}

fn extract_from_sheet(sheet: &SheetRows, rules: &ExtractionRules) -> Extraction {
    let items = ItemExtractor::new(rules).extract(sheet);
    log::info!("{} inspection items read from '{}'", items.len(), sheet.name());
    Extraction {
        items,
        diagnostic: None,
    }
}

fn failed_extraction(e: crate::error::ExtractError) -> Extraction {
    let diagnostic = format!("マニュアル読込エラー: {}", e);
    log::warn!("{}", diagnostic);
    Extraction {
        items: Vec::new(),
        diagnostic: Some(diagnostic),
    }
}
