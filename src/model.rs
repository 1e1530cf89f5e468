use serde::{Deserialize, Serialize};

/// One checklist row extracted from the manual.
///
/// The identifier is derived from the absolute source row so that Strategy B
/// can write results back onto the same row of the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionItem {
    /// Stable identifier, `item_<row>`
    pub id: String,

    /// Category label from column A
    pub category: String,

    /// Description text from column D
    pub description: String,

    /// Absolute 1-based row in the first worksheet
    pub row: u32,
}

impl InspectionItem {
    pub fn new(row: u32, category: &str, description: &str) -> Self {
        InspectionItem {
            id: item_id_for_row(row),
            category: category.trim().to_string(),
            description: description.trim().to_string(),
            row,
        }
    }
}

pub fn item_id_for_row(row: u32) -> String {
    format!("item_{}", row)
}

/// Pass/fail decision captured for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub pass: bool,
    pub category: String,
    pub description: String,
}

impl Verdict {
    pub fn for_item(item: &InspectionItem, pass: bool) -> Self {
        Verdict {
            pass,
            category: item.category.clone(),
            description: item.description.clone(),
        }
    }

    /// Label used in the fresh report's verdict column.
    pub fn report_label(&self) -> &'static str {
        if self.pass { PASS_LABEL } else { FAIL_LABEL }
    }

    /// Short label shown while the user is filling in the form.
    pub fn form_label(&self) -> &'static str {
        if self.pass { FORM_PASS_LABEL } else { FORM_FAIL_LABEL }
    }
}

pub const PASS_LABEL: &str = "合格";
pub const FAIL_LABEL: &str = "不合格";
pub const FORM_PASS_LABEL: &str = "可";
pub const FORM_FAIL_LABEL: &str = "否";

/// An uploaded photo kept in memory for the duration of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl PhotoAttachment {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        PhotoAttachment {
            bytes,
            filename: filename.into(),
        }
    }

    /// Extension of the original filename including the dot, or an empty
    /// string when there is none.
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default()
    }
}

/// Header block written at the top of every report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFields {
    pub operator: String,
    pub reviewer: String,
    pub inspection_id: String,
    pub in_no: String,
    pub lot_no: String,
    pub inspection_date: String,
}

impl HeaderFields {
    /// Header with an inspection id and date taken from the local clock.
    pub fn with_defaults(operator: &str, reviewer: &str) -> Self {
        let now = chrono::Local::now();
        HeaderFields {
            operator: operator.to_string(),
            reviewer: reviewer.to_string(),
            inspection_id: now.format("%Y%m%d_%H%M%S").to_string(),
            in_no: String::new(),
            lot_no: String::new(),
            inspection_date: now.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn has_signatories(&self) -> bool {
        !self.operator.trim().is_empty() && !self.reviewer.trim().is_empty()
    }
}

/// A generated workbook ready for download or mail.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
}

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

impl ReportDocument {
    pub fn mime_type(&self) -> &'static str {
        XLSX_MIME
    }
}
