//! Report generation.
//!
//! Two layouts are supported and picked through [`ReportStrategy`]:
//! a freshly built result sheet, or the manual itself with its checkboxes
//! ticked and an optional photo sheet appended.

pub mod fresh;
pub mod photo;
pub mod template;

use crate::error::ReportError;
use crate::model::{HeaderFields, InspectionItem, PhotoAttachment, ReportDocument, Verdict};
use crate::session::InspectionSession;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use fresh::build_fresh_report;
pub use template::{TemplateLayout, build_template_report, check_marker};

/// Which report layout to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStrategy {
    /// Build a new workbook with a header block and result table
    #[default]
    Fresh,

    /// Edit a copy of the manual in place
    Template,
}

impl FromStr for ReportStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fresh" | "a" => Ok(ReportStrategy::Fresh),
            "template" | "b" => Ok(ReportStrategy::Template),
            other => Err(format!("unknown report strategy: {}", other)),
        }
    }
}

impl fmt::Display for ReportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStrategy::Fresh => write!(f, "fresh"),
            ReportStrategy::Template => write!(f, "template"),
        }
    }
}

/// Everything a report is built from.
pub struct ReportInput<'a> {
    pub items: &'a [InspectionItem],
    pub verdicts: &'a HashMap<String, Verdict>,
    pub photos: &'a HashMap<String, PhotoAttachment>,
    pub header: &'a HeaderFields,
}

impl<'a> ReportInput<'a> {
    pub fn from_session(session: &'a InspectionSession, header: &'a HeaderFields) -> Self {
        ReportInput {
            items: session.items(),
            verdicts: session.verdicts(),
            photos: session.photos(),
            header,
        }
    }

    /// Items that have a verdict, in checklist order. Verdicts whose id is
    /// not in the checklist are never yielded.
    pub fn answered(&self) -> impl Iterator<Item = (&'a InspectionItem, &'a Verdict)> + use<'a> {
        let verdicts = self.verdicts;
        self.items
            .iter()
            .filter_map(move |item| verdicts.get(&item.id).map(|v| (item, v)))
    }
}

/// Deterministic report file name for a generation time.
pub fn report_filename(at: DateTime<Local>) -> String {
    format!("検査結果_{}.xlsx", at.format("%Y%m%d_%H%M%S"))
}

/// Produces report documents with the configured strategy.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    pub strategy: ReportStrategy,

    /// Manual used as the template for [`ReportStrategy::Template`]
    pub template_path: PathBuf,

    pub layout: TemplateLayout,
}

impl ReportWriter {
    pub fn new(strategy: ReportStrategy, template_path: impl Into<PathBuf>) -> Self {
        ReportWriter {
            strategy,
            template_path: template_path.into(),
            layout: TemplateLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: TemplateLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Build the report. On error there is no document at all.
    pub fn generate(&self, input: &ReportInput) -> Result<ReportDocument, ReportError> {
        self.generate_at(input, Local::now())
    }

    pub fn generate_at(
        &self,
        input: &ReportInput,
        at: DateTime<Local>,
    ) -> Result<ReportDocument, ReportError> {
        if !input.header.has_signatories() {
            return Err(ReportError::MissingOperator);
        }

        let result = match self.strategy {
            ReportStrategy::Fresh => build_fresh_report(input),
            ReportStrategy::Template => build_template_report(&self.template_path, &self.layout, input),
        };

        match result {
            Ok(bytes) => {
                let filename = report_filename(at);
                log::info!("{} report {} generated ({} bytes)", self.strategy, filename, bytes.len());
                Ok(ReportDocument { bytes, filename })
            }
            Err(e) => {
                log::error!("Excel 作成エラー: {}", e);
                Err(e)
            }
        }
    }
}
