use crate::error::SessionError;
use crate::model::{InspectionItem, PhotoAttachment, Verdict};
use crate::text::truncate_chars;
use std::collections::HashMap;

/// State owned by one user session: the checklist, the answers so far and
/// any uploaded photos.
///
/// Every session gets its own value; nothing here is shared between
/// sessions.
#[derive(Debug, Clone, Default)]
pub struct InspectionSession {
    items: Vec<InspectionItem>,
    verdicts: HashMap<String, Verdict>,
    photos: HashMap<String, PhotoAttachment>,
}

/// Counts shown on the confirmation screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub answered: usize,
    pub passed: usize,
    pub failed: usize,
    pub photos: usize,
}

/// One line of the result preview table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    pub no: usize,
    pub category: String,
    pub description: String,
    pub label: &'static str,
    pub has_photo: bool,
}

const PREVIEW_DESCRIPTION_CHARS: usize = 50;

impl InspectionSession {
    pub fn new(items: Vec<InspectionItem>) -> Self {
        InspectionSession {
            items,
            verdicts: HashMap::new(),
            photos: HashMap::new(),
        }
    }

    pub fn items(&self) -> &[InspectionItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&InspectionItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn verdicts(&self) -> &HashMap<String, Verdict> {
        &self.verdicts
    }

    pub fn photos(&self) -> &HashMap<String, PhotoAttachment> {
        &self.photos
    }

    /// Record a pass/fail answer. A later answer for the same item replaces
    /// the earlier one.
    pub fn record_verdict(&mut self, id: &str, pass: bool) -> Result<(), SessionError> {
        let item = self
            .item(id)
            .ok_or_else(|| SessionError::UnknownItem(id.to_string()))?;
        let verdict = Verdict::for_item(item, pass);
        self.verdicts.insert(id.to_string(), verdict);
        Ok(())
    }

    pub fn verdict(&self, id: &str) -> Option<&Verdict> {
        self.verdicts.get(id)
    }

    /// Attach a photo to an item, replacing any earlier one.
    pub fn attach_photo(&mut self, id: &str, photo: PhotoAttachment) -> Result<(), SessionError> {
        if self.item(id).is_none() {
            return Err(SessionError::UnknownItem(id.to_string()));
        }
        if photo.bytes.is_empty() {
            return Err(SessionError::EmptyPhoto(id.to_string()));
        }
        self.photos.insert(id.to_string(), photo);
        Ok(())
    }

    pub fn remove_photo(&mut self, id: &str) -> Option<PhotoAttachment> {
        self.photos.remove(id)
    }

    pub fn has_answers(&self) -> bool {
        !self.verdicts.is_empty()
    }

    pub fn summary(&self) -> SessionSummary {
        let passed = self.verdicts.values().filter(|v| v.pass).count();
        SessionSummary {
            answered: self.verdicts.len(),
            passed,
            failed: self.verdicts.len() - passed,
            photos: self.photos.len(),
        }
    }

    /// Answered items in checklist order, numbered from 1.
    pub fn preview(&self) -> Vec<PreviewRow> {
        self.items
            .iter()
            .filter_map(|item| self.verdicts.get(&item.id).map(|v| (item, v)))
            .enumerate()
            .map(|(idx, (item, verdict))| PreviewRow {
                no: idx + 1,
                category: verdict.category.clone(),
                description: truncate_chars(&verdict.description, PREVIEW_DESCRIPTION_CHARS),
                label: verdict.form_label(),
                has_photo: self.photos.contains_key(&item.id),
            })
            .collect()
    }
}
