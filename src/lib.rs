/*!
# Incoming Inspection Form

Checklist-driven incoming inspection, built in Rust.

## Overview

An inspector works through the inspection items listed in a manual workbook,
marks each one pass or fail, optionally attaches a photo, then generates a
spreadsheet report and optionally mails it to the selected recipients.

## Architecture

Two components run one after the other for every session:

### ItemExtractor
- Scans rows 11–45 of the manual's first worksheet
- Column A holds the category, column D the description
- Boilerplate rows (author, department, revision date, approval) are dropped
  by keyword
- An unreadable manual yields no items and a diagnostic, never an error

### ReportWriter
- **Fresh** strategy: new workbook with a header block and one row per answer
- **Template** strategy: copy of the manual with its checkboxes ticked and an
  optional photo sheet appended
- Failures produce no document at all

### Collaborators
- Inspector roster with normalized e-mail addresses
- Persisted recipient selection
- SMTP dispatch with credentials taken from the environment

## Modules

- **model**: Items, verdicts, photos, header fields and report documents
- **sheet_reader**: Typed row access on top of calamine
- **extractor**: Row classification and checklist extraction
- **roster**: Inspector list loading
- **session**: Per-session answers and photos
- **report**: Fresh and template report generation, photo resizing
- **photos**: Photo persistence
- **config**: Application and recipient configuration
- **mailer**: Report e-mail dispatch
- **text**: Normalization and cell-address helpers
- **error**: Error types
*/

pub mod config;
pub mod error;
pub mod extractor;
pub mod mailer;
pub mod model;
pub mod photos;
pub mod report;
pub mod roster;
pub mod session;
pub mod sheet_reader;
pub mod text;

/// Re-export the types most callers need
pub use config::{AppConfig, RecipientConfig};
pub use error::{ConfigError, ExtractError, MailError, ReportError, SessionError};
pub use extractor::{ExtractionRules, Extraction, ItemExtractor, extract_items};
pub use model::*;
pub use report::{ReportInput, ReportStrategy, ReportWriter, TemplateLayout};
pub use roster::{Inspector, Roster};
pub use session::{InspectionSession, SessionSummary};
