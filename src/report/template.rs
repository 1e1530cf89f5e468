use super::ReportInput;
use super::photo::{ResizedPhoto, resize_photo, row_height_points};
use crate::error::ReportError;
use crate::model::HeaderFields;
use crate::text::{parse_cell_address, truncate_chars};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use umya_spreadsheet::structs::Image;
use umya_spreadsheet::structs::drawing::spreadsheet::MarkerType;
use umya_spreadsheet::{Spreadsheet, Worksheet};

/// Where the manual template keeps its header fields and checkboxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    pub operator_cell: Option<String>,
    pub reviewer_cell: Option<String>,
    pub inspection_id_cell: Option<String>,
    pub in_no_cell: Option<String>,
    pub lot_no_cell: Option<String>,
    pub inspection_date_cell: Option<String>,

    /// First and last column scanned for checkbox markers (U..Y)
    pub marker_first_col: u16,
    pub marker_last_col: u16,

    pub unchecked_glyph: String,
    pub checked_glyph: String,
    pub pass_label: String,
    pub fail_label: String,

    /// Name of the appended photo sheet. When the manual already has a
    /// sheet by that name, `_2`, `_3`, ... is appended.
    pub photo_sheet: String,
    pub photo_width_px: u32,
    pub photo_row_floor_pt: f64,
    pub photo_description_chars: usize,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            operator_cell: Some("R7".to_string()),
            reviewer_cell: Some("V7".to_string()),
            inspection_id_cell: None,
            in_no_cell: Some("D7".to_string()),
            lot_no_cell: Some("L7".to_string()),
            inspection_date_cell: Some("V3".to_string()),
            marker_first_col: 21,
            marker_last_col: 25,
            unchecked_glyph: "□".to_string(),
            checked_glyph: "■".to_string(),
            pass_label: "可".to_string(),
            fail_label: "否".to_string(),
            photo_sheet: "検査写真".to_string(),
            photo_width_px: 240,
            photo_row_floor_pt: 30.0,
            photo_description_chars: 40,
        }
    }
}

impl TemplateLayout {
    fn header_cells<'h>(&self, header: &'h HeaderFields) -> Vec<(&str, &'h str)> {
        [
            (&self.operator_cell, header.operator.as_str()),
            (&self.reviewer_cell, header.reviewer.as_str()),
            (&self.inspection_id_cell, header.inspection_id.as_str()),
            (&self.in_no_cell, header.in_no.as_str()),
            (&self.lot_no_cell, header.lot_no.as_str()),
            (&self.inspection_date_cell, header.inspection_date.as_str()),
        ]
        .into_iter()
        .filter_map(|(cell, value)| cell.as_deref().map(|c| (c, value)))
        .collect()
    }

    pub fn label_for(&self, pass: bool) -> &str {
        if pass { &self.pass_label } else { &self.fail_label }
    }
}

pub const PHOTO_SHEET_TITLE: &str = "検査写真一覧";
pub const PHOTO_HEADERS: [&str; 4] = ["No.", "カテゴリ", "検査項目", "写真"];
pub const NO_PHOTOS: &str = "写真なし";
const PHOTO_HEADER_ROW: u32 = 3;

/// Tick the checkbox marker for `label` inside `text`.
///
/// A marker is the unchecked glyph followed, after optional half- or
/// full-width spaces, by the label. Returns the rewritten text, or `None`
/// when the text holds no such marker.
pub fn check_marker(text: &str, unchecked: &str, checked: &str, label: &str) -> Option<String> {
    if unchecked.is_empty() || label.is_empty() {
        return None;
    }
    for (pos, _) in text.match_indices(unchecked) {
        let rest = text[pos + unchecked.len()..].trim_start_matches([' ', '\u{3000}']);
        if rest.starts_with(label) {
            let mut out = String::with_capacity(text.len() + checked.len());
            out.push_str(&text[..pos]);
            out.push_str(checked);
            out.push_str(&text[pos + unchecked.len()..]);
            return Some(out);
        }
    }
    None
}

/// Fill in a fresh copy of the manual: header cells, ticked checkboxes and,
/// when photos were uploaded, an extra sheet with the resized photos.
pub fn build_template_report(
    template: &Path,
    layout: &TemplateLayout,
    input: &ReportInput,
) -> Result<Vec<u8>, ReportError> {
    let mut book =
        umya_spreadsheet::reader::xlsx::read(template).map_err(|e| ReportError::Template {
            path: template.to_path_buf(),
            reason: e.to_string(),
        })?;

    {
        let sheet = book.get_sheet_mut(&0).ok_or(ReportError::EmptyTemplate)?;
        write_header_cells(sheet, layout, input.header)?;
        tick_markers(sheet, layout, input);
    }

    if !input.photos.is_empty() {
        let name = unused_sheet_name(&book, &layout.photo_sheet);
        let photo_sheet = book
            .new_sheet(name.as_str())
            .map_err(|e| ReportError::TemplateWrite(e.to_string()))?;
        write_photo_sheet(photo_sheet, layout, input);
    }

    let mut out = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut out)
        .map_err(|e| ReportError::TemplateWrite(e.to_string()))?;
    Ok(out.into_inner())
}

fn unused_sheet_name(book: &Spreadsheet, base: &str) -> String {
    if book.get_sheet_by_name(base).is_none() {
        return base.to_string();
    }
    let name = (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|name| book.get_sheet_by_name(name).is_none())
        .unwrap_or_else(|| base.to_string());
    log::info!("sheet '{}' already exists, photos go to '{}'", base, name);
    name
}

fn write_header_cells(
    sheet: &mut Worksheet,
    layout: &TemplateLayout,
    header: &HeaderFields,
) -> Result<(), ReportError> {
    for (address, value) in layout.header_cells(header) {
        let (row, col) =
            parse_cell_address(address).ok_or_else(|| ReportError::CellAddress(address.to_string()))?;
        sheet
            .get_cell_mut((col as u32, row))
            .set_value_string(value);
    }
    Ok(())
}

fn tick_markers(sheet: &mut Worksheet, layout: &TemplateLayout, input: &ReportInput) {
    for (item, verdict) in input.answered() {
        let label = layout.label_for(verdict.pass);
        let ticked = (layout.marker_first_col..=layout.marker_last_col).find_map(|col| {
            let coordinate = (col as u32, item.row);
            let text = sheet.get_cell(coordinate)?.get_value().to_string();
            let rewritten =
                check_marker(&text, &layout.unchecked_glyph, &layout.checked_glyph, label)?;
            Some((coordinate, rewritten))
        });

        match ticked {
            Some((coordinate, rewritten)) => {
                sheet.get_cell_mut(coordinate).set_value_string(rewritten);
            }
            None => log::warn!(
                "no '{}{}' marker on row {} for {}",
                layout.unchecked_glyph,
                label,
                item.row,
                item.id
            ),
        }
    }
}

fn write_photo_sheet(sheet: &mut Worksheet, layout: &TemplateLayout, input: &ReportInput) {
    let title = sheet.get_cell_mut("A1");
    title.set_value_string(PHOTO_SHEET_TITLE);
    title.get_style_mut().get_font_mut().set_bold(true).set_size(14.0);

    for (idx, text) in PHOTO_HEADERS.iter().enumerate() {
        let cell = sheet.get_cell_mut((idx as u32 + 1, PHOTO_HEADER_ROW));
        cell.set_value_string(*text);
        let style = cell.get_style_mut();
        style.get_font_mut().set_bold(true);
        style.set_background_color("FFD3D3D3");
    }

    sheet.get_column_dimension_mut("A").set_width(6.0);
    sheet.get_column_dimension_mut("B").set_width(14.0);
    sheet.get_column_dimension_mut("C").set_width(40.0);
    sheet
        .get_column_dimension_mut("D")
        .set_width(layout.photo_width_px as f64 / 7.0 + 2.0);

    let mut row = PHOTO_HEADER_ROW + 1;
    let mut embedded = 0;
    let with_photos = input
        .items
        .iter()
        .filter_map(|item| input.photos.get(&item.id).map(|photo| (item, photo)));

    for (idx, (item, photo)) in with_photos.enumerate() {
        sheet
            .get_cell_mut((1, row))
            .set_value_number((idx + 1) as f64);
        sheet
            .get_cell_mut((2, row))
            .set_value_string(item.category.as_str());
        sheet
            .get_cell_mut((3, row))
            .set_value_string(truncate_chars(&item.description, layout.photo_description_chars));

        match resize_photo(&photo.bytes, layout.photo_width_px) {
            Ok(resized) => {
                let height = row_height_points(resized.height, layout.photo_row_floor_pt);
                embedded += 1;
                embed_png(sheet, &format!("D{}", row), &format!("{}.png", item.id), embedded, resized);
                sheet
                    .get_row_dimension_mut(&row)
                    .set_height(height)
                    .set_custom_height(true);
            }
            Err(e) => {
                log::warn!("photo for {} ({}) could not be decoded: {}", item.id, photo.filename, e);
                sheet
                    .get_cell_mut((4, row))
                    .set_value_string(format!("画像読込エラー: {}", e));
            }
        }
        row += 1;
    }

    if row == PHOTO_HEADER_ROW + 1 {
        sheet
            .get_cell_mut(format!("A{}", row).as_str())
            .set_value_string(NO_PHOTOS);
    }

    log::info!(
        "photo sheet '{}' written with {} rows, {} images",
        sheet.get_name(),
        row - PHOTO_HEADER_ROW - 1,
        embedded
    );
}

// Drawing object ids must be unique within the sheet; Excel repairs the
// file otherwise.
fn embed_png(
    sheet: &mut Worksheet,
    coordinate: &str,
    name: &str,
    picture_id: u32,
    resized: ResizedPhoto,
) {
    let mut marker = MarkerType::default();
    marker.set_coordinate(coordinate);

    let mut image = Image::default();
    image.new_image_with_dimensions(resized.height, resized.width, name, resized.png, marker);
    if let Some(picture) = image
        .get_one_cell_anchor_mut()
        .and_then(|anchor| anchor.get_picture_mut())
    {
        picture
            .get_non_visual_picture_properties_mut()
            .get_non_visual_drawing_properties_mut()
            .set_id(picture_id);
    }
    sheet.add_image(image);
}
