use super::ReportInput;
use crate::error::ReportError;
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};

pub const RESULT_SHEET: &str = "検査結果";
pub const TITLE: &str = "入荷検査結果";

/// Row (0-based) of the column-header line; answers start on the next row.
pub const TABLE_HEADER_ROW: u32 = 9;
pub const TABLE_HEADERS: [&str; 4] = ["No.", "カテゴリ", "検査項目", "判定"];

/// Build a new workbook with a header block and one row per answered item.
///
/// Items without a verdict are left out; the No. column counts the rows
/// actually written.
pub fn build_fresh_report(input: &ReportInput) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(RESULT_SHEET)?;

    let title_format = Format::new().set_bold().set_font_size(14.0);
    worksheet.write_string_with_format(0, 0, TITLE, &title_format)?;

    let header = input.header;
    let pairs = [
        ("検査ID", header.inspection_id.as_str()),
        ("IN.NO", header.in_no.as_str()),
        ("ロットNO", header.lot_no.as_str()),
        ("作業者", header.operator.as_str()),
        ("確認者", header.reviewer.as_str()),
        ("検査日", header.inspection_date.as_str()),
    ];
    for (offset, (label, value)) in pairs.iter().enumerate() {
        let row = 2 + offset as u32;
        worksheet.write_string(row, 0, *label)?;
        worksheet.write_string(row, 1, *value)?;
    }

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD3D3D3));
    for (col, title) in TABLE_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(TABLE_HEADER_ROW, col as u16, *title, &header_format)?;
    }

    let mut row = TABLE_HEADER_ROW + 1;
    for (idx, (_, verdict)) in input.answered().enumerate() {
        worksheet.write_number(row, 0, (idx + 1) as f64)?;
        worksheet.write_string(row, 1, &verdict.category)?;
        worksheet.write_string(row, 2, &verdict.description)?;
        worksheet.write_string(row, 3, verdict.report_label())?;
        row += 1;
    }

    worksheet.set_column_width(0, 6.0)?;
    worksheet.set_column_width(1, 14.0)?;
    worksheet.set_column_width(2, 50.0)?;
    worksheet.set_column_width(3, 10.0)?;

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;

    log::info!("fresh report built with {} answered items", row - TABLE_HEADER_ROW - 1);
    Ok(buffer)
}
