#![allow(dead_code)]

use image::{DynamicImage, ImageOutputFormat, RgbImage};
use inspection_form::model::HeaderFields;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A cell to place in a fixture workbook: 1-based row, 1-based column, text.
pub type FixtureCell<'a> = (u32, u16, &'a str);

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a single-sheet workbook and return its path.
    pub fn workbook(&self, name: &str, sheet: Option<&str>, cells: &[FixtureCell]) -> PathBuf {
        let path = self.path(name);
        write_workbook(&path, sheet, cells);
        path
    }
}

pub fn workbook_bytes(sheet: Option<&str>, cells: &[FixtureCell]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(worksheet_with(sheet, cells));
    workbook.save_to_buffer().expect("save fixture")
}

pub fn write_workbook(path: &Path, sheet: Option<&str>, cells: &[FixtureCell]) {
    std::fs::write(path, workbook_bytes(sheet, cells)).expect("write fixture");
}

fn worksheet_with(sheet: Option<&str>, cells: &[FixtureCell]) -> Worksheet {
    let mut worksheet = Worksheet::new();
    if let Some(name) = sheet {
        worksheet.set_name(name).expect("sheet name");
    }
    for (row, col, text) in cells {
        worksheet
            .write_string(row - 1, col - 1, *text)
            .expect("write fixture cell");
    }
    worksheet
}

/// The three-row manual used throughout the examples.
pub fn sample_manual_cells() -> Vec<FixtureCell<'static>> {
    vec![
        (1, 1, "入荷検査マニュアル"),
        (11, 1, "外観"),
        (11, 4, "傷がないこと"),
        (12, 1, "作成部署"),
        (12, 4, "品質保証部"),
        (13, 1, "寸法"),
        (13, 4, "規格内であること"),
    ]
}

pub fn header() -> HeaderFields {
    HeaderFields {
        operator: "山田太郎".to_string(),
        reviewer: "佐藤花子".to_string(),
        inspection_id: "20240501_093000".to_string(),
        in_no: "IN001".to_string(),
        lot_no: "LOT001".to_string(),
        inspection_date: "2024-05-01".to_string(),
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png).expect("encode png");
    out.into_inner()
}
