mod common;

use calamine::{Reader, Xlsx};
use common::{Fixture, FixtureCell, header, png};
use inspection_form::error::ReportError;
use inspection_form::extractor::{ExtractionRules, extract_items};
use inspection_form::model::PhotoAttachment;
use inspection_form::report::template::{NO_PHOTOS, PHOTO_SHEET_TITLE};
use inspection_form::report::{ReportInput, ReportStrategy, ReportWriter, TemplateLayout};
use inspection_form::session::InspectionSession;
use inspection_form::sheet_reader::{RowReader, SheetRows};
use std::io::Cursor;
use std::path::Path;

const U: u16 = 21;
const V: u16 = 22;
const X: u16 = 24;

fn template_cells() -> Vec<FixtureCell<'static>> {
    let mut cells = common::sample_manual_cells();
    cells.extend([
        (7, 18, "作業者名"),
        (11, U, "□可"),
        (11, V, "□否"),
        (13, U, "□ 可"),
        (13, V, "□ 否"),
        (14, 1, "梱包"),
        (14, 4, "破損がないこと"),
        (14, U, "□可"),
        (14, V, "□否"),
        (15, 1, "表示"),
        (15, 4, "ラベルが正しいこと"),
        (15, X, "□可　□否"),
    ]);
    cells
}

fn session_for(manual: &Path) -> InspectionSession {
    let extraction = extract_items(manual, &ExtractionRules::default());
    InspectionSession::new(extraction.items)
}

fn sheet_names(bytes: &[u8]) -> Vec<String> {
    let workbook = Xlsx::new(Cursor::new(bytes.to_vec())).expect("open report");
    workbook.sheet_names()
}

fn photo_sheet(bytes: &[u8], name: &str) -> calamine::Range<calamine::Data> {
    let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec())).expect("open report");
    workbook.worksheet_range(name).expect("photo sheet")
}

fn text_at(range: &calamine::Range<calamine::Data>, row: u32, col: u32) -> String {
    range
        .get_value((row - 1, col - 1))
        .map(|d| d.to_string())
        .unwrap_or_default()
}

#[test]
fn test_template_ticks_only_answered_markers() {
    let fixture = Fixture::new();
    let manual = fixture.workbook("manual.xlsx", Some("マニュアル"), &template_cells());

    let mut session = session_for(&manual);
    assert_eq!(session.items().len(), 4);
    session.record_verdict("item_11", true).unwrap();
    session.record_verdict("item_13", false).unwrap();
    session.record_verdict("item_15", false).unwrap();
    let header = header();

    let report = ReportWriter::new(ReportStrategy::Template, &manual)
        .generate(&ReportInput::from_session(&session, &header))
        .expect("template report");

    let sheet = SheetRows::first_sheet_from_bytes(&report.bytes).unwrap();
    assert_eq!(sheet.cell_text(11, U).as_deref(), Some("■可"));
    assert_eq!(sheet.cell_text(11, V).as_deref(), Some("□否"));
    assert_eq!(sheet.cell_text(13, U).as_deref(), Some("□ 可"));
    assert_eq!(sheet.cell_text(13, V).as_deref(), Some("■ 否"));
    assert_eq!(sheet.cell_text(15, X).as_deref(), Some("□可　■否"));
    println!("✓ answered rows ticked");

    assert_eq!(sheet.cell_text(14, U).as_deref(), Some("□可"));
    assert_eq!(sheet.cell_text(14, V).as_deref(), Some("□否"));
    println!("✓ unanswered row untouched");

    assert_eq!(sheet.cell_text(7, 18).as_deref(), Some("山田太郎"));
    assert_eq!(sheet.cell_text(7, 22).as_deref(), Some("佐藤花子"));
    assert_eq!(sheet.cell_text(7, 4).as_deref(), Some("IN001"));
    assert_eq!(sheet.cell_text(7, 12).as_deref(), Some("LOT001"));
    assert_eq!(sheet.cell_text(3, 22).as_deref(), Some("2024-05-01"));
    assert_eq!(sheet.cell_text(12, 1).as_deref(), Some("作成部署"));

    assert_eq!(sheet_names(&report.bytes), vec!["マニュアル".to_string()]);
}

#[test]
fn test_template_photo_sheet() {
    let fixture = Fixture::new();
    let manual = fixture.workbook("manual.xlsx", None, &template_cells());
    let mut session = session_for(&manual);
    session.record_verdict("item_11", true).unwrap();
    session
        .attach_photo("item_14", PhotoAttachment::new(png(480, 360), "box.png"))
        .unwrap();
    session
        .attach_photo("item_11", PhotoAttachment::new(png(100, 50), "scratch.png"))
        .unwrap();
    session
        .attach_photo("item_13", PhotoAttachment::new(b"broken".to_vec(), "broken.jpg"))
        .unwrap();
    let header = header();

    let layout = TemplateLayout {
        photo_description_chars: 3,
        ..TemplateLayout::default()
    };
    let report = ReportWriter::new(ReportStrategy::Template, &manual)
        .with_layout(layout.clone())
        .generate(&ReportInput::from_session(&session, &header))
        .expect("template report with photos");

    let names = sheet_names(&report.bytes);
    assert_eq!(names.len(), 2);
    assert_eq!(names[1], layout.photo_sheet);

    let range = photo_sheet(&report.bytes, &layout.photo_sheet);
    assert_eq!(text_at(&range, 1, 1), PHOTO_SHEET_TITLE);
    assert_eq!(text_at(&range, 3, 4), "写真");

    // checklist order: item_11, item_13, item_14
    assert_eq!(text_at(&range, 4, 1), "1");
    assert_eq!(text_at(&range, 4, 2), "外観");
    assert_eq!(text_at(&range, 4, 3), "傷がな…");
    assert_eq!(text_at(&range, 4, 4), "");
    assert_eq!(text_at(&range, 5, 2), "寸法");
    assert!(text_at(&range, 5, 4).starts_with("画像読込エラー"));
    assert_eq!(text_at(&range, 6, 1), "3");
    assert_eq!(text_at(&range, 6, 2), "梱包");
    println!("✓ broken photo recorded inline, others embedded");
}

#[test]
fn test_template_photos_embedded_with_row_heights() {
    let fixture = Fixture::new();
    let manual = fixture.workbook("manual.xlsx", None, &template_cells());
    let mut session = session_for(&manual);
    session
        .attach_photo("item_11", PhotoAttachment::new(png(480, 360), "wide.png"))
        .unwrap();
    session
        .attach_photo("item_13", PhotoAttachment::new(png(100, 10), "strip.png"))
        .unwrap();
    session
        .attach_photo("item_14", PhotoAttachment::new(b"broken".to_vec(), "broken.jpg"))
        .unwrap();
    let header = header();

    let layout = TemplateLayout::default();
    let report = ReportWriter::new(ReportStrategy::Template, &manual)
        .generate(&ReportInput::from_session(&session, &header))
        .unwrap();

    let book = umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(report.bytes.clone()), true)
        .expect("read report");
    let sheet = book.get_sheet_by_name(&layout.photo_sheet).expect("photo sheet");

    let images = sheet.get_image_collection();
    assert_eq!(images.len(), 2);
    let placed: Vec<(String, String)> = images
        .iter()
        .map(|image| (image.get_coordinate(), image.get_image_name().to_string()))
        .collect();
    assert_eq!(
        placed,
        vec![
            ("D4".to_string(), "item_11.png".to_string()),
            ("D5".to_string(), "item_13.png".to_string()),
        ]
    );
    println!("✓ one picture per decodable photo");

    let anchor = images[0].get_one_cell_anchor().expect("one-cell anchor");
    assert_eq!(*anchor.get_extent().get_cx(), 240 * 9525);
    assert_eq!(*anchor.get_extent().get_cy(), 180 * 9525);

    let ids: Vec<u32> = images
        .iter()
        .filter_map(|image| image.get_one_cell_anchor()?.get_picture())
        .map(|picture| {
            *picture
                .get_non_visual_picture_properties()
                .get_non_visual_drawing_properties()
                .get_id()
        })
        .collect();
    assert_eq!(ids, vec![1, 2]);
    println!("✓ picture ids are distinct");

    let tall = sheet.get_row_dimension(&4).expect("row 4");
    assert_eq!(*tall.get_height(), 135.0);
    assert!(*tall.get_custom_height());
    let short = sheet.get_row_dimension(&5).expect("row 5");
    assert_eq!(*short.get_height(), layout.photo_row_floor_pt);
    assert!(*short.get_custom_height());
    assert!(
        sheet
            .get_row_dimension(&6)
            .is_none_or(|row| !*row.get_custom_height())
    );
    println!("✓ row heights follow the images with a floor");
}

#[test]
fn test_template_photo_sheet_name_taken() {
    let fixture = Fixture::new();
    let layout = TemplateLayout::default();
    let manual = fixture.workbook("manual.xlsx", Some(layout.photo_sheet.as_str()), &template_cells());
    let mut session = session_for(&manual);
    session
        .attach_photo("item_11", PhotoAttachment::new(png(40, 30), "a.png"))
        .unwrap();
    let header = header();

    let report = ReportWriter::new(ReportStrategy::Template, &manual)
        .generate(&ReportInput::from_session(&session, &header))
        .expect("report despite clashing sheet name");

    let suffixed = format!("{}_2", layout.photo_sheet);
    assert_eq!(sheet_names(&report.bytes), vec![layout.photo_sheet.clone(), suffixed.clone()]);
    let range = photo_sheet(&report.bytes, &suffixed);
    assert_eq!(text_at(&range, 1, 1), PHOTO_SHEET_TITLE);
    assert_eq!(text_at(&range, 4, 2), "外観");
}

#[test]
fn test_template_photo_placeholder() {
    let fixture = Fixture::new();
    let manual = fixture.workbook("manual.xlsx", None, &template_cells());
    let session = session_for(&manual);
    let header = header();

    let items = session.items().to_vec();
    let verdicts = session.verdicts().clone();
    let mut photos = std::collections::HashMap::new();
    photos.insert(
        "item_99".to_string(),
        PhotoAttachment::new(png(10, 10), "stray.png"),
    );
    let input = ReportInput {
        items: &items,
        verdicts: &verdicts,
        photos: &photos,
        header: &header,
    };

    let layout = TemplateLayout::default();
    let report = ReportWriter::new(ReportStrategy::Template, &manual)
        .generate(&input)
        .unwrap();
    let range = photo_sheet(&report.bytes, &layout.photo_sheet);
    assert_eq!(text_at(&range, 4, 1), NO_PHOTOS);
}

#[test]
fn test_template_missing_manual_is_an_error() {
    let fixture = Fixture::new();
    let session = InspectionSession::new(vec![]);
    let header = header();

    let result = ReportWriter::new(ReportStrategy::Template, fixture.path("missing.xlsx"))
        .generate(&ReportInput::from_session(&session, &header));
    assert!(matches!(result, Err(ReportError::Template { .. })));
}

#[test]
fn test_bad_header_address_is_an_error() {
    let fixture = Fixture::new();
    let manual = fixture.workbook("manual.xlsx", None, &template_cells());
    let session = session_for(&manual);
    let header = header();

    let layout = TemplateLayout {
        lot_no_cell: Some("not-a-cell".to_string()),
        ..TemplateLayout::default()
    };
    let result = ReportWriter::new(ReportStrategy::Template, &manual)
        .with_layout(layout)
        .generate(&ReportInput::from_session(&session, &header));
    assert!(matches!(result, Err(ReportError::CellAddress(_))));
}
