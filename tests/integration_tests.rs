//! Integration tests for the pdf-slate engine.
//!
//! These tests validate:
//! - Page-break prediction and automatic page allocation
//! - Header/footer accounting and state save-restore through the facade
//! - Word wrapping and overlong-word truncation
//! - Aspect-ratio-preserving image placement
//! - Export artifacts of both backends

use std::cell::RefCell;
use std::rc::Rc;

use pdf_slate::{
    Align, BackendKind, CellOptions, Color, CommandBackend, Document, DocumentConfig,
    DrawCommand, MultiCellOptions, Orientation, PageCallback, PageGeometry, SlateError,
};

// =====================================================================
// Helpers
// =====================================================================

fn command_doc(geometry: PageGeometry) -> Document {
    let config = DocumentConfig {
        geometry,
        ..DocumentConfig::default()
    };
    Document::with_backend(config, BackendKind::CommandStream, None, None).unwrap()
}

fn decode(doc: &mut Document) -> Vec<DrawCommand> {
    CommandBackend::decode(&doc.to_bytes().unwrap()).unwrap()
}

fn painted_texts(commands: &[DrawCommand]) -> Vec<String> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(w, h));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

// =====================================================================
// Page-break prediction
// =====================================================================

#[test]
fn page_break_predicate_scenario() {
    // 210x297 mm, 10 mm margins, footer_height 0, cursor at y=290:
    // 290 + 10 + 10 = 310 >= 297.
    let mut doc = command_doc(PageGeometry::default());
    doc.set_y(290.0);
    assert!(doc.will_page_break(10.0));
}

#[test]
fn footer_band_shrinks_the_printable_area() {
    let mut doc = command_doc(PageGeometry {
        footer_height: 20.0,
        ..PageGeometry::default()
    });
    doc.set_y(260.0);
    // 260 + 10 + 10 + 20 = 300 >= 297
    assert!(doc.will_page_break(10.0));
    doc.set_y(250.0);
    assert!(!doc.will_page_break(6.0));
}

#[test]
fn auto_break_allocates_during_cell_runs() {
    let mut doc = command_doc(PageGeometry::default());
    doc.set_font("Helvetica", "", 10.0).unwrap();
    doc.add_page(Orientation::Portrait, false, false).unwrap();
    for _ in 0..80 {
        doc.cell(
            60.0,
            8.0,
            "row",
            CellOptions {
                ln: true,
                ..CellOptions::default()
            },
        )
        .unwrap();
    }
    // 80 rows x 8 mm into a 277 mm writable band needs at least 3 pages.
    assert!(doc.page_no() >= 3, "got {} pages", doc.page_no());
}

// =====================================================================
// Header / footer accounting
// =====================================================================

#[test]
fn n_add_page_calls_run_n_callbacks_and_allocate_n_minus_one_pages() {
    let headers = Rc::new(RefCell::new(0usize));
    let footers = Rc::new(RefCell::new(0usize));
    let h = headers.clone();
    let f = footers.clone();
    let header: PageCallback = Rc::new(move |_| {
        *h.borrow_mut() += 1;
        Ok(())
    });
    let footer: PageCallback = Rc::new(move |_| {
        *f.borrow_mut() += 1;
        Ok(())
    });

    let config = DocumentConfig::default();
    let mut doc =
        Document::with_backend(config, BackendKind::CommandStream, Some(header), Some(footer))
            .unwrap();
    for _ in 0..5 {
        doc.add_page(Orientation::Portrait, false, false).unwrap();
    }

    assert_eq!(doc.page_no(), 5);
    assert_eq!(*headers.borrow(), 5);
    assert_eq!(*footers.borrow(), 5);
    let allocations = decode(&mut doc)
        .iter()
        .filter(|c| matches!(c, DrawCommand::AddPage { .. }))
        .count();
    assert_eq!(allocations, 4);
}

#[test]
fn header_styling_is_restored_for_body_text() {
    let header: PageCallback = Rc::new(|e| {
        e.set_font("Helvetica", "B", 18.0)?;
        e.set_text_color(Color::rgb(200, 0, 0));
        e.cell(100.0, 8.0, "HEADER", CellOptions::default())
    });
    let config = DocumentConfig::default();
    let mut doc =
        Document::with_backend(config, BackendKind::CommandStream, Some(header), None).unwrap();
    doc.set_font("Helvetica", "", 10.0).unwrap();
    doc.set_text_color(Color::BLACK);
    doc.add_page(Orientation::Portrait, false, false).unwrap();

    let commands = decode(&mut doc);
    // The last SetFont/SetTextColor before body drawing must match the body
    // state, not the header's.
    let last_font = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::SetFont { size, .. } => Some(*size),
            _ => None,
        })
        .last()
        .unwrap();
    let last_color = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::SetTextColor { color } => Some(*color),
            _ => None,
        })
        .last()
        .unwrap();
    assert_eq!(last_font, 10.0);
    assert_eq!(last_color, Color::BLACK);
}

#[test]
fn failing_footer_is_reported_after_export() {
    let footer: PageCallback = Rc::new(|_| Err(SlateError::Backend("footer broke".into())));
    let config = DocumentConfig::default();
    let mut doc =
        Document::with_backend(config, BackendKind::CommandStream, None, Some(footer)).unwrap();
    doc.set_font("Helvetica", "", 10.0).unwrap();
    doc.add_page(Orientation::Portrait, false, false).unwrap();
    doc.cell(50.0, 8.0, "body still renders", CellOptions::default())
        .unwrap();

    let commands = decode(&mut doc);
    assert!(painted_texts(&commands)
        .iter()
        .any(|t| t == "body still renders"));

    let errors = doc.take_callback_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("footer broke"));
}

// =====================================================================
// Word wrapping
// =====================================================================

#[test]
fn multi_cell_emits_multiple_cells_for_an_overlong_word() {
    let mut doc = command_doc(PageGeometry::default());
    doc.set_font("Helvetica", "", 10.0).unwrap();
    doc.multi_cell(
        50.0,
        6.0,
        "alpha beta gammaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        MultiCellOptions::default(),
    )
    .unwrap();

    let texts = painted_texts(&decode(&mut doc));
    let fragments: Vec<String> = texts
        .iter()
        .map(|t| t.trim_end().to_string())
        .filter(|t| t.starts_with("gamma") || (!t.is_empty() && t.chars().all(|c| c == 'a')))
        .collect();
    assert!(
        fragments.len() >= 2,
        "single overlong word should span cells: {texts:?}"
    );
    assert_eq!(
        fragments.concat(),
        "gammaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
    );
}

#[test]
fn multi_cell_rewrap_is_deterministic() {
    let text = "The quick brown fox jumps over the lazy dog again and again and again";
    let wrap = || {
        let mut doc = command_doc(PageGeometry::default());
        doc.set_font("Helvetica", "", 10.0).unwrap();
        doc.multi_cell(60.0, 6.0, text, MultiCellOptions::default())
            .unwrap();
        painted_texts(&decode(&mut doc))
    };
    assert_eq!(wrap(), wrap());
}

#[test]
fn multi_cell_honors_explicit_line_breaks() {
    let mut doc = command_doc(PageGeometry::default());
    doc.set_font("Helvetica", "", 10.0).unwrap();
    doc.multi_cell(120.0, 6.0, "first\nsecond", MultiCellOptions::default())
        .unwrap();
    let texts = painted_texts(&decode(&mut doc));
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0].trim_end(), "first");
    assert_eq!(texts[1].trim_end(), "second");
}

#[test]
fn right_aligned_cells_carry_the_trailing_space() {
    let mut doc = command_doc(PageGeometry::default());
    doc.set_font("Helvetica", "", 10.0).unwrap();
    doc.cell(
        40.0,
        8.0,
        "42.00",
        CellOptions {
            align: Align::Right,
            ..CellOptions::default()
        },
    )
    .unwrap();
    let texts = painted_texts(&decode(&mut doc));
    assert_eq!(texts[0], "42.00 ");
}

// =====================================================================
// Image placement
// =====================================================================

#[test]
fn wide_image_scenario_halves_the_height() {
    // 800x400 (ar 2.0) into a 100x100 box: height becomes 50, width stays.
    let mut doc = command_doc(PageGeometry::default());
    doc.add_image(&png_bytes(800, 400), 10.0, 10.0, 100.0, 100.0, true)
        .unwrap();
    let commands = decode(&mut doc);
    match &commands[0] {
        DrawCommand::Image { w, h, .. } => {
            assert_eq!(*w, 100.0);
            assert_eq!(*h, 50.0);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

// =====================================================================
// Export artifacts
// =====================================================================

#[test]
fn native_backend_produces_a_pdf() {
    let header: PageCallback = Rc::new(|e| {
        e.set_font("Helvetica", "B", 13.0)?;
        e.cell(100.0, 8.0, "Report", CellOptions::default())
    });
    let config = DocumentConfig::default();
    let mut doc =
        Document::with_backend(config, BackendKind::Native, Some(header), None).unwrap();
    doc.set_font("Helvetica", "", 11.0).unwrap();
    doc.add_page(Orientation::Portrait, false, false).unwrap();
    doc.multi_cell(
        180.0,
        6.0,
        "Some body text that wraps across a couple of lines to make sure the \
         native renderer paints more than a single op.",
        MultiCellOptions::default(),
    )
    .unwrap();
    doc.line(10.0, 60.0, 200.0, 60.0).unwrap();
    doc.add_image(&png_bytes(64, 64), 10.0, 70.0, 40.0, 40.0, true)
        .unwrap();

    let bytes = doc.to_bytes().unwrap();
    assert_valid_pdf(&bytes);
    assert!(doc.take_callback_errors().is_empty());
}

#[test]
fn export_is_repeatable_on_both_backends() {
    // save-then-to_bytes (or any later re-export) must see the full document.
    let build = |kind| {
        let mut doc =
            Document::with_backend(DocumentConfig::default(), kind, None, None).unwrap();
        doc.set_font("Helvetica", "", 10.0).unwrap();
        doc.add_page(Orientation::Portrait, false, false).unwrap();
        doc.cell(60.0, 8.0, "still here", CellOptions::default())
            .unwrap();
        doc
    };

    let mut native = build(BackendKind::Native);
    let first = native.to_bytes().unwrap();
    let second = native.to_bytes().unwrap();
    assert_valid_pdf(&second);
    assert_eq!(
        first.len(),
        second.len(),
        "second export lost content: {} -> {} bytes",
        first.len(),
        second.len()
    );

    let mut stream = build(BackendKind::CommandStream);
    let first = stream.to_bytes().unwrap();
    let second = stream.to_bytes().unwrap();
    assert_eq!(first, second);
    assert!(painted_texts(&CommandBackend::decode(&second).unwrap())
        .iter()
        .any(|t| t == "still here"));
}

#[test]
fn command_stream_is_byte_deterministic() {
    let build = || {
        let mut doc = command_doc(PageGeometry::default());
        doc.set_font("Helvetica", "", 10.0).unwrap();
        doc.add_page(Orientation::Portrait, false, false).unwrap();
        doc.cell(60.0, 8.0, "deterministic", CellOptions::default())
            .unwrap();
        doc.to_bytes().unwrap()
    };
    assert_eq!(build(), build());
}

#[test]
fn landscape_documents_swap_the_page_box() {
    let mut doc = command_doc(PageGeometry {
        orientation: Orientation::Landscape,
        ..PageGeometry::default()
    });
    doc.add_page(Orientation::Landscape, true, true).unwrap();
    doc.add_page(Orientation::Landscape, true, true).unwrap();
    let commands = decode(&mut doc);
    match &commands[0] {
        DrawCommand::AddPage { width, height, .. } => {
            assert_eq!(*width, 297.0);
            assert_eq!(*height, 210.0);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn bad_font_bytes_abort_construction_paths() {
    let mut doc = command_doc(PageGeometry::default());
    let result = doc.add_font("broken.ttf", "Broken", "", vec![0u8; 32]);
    assert!(matches!(result, Err(SlateError::Font(_))));
}
