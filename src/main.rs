//! slate – demo document generator for the pdf-slate engine.
//!
//! Usage:
//!   slate [output.pdf] [--landscape] [--commands] [--title "My Report"]
//!
//! Builds a sample report (header/footer callbacks, wrapped text, a bordered
//! table with automatic page breaks) and writes the exported artifact. With
//! `--commands` the draw-command backend is used and the output is the JSON
//! stream a browser painter would replay.

use std::{env, path::PathBuf, process, rc::Rc};

use pdf_slate::{
    Align, BackendKind, CellOptions, Color, Document, DocumentConfig, MultiCellOptions,
    Orientation, PageGeometry,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut output_path: Option<PathBuf> = None;
    let mut landscape = false;
    let mut commands = false;
    let mut title: Option<String> = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--landscape" | "-l" => landscape = true,
            "--commands" | "-c" => commands = true,
            "--title" | "-t" => title = iter.next().cloned(),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => output_path = Some(PathBuf::from(path)),
        }
    }

    let output = output_path.unwrap_or_else(|| {
        PathBuf::from(if commands { "sample.json" } else { "sample.pdf" })
    });

    let config = DocumentConfig {
        title: title.unwrap_or_else(|| "pdf-slate sample".to_string()),
        geometry: PageGeometry {
            header_height: 14.0,
            footer_height: 10.0,
            orientation: if landscape {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            },
            ..PageGeometry::default()
        },
    };
    let orientation = config.geometry.orientation;
    let content_width = config.geometry.effective_width()
        - config.geometry.margin_left
        - config.geometry.margin_right;

    let header: pdf_slate::PageCallback = Rc::new(move |e: &mut pdf_slate::LayoutEngine| {
        e.set_font("Helvetica", "B", 14.0)?;
        e.cell(
            content_width,
            8.0,
            "Quarterly Report",
            CellOptions {
                ln: true,
                ..CellOptions::default()
            },
        )?;
        let y = e.get_y();
        e.line(e.get_x(), y, e.get_x() + content_width, y)
    });
    let footer: pdf_slate::PageCallback = Rc::new(move |e: &mut pdf_slate::LayoutEngine| {
        e.set_font("Helvetica", "I", 9.0)?;
        e.set_text_color(Color::gray(120));
        e.cell(
            content_width,
            8.0,
            &format!("Page {}", e.page_no()),
            CellOptions {
                align: Align::Right,
                ..CellOptions::default()
            },
        )
    });

    let kind = if commands {
        BackendKind::CommandStream
    } else {
        BackendKind::Native
    };

    let result = Document::with_backend(config, kind, Some(header), Some(footer))
        .and_then(|mut doc| {
            doc.set_font("Helvetica", "", 11.0)?;
            doc.add_page(orientation, false, false)?;

            doc.multi_cell(
                content_width,
                6.0,
                "This sample exercises the cursor engine: greedy word wrapping, \
                 automatic page breaks, header and footer callbacks with state \
                 save-restore, and a bordered table below.",
                MultiCellOptions::default(),
            )?;
            doc.spacer(6.0)?;

            // Table header row
            doc.set_font("Helvetica", "B", 11.0)?;
            doc.set_fill_color(Color::gray(230));
            let row_opts = CellOptions {
                border: true,
                ..CellOptions::default()
            };
            doc.cell(content_width * 0.6, 8.0, "Item", CellOptions { fill: true, ..row_opts })?;
            doc.cell(
                content_width * 0.4,
                8.0,
                "Amount",
                CellOptions {
                    fill: true,
                    ln: true,
                    align: Align::Right,
                    ..row_opts
                },
            )?;

            // Enough rows to force a few automatic page breaks.
            doc.set_font("Helvetica", "", 11.0)?;
            for i in 1..=90 {
                doc.cell(content_width * 0.6, 7.0, &format!("Line item {i}"), row_opts)?;
                doc.cell(
                    content_width * 0.4,
                    7.0,
                    &format!("{:.2}", i as f32 * 12.5),
                    CellOptions {
                        ln: true,
                        align: Align::Right,
                        ..row_opts
                    },
                )?;
            }

            let pages = doc.page_no();
            doc.save(&output)?;
            for err in doc.take_callback_errors() {
                eprintln!("warning: {err}");
            }
            Ok(pages)
        });

    match result {
        Ok(pages) => {
            eprintln!(
                "Wrote '{}' ({} page{})",
                output.display(),
                pages,
                if pages == 1 { "" } else { "s" }
            );
        }
        Err(e) => {
            eprintln!("Error generating document: {e}");
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("slate – sample document generator (pdf-slate)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} [output] [--landscape] [--commands] [--title \"My Report\"]");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --title, -t      Document title (default: \"pdf-slate sample\")");
    eprintln!("  --landscape, -l  Landscape page orientation");
    eprintln!("  --commands, -c   Export the JSON draw-command stream instead of a PDF");
    eprintln!("  --help           Print this message");
}
