//! Native PDF backend built on `printpdf` (v0.8 ops-based API).
//!
//! Pages are accumulated as op buffers and assembled into the document on
//! [`RenderBackend::finish`]; the buffers are retained, so export can run more
//! than once and always yields the full document. Registered TTF/OTF fonts are
//! embedded; anything else falls back to the builtin Helvetica family, written
//! through WinAnsiEncoding.

use std::collections::HashMap;
use std::mem;

use printpdf::font::ParsedFont;
use printpdf::*;

use crate::backend::{Align, Color as SlateColor, RectStyle, RenderBackend, TextOptions};
use crate::error::SlateError;
use crate::fonts::{FontKey, FontManager, MM_TO_PT};
use crate::geometry::Orientation;

/// Backend that produces a PDF byte stream.
pub struct PdfBackend {
    doc: PdfDocument,
    /// Closed pages as `(width mm, height mm, ops)`, oldest first.
    pages: Vec<(f32, f32, Vec<Op>)>,
    /// Ops of the page currently being painted.
    ops: Vec<Op>,
    /// Current page size in mm (pages may change size per orientation).
    page_width: f32,
    page_height: f32,

    fonts: FontManager,
    font_ids: HashMap<FontKey, FontId>,
    current_font: FontKey,
    font_size: f32,

    text_color: SlateColor,
    draw_color: SlateColor,
    fill_color: SlateColor,
    line_width: f32,
    canvas_rotation: f32,
}

impl PdfBackend {
    /// Create a backend with its implicit first page.
    pub fn new(title: &str, page_width: f32, page_height: f32) -> Self {
        Self {
            doc: PdfDocument::new(title),
            pages: Vec::new(),
            ops: Vec::new(),
            page_width,
            page_height,
            fonts: FontManager::new(),
            font_ids: HashMap::new(),
            current_font: FontKey::new("Helvetica", ""),
            font_size: 10.0,
            text_color: SlateColor::BLACK,
            draw_color: SlateColor::BLACK,
            fill_color: SlateColor::BLACK,
            line_width: 0.2,
            canvas_rotation: 0.0,
        }
    }

    fn close_current_page(&mut self) {
        let ops = mem::take(&mut self.ops);
        self.pages.push((self.page_width, self.page_height, ops));
    }

    /// PDF origin is bottom-left, the engine's is top-left.
    fn pdf_y(&self, y_mm: f32) -> f32 {
        (self.page_height - y_mm) * MM_TO_PT
    }

    fn rgb(color: SlateColor) -> Color {
        Color::Rgb(Rgb {
            r: color.r as f32 / 255.0,
            g: color.g as f32 / 255.0,
            b: color.b as f32 / 255.0,
            icc_profile: None,
        })
    }

    fn rect_points(&self, x: f32, y: f32, w: f32, h: f32) -> [(f32, f32); 4] {
        let x1 = x * MM_TO_PT;
        let x2 = (x + w) * MM_TO_PT;
        let y_top = self.pdf_y(y);
        let y_bottom = self.pdf_y(y + h);
        [(x1, y_bottom), (x2, y_bottom), (x2, y_top), (x1, y_top)]
    }
}

impl RenderBackend for PdfBackend {
    fn add_page(
        &mut self,
        width: f32,
        height: f32,
        orientation: Orientation,
    ) -> Result<(), SlateError> {
        self.close_current_page();
        let (w, h) = match orientation {
            Orientation::Portrait => (width.min(height), width.max(height)),
            Orientation::Landscape => (width.max(height), width.min(height)),
        };
        self.page_width = w;
        self.page_height = h;
        Ok(())
    }

    fn register_font(
        &mut self,
        identifier: &str,
        family: &str,
        style: &str,
        data: Vec<u8>,
    ) -> Result<(), SlateError> {
        // Both parsers must accept the face before any state changes, so a
        // rejected font leaves measurement and painting untouched.
        let mut warnings = Vec::new();
        let parsed = ParsedFont::from_bytes(&data, 0, &mut warnings).ok_or_else(|| {
            SlateError::Font(format!("printpdf could not parse font '{identifier}'"))
        })?;
        self.fonts.register(family, style, data)?;

        let font_id = self.doc.add_font(&parsed);
        self.font_ids.insert(FontKey::new(family, style), font_id);
        Ok(())
    }

    fn set_font(&mut self, family: &str, style: &str, size: f32) -> Result<(), SlateError> {
        self.current_font = FontKey::new(family, style);
        self.font_size = size;
        Ok(())
    }

    fn text_width(&self, text: &str) -> f32 {
        self.fonts
            .text_width_mm(text, &self.current_font, self.font_size)
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        options: &TextOptions,
    ) -> Result<(), SlateError> {
        // Alignment is resolved here: the anchor moves left by the measured
        // width (or half of it) so the glyph run ends (or centers) at `x`.
        let width = self.text_width(text);
        let anchor_x = match options.align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };

        let angle = options.angle + self.canvas_rotation;
        let x_pt = Pt(anchor_x * MM_TO_PT);
        let y_pt = Pt(self.pdf_y(y));
        let matrix = if angle == 0.0 {
            TextMatrix::Translate(x_pt, y_pt)
        } else {
            TextMatrix::TranslateRotate(x_pt, y_pt, angle)
        };

        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetTextMatrix { matrix });
        self.ops.push(Op::SetFillColor {
            col: Self::rgb(self.text_color),
        });

        match self.font_ids.get(&self.current_font) {
            Some(font_id) => {
                self.ops.push(Op::SetFontSize {
                    size: Pt(self.font_size),
                    font: font_id.clone(),
                });
                self.ops.push(Op::WriteText {
                    items: vec![TextItem::Text(text.to_string())],
                    font: font_id.clone(),
                });
            }
            None => {
                let font = match (self.current_font.bold, self.current_font.italic) {
                    (true, true) => BuiltinFont::HelveticaBoldOblique,
                    (true, false) => BuiltinFont::HelveticaBold,
                    (false, true) => BuiltinFont::HelveticaOblique,
                    (false, false) => BuiltinFont::Helvetica,
                };
                self.ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(self.font_size),
                    font,
                });
                self.ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(to_winlatin(text))],
                    font,
                });
            }
        }
        self.ops.push(Op::EndTextSection);
        Ok(())
    }

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, style: RectStyle)
        -> Result<(), SlateError> {
        let pts = self.rect_points(x, y, w, h);
        match style {
            RectStyle::Fill => {
                self.ops.push(Op::SetFillColor {
                    col: Self::rgb(self.fill_color),
                });
                self.ops.push(Op::DrawPolygon {
                    polygon: Polygon {
                        rings: vec![PolygonRing {
                            points: pts
                                .iter()
                                .map(|&(px, py)| LinePoint {
                                    p: Point {
                                        x: Pt(px),
                                        y: Pt(py),
                                    },
                                    bezier: false,
                                })
                                .collect(),
                        }],
                        mode: PaintMode::Fill,
                        winding_order: WindingOrder::NonZero,
                    },
                });
            }
            RectStyle::Stroke => {
                self.ops.push(Op::SetOutlineColor {
                    col: Self::rgb(self.draw_color),
                });
                self.ops.push(Op::SetOutlineThickness {
                    pt: Pt(self.line_width * MM_TO_PT),
                });
                self.ops.push(Op::DrawLine {
                    line: Line {
                        points: pts
                            .iter()
                            .map(|&(px, py)| LinePoint {
                                p: Point {
                                    x: Pt(px),
                                    y: Pt(py),
                                },
                                bezier: false,
                            })
                            .collect(),
                        is_closed: true,
                    },
                });
            }
        }
        Ok(())
    }

    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Result<(), SlateError> {
        self.ops.push(Op::SetOutlineColor {
            col: Self::rgb(self.draw_color),
        });
        self.ops.push(Op::SetOutlineThickness {
            pt: Pt(self.line_width * MM_TO_PT),
        });
        self.ops.push(Op::DrawLine {
            line: Line {
                points: vec![
                    LinePoint {
                        p: Point {
                            x: Pt(x0 * MM_TO_PT),
                            y: Pt(self.pdf_y(y0)),
                        },
                        bezier: false,
                    },
                    LinePoint {
                        p: Point {
                            x: Pt(x1 * MM_TO_PT),
                            y: Pt(self.pdf_y(y1)),
                        },
                        bezier: false,
                    },
                ],
                is_closed: false,
            },
        });
        Ok(())
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn set_text_color(&mut self, color: SlateColor) {
        self.text_color = color;
    }

    fn set_draw_color(&mut self, color: SlateColor) {
        self.draw_color = color;
    }

    fn set_fill_color(&mut self, color: SlateColor) {
        self.fill_color = color;
    }

    fn draw_image(
        &mut self,
        bytes: &[u8],
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rotation: f32,
    ) -> Result<(), SlateError> {
        // Pixel dimensions via the image crate, PDF embedding via printpdf.
        let dyn_img = ::image::load_from_memory(bytes)
            .map_err(|e| SlateError::Image(format!("decode error: {e}")))?;
        let (px_width, px_height) = (dyn_img.width(), dyn_img.height());

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let raw = RawImage::decode_from_bytes(bytes, &mut warnings)
            .map_err(|e| SlateError::Image(format!("PDF encode error: {e}")))?;
        let xobj_id = self.doc.add_image(&raw);

        if rotation != 0.0 {
            log::debug!("image rotation {rotation}° requested; native backend paints unrotated");
        }

        // At dpi=72 printpdf renders 1 px = 1 pt, so scale = desired_pt / px.
        let scale_x = if px_width > 0 {
            w * MM_TO_PT / px_width as f32
        } else {
            1.0
        };
        let scale_y = if px_height > 0 {
            h * MM_TO_PT / px_height as f32
        } else {
            1.0
        };

        self.ops.push(Op::UseXobject {
            id: xobj_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x * MM_TO_PT)),
                translate_y: Some(Pt(self.pdf_y(y + h))),
                dpi: Some(72.0),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                rotate: None,
            },
        });
        Ok(())
    }

    fn rotate_canvas(&mut self, angle: f32) {
        // No physical canvas rotation in the ops API; the angle is folded into
        // subsequent text matrices instead. `rotate_canvas(0.0)` resets.
        self.canvas_rotation = angle;
    }

    fn finish(&mut self) -> Result<Vec<u8>, SlateError> {
        // Assemble from the retained buffers; the page in progress stays open
        // so further exports see the same document.
        let mut pages: Vec<PdfPage> = self
            .pages
            .iter()
            .map(|(w, h, ops)| PdfPage::new(Mm(*w), Mm(*h), ops.clone()))
            .collect();
        pages.push(PdfPage::new(
            Mm(self.page_width),
            Mm(self.page_height),
            self.ops.clone(),
        ));
        self.doc.pages = pages;
        let mut warnings = Vec::new();
        let bytes = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        Ok(bytes)
    }
}

/// Re-encode for the builtin-font path, which writes one WinAnsiEncoding byte
/// per glyph. Characters that Windows-1252 places in its 0x80-0x9F window get
/// that byte; other Latin-1 characters map to their own code point; everything
/// else degrades to '?'.
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro sign
            '\u{201A}' => 0x82, // single low-9 quotation mark
            '\u{201E}' => 0x84, // double low-9 quotation mark
            '\u{2026}' => 0x85, // horizontal ellipsis
            '\u{2018}' => 0x91, // left single quotation mark
            '\u{2019}' => 0x92, // right single quotation mark
            '\u{201C}' => 0x93, // left double quotation mark
            '\u{201D}' => 0x94, // right double quotation mark
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en dash
            '\u{2014}' => 0x97, // em dash
            '\u{2122}' => 0x99, // trade mark sign
            '\u{00A0}' => 0x20, // no-break space, plain space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: the 0x80-0x9F bytes make this non-UTF-8 on purpose. printpdf
    // copies String contents into the content stream byte-for-byte, and the
    // PDF viewer interprets them under WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}
