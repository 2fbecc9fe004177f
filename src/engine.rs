//! The cursor/pagination engine.
//!
//! Owns the page counter, the cursor and the font/color state, and drives the
//! page lifecycle: page allocation, header/footer invocation with state
//! save-restore, and the auto page-break decision. All painting goes through
//! the [`RenderBackend`] trait; the engine never sees a concrete backend type.
//!
//! Page numbering is normalized here: the engine's counter is the only source
//! of truth, regardless of whether the backend numbers its pages from 0 or 1.

use std::rc::Rc;

use crate::backend::{Color, RenderBackend};
use crate::error::{CallbackError, CallbackKind, SlateError};
use crate::geometry::{Cursor, Orientation, PageGeometry};

/// Header/footer callback. Failures are collected, not propagated; a broken
/// header must not lose already-drawn body content.
pub type PageCallback = Rc<dyn Fn(&mut LayoutEngine) -> Result<(), SlateError>>;

/// The active font as a `(name, style, size)` snapshot, cached so callbacks
/// can be bracketed with save/restore.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub name: String,
    pub style: String,
    pub size: f32,
}

pub struct LayoutEngine {
    pub(crate) backend: Box<dyn RenderBackend>,
    pub(crate) geometry: PageGeometry,
    /// Effective page box after the initial orientation, fixed for the
    /// document lifetime.
    pub(crate) page_width: f32,
    pub(crate) page_height: f32,
    pub(crate) cursor: Cursor,
    pub(crate) orientation: Orientation,

    pub(crate) auto_page_break: bool,
    first_page: bool,
    page_number: usize,

    pub(crate) current_font: Option<FontSpec>,
    current_text_color: Option<Color>,

    header: Option<PageCallback>,
    footer: Option<PageCallback>,
    callback_errors: Vec<CallbackError>,
}

impl LayoutEngine {
    pub fn new(
        backend: Box<dyn RenderBackend>,
        geometry: PageGeometry,
        header: Option<PageCallback>,
        footer: Option<PageCallback>,
    ) -> Result<Self, SlateError> {
        geometry.validate()?;
        let page_width = geometry.effective_width();
        let page_height = geometry.effective_height();
        let orientation = geometry.orientation;
        let mut engine = Self {
            backend,
            page_width,
            page_height,
            cursor: Cursor::default(),
            orientation,
            auto_page_break: true,
            first_page: true,
            page_number: 0,
            current_font: None,
            current_text_color: None,
            header,
            footer,
            callback_errors: Vec::new(),
            geometry,
        };
        engine.cursor.reset_x(engine.geometry.margin_left);
        engine.cursor.reset_y(engine.geometry.margin_top);
        Ok(engine)
    }

    // -----------------------------------------------------------------
    // Pagination
    // -----------------------------------------------------------------

    /// Start a new page: bump the counter, allocate a physical page (except on
    /// the very first call, which reuses the backend's implicit first page),
    /// then run footer and header unless skipped.
    pub fn add_page(
        &mut self,
        orientation: Orientation,
        skip_header: bool,
        skip_footer: bool,
    ) -> Result<(), SlateError> {
        self.page_number += 1;
        self.orientation = orientation;

        if self.first_page {
            self.first_page = false;
        } else {
            self.backend
                .add_page(self.page_width, self.page_height, orientation)?;
            log::debug!("allocated physical page for page {}", self.page_number);
        }

        if !skip_footer {
            self.run_callback(CallbackKind::Footer);
        }
        self.cursor.reset_y(self.geometry.margin_top);
        if !skip_header {
            self.run_callback(CallbackKind::Header);
        }
        self.cursor.reset_x(self.geometry.margin_left);
        Ok(())
    }

    /// True iff drawing something `height` mm tall at the current cursor
    /// would run into the bottom margin / footer band.
    pub fn will_page_break(&self, height: f32) -> bool {
        self.cursor.y + height + self.geometry.margin_bottom + self.geometry.footer_height
            >= self.page_height
    }

    /// Auto-break check run before height-consuming draws.
    pub(crate) fn check_new_page(&mut self, height: f32) -> Result<(), SlateError> {
        if self.auto_page_break && self.will_page_break(height) {
            self.add_page(self.orientation, false, false)?;
        }
        Ok(())
    }

    /// Run a header or footer callback with font/color save-restore. The
    /// footer additionally runs with auto page-break forced off so overflowing
    /// footer content cannot recurse into another page break.
    fn run_callback(&mut self, kind: CallbackKind) {
        let callback = match kind {
            CallbackKind::Header => self.header.clone(),
            CallbackKind::Footer => self.footer.clone(),
        };
        let Some(callback) = callback else { return };

        let saved_font = self.current_font.clone();
        let saved_color = self.current_text_color;

        self.cursor.reset_x(self.geometry.margin_left);
        let result = match kind {
            CallbackKind::Header => {
                self.cursor.y = self.geometry.margin_top;
                callback(self)
            }
            CallbackKind::Footer => {
                self.cursor.y = self.page_height
                    - self.geometry.margin_bottom
                    - self.geometry.footer_height;
                self.auto_page_break = false;
                let result = callback(self);
                self.auto_page_break = true;
                result
            }
        };

        if let Err(e) = result {
            log::warn!("{kind} callback failed on page {}: {e}", self.page_number);
            self.callback_errors.push(CallbackError {
                page: self.page_number,
                kind,
                message: e.to_string(),
            });
        }

        // Callback-local styling must not bleed into the body content.
        if let Some(font) = saved_font {
            if let Err(e) = self.set_font(&font.name, &font.style, font.size) {
                log::warn!("could not restore font after {kind} callback: {e}");
            }
        }
        if let Some(color) = saved_color {
            self.set_text_color(color);
        }
    }

    /// Page number as seen by the caller (1-based after the first `add_page`).
    pub fn page_no(&self) -> usize {
        self.page_number
    }

    // -----------------------------------------------------------------
    // Font & color state
    // -----------------------------------------------------------------

    pub fn set_font(&mut self, name: &str, style: &str, size: f32) -> Result<(), SlateError> {
        self.current_font = Some(FontSpec {
            name: name.to_string(),
            style: style.to_string(),
            size,
        });
        self.backend.set_font(name, style, size)
    }

    pub fn add_font(
        &mut self,
        identifier: &str,
        name: &str,
        style: &str,
        data: Vec<u8>,
    ) -> Result<(), SlateError> {
        self.backend.register_font(identifier, name, style, data)
    }

    /// Size of the active font in points, 0 when no font was ever set.
    pub(crate) fn font_size(&self) -> f32 {
        self.current_font.as_ref().map(|f| f.size).unwrap_or(0.0)
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = Some(color);
        self.backend.set_text_color(color);
    }

    pub fn set_draw_color(&mut self, color: Color) {
        self.backend.set_draw_color(color);
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.backend.set_fill_color(color);
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.backend.set_line_width(width);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.backend.rotate_canvas(angle);
    }

    // -----------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------

    pub fn get_x(&self) -> f32 {
        self.cursor.x
    }

    pub fn get_y(&self) -> f32 {
        self.cursor.y
    }

    pub fn set_x(&mut self, x: f32) {
        self.cursor.x = x;
    }

    /// Negative values are measured from the page bottom.
    pub fn set_y(&mut self, y: f32) {
        if y < 0.0 {
            self.cursor.y = self.page_height + y;
        } else {
            self.cursor.y = y;
        }
    }

    pub fn set_xy(&mut self, x: f32, y: f32) {
        self.set_x(x);
        self.set_y(y);
    }

    /// Line break: move down by `height` and return to the left margin.
    pub fn new_line(&mut self, height: f32) {
        self.cursor.y += height;
        self.cursor.reset_x(self.geometry.margin_left);
    }

    // -----------------------------------------------------------------
    // Simple painting
    // -----------------------------------------------------------------

    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Result<(), SlateError> {
        self.backend.draw_line(x0, y0, x1, y1)
    }

    // -----------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------

    pub fn finish(&mut self) -> Result<Vec<u8>, SlateError> {
        self.backend.finish()
    }

    /// Drain the header/footer failures collected so far.
    pub fn take_callback_errors(&mut self) -> Vec<CallbackError> {
        std::mem::take(&mut self.callback_errors)
    }
}
