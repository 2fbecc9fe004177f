//! The document facade.
//!
//! One unified API over whichever backend is active. The facade holds no
//! layout logic: every operation routes to the [`LayoutEngine`], which in turn
//! talks only to the [`RenderBackend`] trait. The backend is chosen once, at
//! construction, either explicitly or from the execution context.

use std::fs;
use std::path::Path;

use crate::backend::{Color, RenderBackend};
use crate::command_backend::CommandBackend;
use crate::engine::{LayoutEngine, PageCallback};
use crate::error::{CallbackError, SlateError};
use crate::geometry::{Orientation, PageGeometry};
use crate::pdf_backend::PdfBackend;
use crate::text::{CellOptions, MultiCellOptions};

/// Which renderer a document paints through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Native PDF renderer; the exported bytes are a PDF file.
    Native,
    /// Draw-command stream for a browser-side painter; the exported bytes are
    /// a JSON command list.
    CommandStream,
}

impl BackendKind {
    /// Pick the backend for the current execution context: the command stream
    /// when running in a browser (wasm), the native renderer otherwise.
    pub fn detect() -> Self {
        if cfg!(target_arch = "wasm32") {
            BackendKind::CommandStream
        } else {
            BackendKind::Native
        }
    }
}

/// Document-level configuration.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Title embedded in the artifact metadata where the backend supports it.
    pub title: String,
    pub geometry: PageGeometry,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: "pdf-slate output".to_string(),
            geometry: PageGeometry::default(),
        }
    }
}

/// A document under construction. Single logical writer; create one per
/// output artifact and export once.
pub struct Document {
    engine: LayoutEngine,
    kind: BackendKind,
}

impl Document {
    /// Create a document on the context-detected backend, no callbacks.
    pub fn new(config: DocumentConfig) -> Result<Self, SlateError> {
        Self::with_backend(config, BackendKind::detect(), None, None)
    }

    /// Create a document on the context-detected backend with header/footer
    /// callbacks.
    pub fn with_callbacks(
        config: DocumentConfig,
        header: Option<PageCallback>,
        footer: Option<PageCallback>,
    ) -> Result<Self, SlateError> {
        Self::with_backend(config, BackendKind::detect(), header, footer)
    }

    /// Create a document on an explicitly chosen backend.
    pub fn with_backend(
        config: DocumentConfig,
        kind: BackendKind,
        header: Option<PageCallback>,
        footer: Option<PageCallback>,
    ) -> Result<Self, SlateError> {
        let geometry = config.geometry;
        let backend: Box<dyn RenderBackend> = match kind {
            BackendKind::Native => Box::new(PdfBackend::new(
                &config.title,
                geometry.effective_width(),
                geometry.effective_height(),
            )),
            BackendKind::CommandStream => Box::new(CommandBackend::new()),
        };
        let engine = LayoutEngine::new(backend, geometry, header, footer)?;
        Ok(Self { engine, kind })
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    // -----------------------------------------------------------------
    // Pagination
    // -----------------------------------------------------------------

    pub fn add_page(
        &mut self,
        orientation: Orientation,
        skip_header: bool,
        skip_footer: bool,
    ) -> Result<(), SlateError> {
        self.engine.add_page(orientation, skip_header, skip_footer)
    }

    pub fn will_page_break(&self, height: f32) -> bool {
        self.engine.will_page_break(height)
    }

    pub fn page_no(&self) -> usize {
        self.engine.page_no()
    }

    // -----------------------------------------------------------------
    // Fonts & styling
    // -----------------------------------------------------------------

    pub fn add_font(
        &mut self,
        identifier: &str,
        name: &str,
        style: &str,
        data: Vec<u8>,
    ) -> Result<(), SlateError> {
        self.engine.add_font(identifier, name, style, data)
    }

    pub fn set_font(&mut self, name: &str, style: &str, size: f32) -> Result<(), SlateError> {
        self.engine.set_font(name, style, size)
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.engine.set_text_color(color);
    }

    pub fn set_draw_color(&mut self, color: Color) {
        self.engine.set_draw_color(color);
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.engine.set_fill_color(color);
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.engine.set_line_width(width);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.engine.rotate(angle);
    }

    // -----------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------

    pub fn cell(
        &mut self,
        width: f32,
        height: f32,
        text: &str,
        opts: CellOptions,
    ) -> Result<(), SlateError> {
        self.engine.cell(width, height, text, opts)
    }

    pub fn vertical_text(
        &mut self,
        width: f32,
        height: f32,
        text: &str,
        opts: CellOptions,
    ) -> Result<(), SlateError> {
        self.engine.vertical_text(width, height, text, opts)
    }

    pub fn multi_cell(
        &mut self,
        width: f32,
        height: f32,
        text: &str,
        opts: MultiCellOptions,
    ) -> Result<(), SlateError> {
        self.engine.multi_cell(width, height, text, opts)
    }

    /// Vertical gap: an empty 1 mm wide cell with a line break.
    pub fn spacer(&mut self, height: f32) -> Result<(), SlateError> {
        self.engine.cell(
            1.0,
            height,
            "",
            CellOptions {
                ln: true,
                ..CellOptions::default()
            },
        )
    }

    pub fn new_line(&mut self, height: f32) {
        self.engine.new_line(height);
    }

    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Result<(), SlateError> {
        self.engine.line(x0, y0, x1, y1)
    }

    pub fn add_image(
        &mut self,
        bytes: &[u8],
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        keep_aspect_ratio: bool,
    ) -> Result<(), SlateError> {
        self.engine.add_image(bytes, x, y, w, h, keep_aspect_ratio)
    }

    // -----------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------

    pub fn get_x(&self) -> f32 {
        self.engine.get_x()
    }

    pub fn get_y(&self) -> f32 {
        self.engine.get_y()
    }

    pub fn set_x(&mut self, x: f32) {
        self.engine.set_x(x);
    }

    pub fn set_y(&mut self, y: f32) {
        self.engine.set_y(y);
    }

    pub fn set_xy(&mut self, x: f32, y: f32) {
        self.engine.set_xy(x, y);
    }

    // -----------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------

    /// Produce the exported artifact: PDF bytes on the native backend, a JSON
    /// draw-command list on the command-stream backend.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, SlateError> {
        self.engine.finish()
    }

    /// Export and write the artifact to a file.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SlateError> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Header/footer failures collected during rendering; check after export.
    pub fn take_callback_errors(&mut self) -> Vec<CallbackError> {
        self.engine.take_callback_errors()
    }
}
