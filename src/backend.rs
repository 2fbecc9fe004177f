//! The backend capability interface.
//!
//! Every rendering backend implements [`RenderBackend`]; the layout engine
//! depends only on this trait, never on a concrete backend type. Coordinates
//! and lengths are mm with the origin at the top-left of the page, font sizes
//! are points, angles are degrees counter-clockwise.

use serde::{Deserialize, Serialize};

use crate::error::SlateError;
use crate::geometry::Orientation;

/// Horizontal text alignment for a single paint call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Whether a rectangle is filled or stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RectStyle {
    Fill,
    Stroke,
}

/// An RGB color triple, 0–255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Grey level, the single-component form of the original color setters.
    pub fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
}

/// Per-call options for [`RenderBackend::draw_text`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextOptions {
    pub align: Align,
    /// Rotation in degrees counter-clockwise around the text anchor.
    pub angle: f32,
}

impl TextOptions {
    pub fn aligned(align: Align) -> Self {
        Self { align, angle: 0.0 }
    }

    pub fn rotated(angle: f32) -> Self {
        Self {
            align: Align::Left,
            angle,
        }
    }
}

/// The contract both renderers satisfy.
///
/// The engine issues paint calls strictly in caller order; backends execute
/// them synchronously. The first physical page exists implicitly after
/// construction; `add_page` is only called for the second page onwards.
pub trait RenderBackend {
    /// Allocate a new physical page and make it current.
    fn add_page(&mut self, width: f32, height: f32, orientation: Orientation)
        -> Result<(), SlateError>;

    /// Register a font face under `family`/`style` from raw TTF/OTF bytes.
    fn register_font(
        &mut self,
        identifier: &str,
        family: &str,
        style: &str,
        data: Vec<u8>,
    ) -> Result<(), SlateError>;

    /// Select the active font for subsequent text operations.
    fn set_font(&mut self, family: &str, style: &str, size: f32) -> Result<(), SlateError>;

    /// Width of `text` in mm when painted with the active font.
    fn text_width(&self, text: &str) -> f32;

    fn draw_text(&mut self, text: &str, x: f32, y: f32, options: &TextOptions)
        -> Result<(), SlateError>;

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, style: RectStyle)
        -> Result<(), SlateError>;

    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Result<(), SlateError>;

    fn set_line_width(&mut self, width: f32);

    fn set_text_color(&mut self, color: Color);

    fn set_draw_color(&mut self, color: Color);

    fn set_fill_color(&mut self, color: Color);

    /// Paint encoded image bytes into the given box. Scaling to the box is the
    /// backend's job; aspect-ratio decisions happen before this call.
    fn draw_image(
        &mut self,
        bytes: &[u8],
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rotation: f32,
    ) -> Result<(), SlateError>;

    /// Rotate the whole canvas. Backends that take a per-call angle in
    /// [`RenderBackend::draw_text`] may treat this as a no-op.
    fn rotate_canvas(&mut self, angle: f32);

    /// Produce the exported byte-stream artifact.
    fn finish(&mut self) -> Result<Vec<u8>, SlateError>;
}
