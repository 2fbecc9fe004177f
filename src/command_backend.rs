//! Draw-command backend.
//!
//! Instead of painting, this backend records every capability call as a
//! serde-serializable [`DrawCommand`] and exports the accumulated buffer as
//! JSON. A browser-side painter replays the stream against its own canvas
//! (per-call rotation angles, base64 image and font payloads), which keeps the
//! layout engine byte-for-byte identical on both sides of the wire.
//!
//! Text is still measured locally through [`FontManager`] so page-break and
//! word-wrap decisions match the native backend exactly.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::backend::{Align, Color, RectStyle, RenderBackend, TextOptions};
use crate::error::SlateError;
use crate::fonts::{FontKey, FontManager};
use crate::geometry::Orientation;

/// One recorded capability call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    AddPage {
        width: f32,
        height: f32,
        orientation: Orientation,
    },
    RegisterFont {
        identifier: String,
        family: String,
        style: String,
        /// Raw TTF/OTF bytes, base64-encoded for the JSON wire format.
        data: String,
    },
    SetFont {
        family: String,
        style: String,
        size: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        align: Align,
        angle: f32,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        style: RectStyle,
    },
    Line {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
    },
    SetLineWidth {
        width: f32,
    },
    SetTextColor {
        color: Color,
    },
    SetDrawColor {
        color: Color,
    },
    SetFillColor {
        color: Color,
    },
    Image {
        /// Encoded image bytes, base64 for the JSON wire format.
        data: String,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rotation: f32,
    },
    RotateCanvas {
        angle: f32,
    },
}

/// Backend that accumulates a [`DrawCommand`] buffer.
pub struct CommandBackend {
    fonts: FontManager,
    current_font: FontKey,
    font_size: f32,
    commands: Vec<DrawCommand>,
}

impl CommandBackend {
    pub fn new() -> Self {
        Self {
            fonts: FontManager::new(),
            current_font: FontKey::new("Helvetica", ""),
            font_size: 10.0,
            commands: Vec::new(),
        }
    }

    /// The recorded commands, in issue order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Parse an exported byte stream back into commands.
    pub fn decode(bytes: &[u8]) -> Result<Vec<DrawCommand>, SlateError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl Default for CommandBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for CommandBackend {
    fn add_page(
        &mut self,
        width: f32,
        height: f32,
        orientation: Orientation,
    ) -> Result<(), SlateError> {
        self.commands.push(DrawCommand::AddPage {
            width,
            height,
            orientation,
        });
        Ok(())
    }

    fn register_font(
        &mut self,
        identifier: &str,
        family: &str,
        style: &str,
        data: Vec<u8>,
    ) -> Result<(), SlateError> {
        self.fonts.register(family, style, data.clone())?;
        self.commands.push(DrawCommand::RegisterFont {
            identifier: identifier.to_string(),
            family: family.to_string(),
            style: style.to_string(),
            data: BASE64_STD.encode(&data),
        });
        Ok(())
    }

    fn set_font(&mut self, family: &str, style: &str, size: f32) -> Result<(), SlateError> {
        self.current_font = FontKey::new(family, style);
        self.font_size = size;
        self.commands.push(DrawCommand::SetFont {
            family: family.to_string(),
            style: style.to_string(),
            size,
        });
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
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            align: options.align,
            angle: options.angle,
        });
        Ok(())
    }

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, style: RectStyle)
        -> Result<(), SlateError> {
        self.commands.push(DrawCommand::Rect { x, y, w, h, style });
        Ok(())
    }

    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Result<(), SlateError> {
        self.commands.push(DrawCommand::Line { x0, y0, x1, y1 });
        Ok(())
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::SetLineWidth { width });
    }

    fn set_text_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::SetTextColor { color });
    }

    fn set_draw_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::SetDrawColor { color });
    }

    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::SetFillColor { color });
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
        self.commands.push(DrawCommand::Image {
            data: BASE64_STD.encode(bytes),
            x,
            y,
            w,
            h,
            rotation,
        });
        Ok(())
    }

    fn rotate_canvas(&mut self, angle: f32) {
        self.commands.push(DrawCommand::RotateCanvas { angle });
    }

    fn finish(&mut self) -> Result<Vec<u8>, SlateError> {
        Ok(serde_json::to_vec_pretty(&self.commands)?)
    }
}
