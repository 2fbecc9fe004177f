//! Page geometry and cursor primitives.
//!
//! All lengths are millimetres. The page box, margins and header/footer bands
//! are fixed for the lifetime of a document; only the orientation may change
//! per page.

use serde::{Deserialize, Serialize};

use crate::error::SlateError;

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: width > height.
    Landscape,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

/// The static page layout a document is built against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page height in mm (default: A4 = 297).
    pub page_height: f32,
    /// Page width in mm (default: A4 = 210).
    pub page_width: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Height reserved for the header callback at the top of each page.
    pub header_height: f32,
    /// Height reserved for the footer callback at the bottom of each page.
    pub footer_height: f32,
    /// Orientation of the first page.
    #[serde(default)]
    pub orientation: Orientation,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_height: 297.0,
            page_width: 210.0,
            margin_top: 10.0,
            margin_bottom: 10.0,
            margin_left: 10.0,
            margin_right: 10.0,
            header_height: 0.0,
            footer_height: 0.0,
            orientation: Orientation::Portrait,
        }
    }
}

impl PageGeometry {
    /// Effective page width after applying the initial orientation.
    pub fn effective_width(&self) -> f32 {
        match self.orientation {
            Orientation::Portrait => self.page_width,
            Orientation::Landscape => self.page_height,
        }
    }

    /// Effective page height after applying the initial orientation.
    pub fn effective_height(&self) -> f32 {
        match self.orientation {
            Orientation::Portrait => self.page_height,
            Orientation::Landscape => self.page_width,
        }
    }

    /// Fail fast when margins and header/footer bands leave no printable area.
    pub fn validate(&self) -> Result<(), SlateError> {
        let width = self.effective_width();
        let height = self.effective_height();
        if width <= 0.0 || height <= 0.0 {
            return Err(SlateError::Config(format!(
                "page box must be positive, got {width}x{height} mm"
            )));
        }
        if self.margin_left + self.margin_right >= width {
            return Err(SlateError::Config(format!(
                "horizontal margins ({} + {} mm) exceed the page width ({width} mm)",
                self.margin_left, self.margin_right
            )));
        }
        let vertical = self.margin_top + self.header_height + self.margin_bottom + self.footer_height;
        if vertical >= height {
            return Err(SlateError::Config(format!(
                "vertical margins plus header/footer bands ({vertical} mm) \
                 exceed the page height ({height} mm)"
            )));
        }
        Ok(())
    }
}

/// The current paint position, advanced after each draw call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
}

impl Cursor {
    pub fn reset_x(&mut self, margin_left: f32) {
        self.x = margin_left;
    }

    pub fn reset_y(&mut self, margin_top: f32) {
        self.y = margin_top;
    }
}
