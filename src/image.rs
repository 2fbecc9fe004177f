//! Image placement with aspect-ratio preservation.
//!
//! The engine only decides the target box; decoding and painting belong to
//! the backend. Intrinsic dimensions come from the `image` crate; when the
//! bytes cannot be decoded the image is painted into the requested box
//! unadjusted and the caller decides what to do about it.

use crate::engine::LayoutEngine;
use crate::error::SlateError;

/// Intrinsic pixel dimensions of encoded image bytes, `None` when the bytes
/// cannot be decoded (a warning is logged).
pub fn image_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    match image::load_from_memory(bytes) {
        Ok(img) => Some((img.width(), img.height())),
        Err(e) => {
            log::warn!("image could not be decoded, skipping aspect ratio: {e}");
            None
        }
    }
}

impl LayoutEngine {
    /// Paint encoded image bytes at `(x, y)` into a `w`×`h` mm box.
    ///
    /// With `keep_aspect_ratio` the box is shrunk along one axis so the
    /// painted ratio matches the intrinsic one: a relatively taller image is
    /// constrained by height, a relatively wider one by width.
    pub fn add_image(
        &mut self,
        bytes: &[u8],
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        keep_aspect_ratio: bool,
    ) -> Result<(), SlateError> {
        let (mut w, mut h) = (w, h);

        if keep_aspect_ratio {
            if w <= 0.0 || h <= 0.0 {
                log::warn!("degenerate image box {w}x{h} mm, aspect ratio not preserved");
            } else if let Some((px_w, px_h)) = image_dimensions(bytes) {
                let image_ar = px_w as f32 / px_h as f32;
                let target_ar = w / h;
                if image_ar < target_ar {
                    w = h * image_ar;
                } else if image_ar > target_ar {
                    h = w / image_ar;
                }
            }
        }

        self.backend.draw_image(bytes, x, y, w, h, 0.0)
    }
}
