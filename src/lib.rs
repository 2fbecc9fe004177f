//! # pdf-slate – cursor-based document layout with interchangeable backends
//!
//! Build a paginated document (headers, footers, cells, wrapped text, images,
//! vector lines) once and render it through either of two backends that
//! produce visually equivalent output:
//!
//! 1. **Native**: a server-side PDF renderer built on printpdf
//!    ([`pdf_backend`])
//! 2. **Command stream**: a serialized draw-command list replayed by a
//!    browser-side painter ([`command_backend`])
//!
//! The layout/cursor engine ([`engine`], [`text`], [`image`]) owns page-break
//! detection, header/footer re-entrancy, greedy word-wrap with character
//! truncation and aspect-ratio-preserving image placement; it depends only on
//! the [`backend::RenderBackend`] capability trait, never on a concrete
//! renderer. Callers go through the [`document::Document`] facade.

pub mod backend;
pub mod command_backend;
pub mod document;
pub mod engine;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod image;
pub mod pdf_backend;
pub mod text;

// Re-exports for convenience
pub use backend::{Align, Color, RectStyle, RenderBackend, TextOptions};
pub use command_backend::{CommandBackend, DrawCommand};
pub use document::{BackendKind, Document, DocumentConfig};
pub use engine::{LayoutEngine, PageCallback};
pub use error::{CallbackError, CallbackKind, SlateError};
pub use geometry::{Cursor, Orientation, PageGeometry};
pub use pdf_backend::PdfBackend;
pub use text::{CellOptions, MultiCellOptions};
