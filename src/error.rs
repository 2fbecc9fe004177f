//! Error types.
//!
//! Backend and configuration failures abort document construction; header and
//! footer callback failures deliberately do not. A broken header must not lose
//! already-drawn body content, so those are logged, collected on the document
//! and surfaced after export via `Document::take_callback_errors`.

use thiserror::Error;

/// Errors produced while building or exporting a document.
#[derive(Error, Debug)]
pub enum SlateError {
    #[error("invalid page geometry: {0}")]
    Config(String),

    #[error("font error: {0}")]
    Font(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("render backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which page callback failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Header,
    Footer,
}

impl std::fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallbackKind::Header => write!(f, "header"),
            CallbackKind::Footer => write!(f, "footer"),
        }
    }
}

/// A header/footer callback failure, recorded instead of aborting the render.
#[derive(Debug, Clone)]
pub struct CallbackError {
    /// Page number (1-based) the callback was rendering.
    pub page: usize,
    pub kind: CallbackKind,
    pub message: String,
}

impl std::fmt::Display for CallbackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} callback failed on page {}: {}", self.kind, self.page, self.message)
    }
}
