//! Error types for the document engine.
//!
//! Parsing itself is total — every byte sequence produces a document — so the
//! error surface covers only file loading and HTML rendering.

use std::io;
use std::path::PathBuf;

/// Errors surfaced by [`open_document`](crate::open_document) and
/// [`Document::to_html`](crate::Document::to_html).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Opening or reading the source file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Writing rendered HTML to the output failed.
    #[error("render: {0}")]
    Render(#[from] io::Error),
}
