#![doc = include_str!("../README.md")]
#![deny(missing_docs, unsafe_code)]

mod document;
mod error;
mod html;
mod line;
mod node;
mod parser;
mod style;

pub use document::Document;
pub use error::Error;
pub use line::{classify, LineKind, LineSource};
pub use node::{generate_id, Node, NodeArena, NodeId, NodeKind};
pub use style::{parse_block_attribute, parse_style, AttrEntry, Style};

use std::path::Path;

/// Parse an in-memory document.
///
/// Parsing is total: every input yields a document.
#[must_use]
pub fn parse_document(input: &str) -> Document {
    Document::parse(input)
}

/// Read a file, capture its modification time, and parse it.
///
/// # Errors
///
/// Returns [`Error::Io`] with the offending path when the file cannot be
/// read.
pub fn open_document<P: AsRef<Path>>(path: P) -> Result<Document, Error> {
    Document::open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_render_round() {
        let doc = parse_document("= T\n\nhello\n");
        let mut out = Vec::new();
        doc.to_html(&mut out).unwrap();
        assert!(!out.is_empty());
    }
}
