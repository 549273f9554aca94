//! The parsed document: metadata, attribute bag, and the content tree.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::Error;
use crate::html;
use crate::node::{NodeArena, NodeId};
use crate::parser::Parser;

/// A parsed document: header metadata plus the content tree.
///
/// Created by [`parse`](Self::parse) or [`open`](Self::open); the tree is
/// only mutated while parsing and is immutable afterwards, so a finished
/// document may be rendered by any number of readers.
#[derive(Debug, Serialize)]
pub struct Document {
    /// Document title from the `= Title` header line.
    pub title: String,
    /// Author line, verbatim.
    pub author: String,
    /// Revision number from a `vN.N.N` line, without the leading `v`.
    pub rev_number: String,
    /// Separator between revision number and date (`,` when both present).
    pub rev_separator: String,
    /// Revision date following the comma.
    pub rev_date: String,
    /// File modification time, formatted; empty for in-memory parses.
    pub last_updated: String,
    /// Document attributes from `:key: value` lines.
    pub attributes: HashMap<String, String>,
    /// The header node, when the document has a title.
    pub header: Option<NodeId>,
    /// The content root node.
    pub content: NodeId,
    /// Storage for the document tree.
    pub arena: NodeArena,
}

impl Document {
    /// Parse an in-memory document.
    ///
    /// Parsing is total: every input yields a document.
    #[must_use]
    pub fn parse(input: &str) -> Document {
        Parser::parse(input)
    }

    /// Read and parse a file, capturing its modification time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] with the offending path when the file cannot be
    /// read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Document, Error> {
        let path = path.as_ref();
        let wrap = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let meta = fs::metadata(path).map_err(wrap)?;
        let raw = fs::read_to_string(path).map_err(wrap)?;
        let mut doc = Document::parse(&raw);
        if let Ok(mtime) = meta.modified() {
            doc.last_updated = format_timestamp(mtime);
        }
        Ok(doc)
    }

    /// Render the document as HTML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] when the writer fails.
    pub fn to_html<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        html::render(self, w)?;
        Ok(())
    }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS +0000`, rounded to seconds.
fn format_timestamp(t: SystemTime) -> String {
    let secs = match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() + u64::from(d.subsec_nanos() >= 500_000_000),
        Err(_) => 0,
    };
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let rem = secs % 86_400;
    format!(
        "{year:04}-{month:02}-{day:02} {:02}:{:02}:{:02} +0000",
        rem / 3600,
        rem % 3600 / 60,
        rem % 60
    )
}

/// Convert days since the Unix epoch to a civil date (Gregorian, UTC).
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    (y + i64::from(m <= 2), m, d)
}
