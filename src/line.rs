//! Line source and line classification.
//!
//! [`LineSource`] is a pull interface over the raw document: each call yields
//! the next line without its terminator and `None` at end of input. A final
//! line without a trailing newline is still yielded once.
//!
//! [`classify`] is a pure function mapping a line to a [`LineKind`] together
//! with its leading whitespace and the payload the parser dispatches on.
//! Classification is context-free; the same characters may mean something
//! else depending on parser state, but all of that context is applied by the
//! body parser, never here.

/// The classification of a single source line.
///
/// Covers both pure line kinds (empty, comment, attribute entry, …) and the
/// kinds that open a node (sections, delimited blocks, list items, macros).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// A blank line.
    Empty,
    /// Plain text — the fallback when nothing else matches.
    Text,
    /// `'''`, `---`, `- - -`, `***`, or `* * *`.
    HorizontalRule,
    /// `<<<`.
    PageBreak,
    /// A lone `+`, attaching the next block to the current list item.
    ListContinue,
    /// `.` followed by an alphanumeric character: a block title.
    BlockTitle,
    /// A `//` single-line comment.
    Comment,
    /// A `////` comment-block fence.
    BlockComment,
    /// A `:key: value` document attribute entry.
    Attribute,
    /// A `[name,…]` style line.
    Style,
    /// A `[.a.b]` style-class line.
    StyleClass,
    /// `NOTE:`/`TIP:`/`IMPORTANT:`/`WARNING:`/`CAUTION:` prefixed line.
    Admonition,
    /// `== ` section heading.
    SectionL1,
    /// `=== ` section heading.
    SectionL2,
    /// `==== ` section heading.
    SectionL3,
    /// `===== ` section heading.
    SectionL4,
    /// `====== ` section heading.
    SectionL5,
    /// A lone `--`: open-block fence.
    BlockOpen,
    /// A lone `----`: listing-block fence.
    BlockListingDelim,
    /// A lone `....`: literal-block fence.
    BlockLiteralDelim,
    /// `[literal]`: named literal block opener.
    BlockLiteralNamed,
    /// A lone `****`: sidebar fence.
    BlockSidebar,
    /// A lone `====`: example-block fence.
    BlockExample,
    /// `image::target[attrs]` block macro; the payload is the macro tail.
    BlockImage,
    /// `audio::target[attrs]` block macro; the payload is the macro tail.
    BlockAudio,
    /// `video::target[attrs]` block macro; the payload is the macro tail.
    BlockVideo,
    /// One or more `.` markers followed by whitespace.
    ListOrderedItem,
    /// One or more `*` markers followed by whitespace.
    ListUnorderedItem,
    /// A line containing `::` past its first character.
    ListDescriptionItem,
    /// An indented line that is not itself a list item.
    LiteralParagraph,
}

impl LineKind {
    /// Section depth for `SectionL1`..`SectionL5`, or `None`.
    #[must_use]
    pub fn section_level(self) -> Option<i32> {
        match self {
            Self::SectionL1 => Some(1),
            Self::SectionL2 => Some(2),
            Self::SectionL3 => Some(3),
            Self::SectionL4 => Some(4),
            Self::SectionL5 => Some(5),
            _ => None,
        }
    }

    /// Returns `true` for `SectionL1`..`SectionL5`.
    #[must_use]
    pub fn is_section(self) -> bool {
        self.section_level().is_some()
    }
}

/// Classify a single line.
///
/// Returns the kind, the leading whitespace (empty unless the line is
/// indented), and the payload: the line stripped of leading whitespace, or
/// the macro tail for `image::`/`video::`/`audio::` lines.
#[must_use]
pub fn classify(line: &str) -> (LineKind, &str, &str) {
    if line.is_empty() {
        return (LineKind::Empty, "", line);
    }
    // Comment block first: the single-line check below is a prefix match.
    if line.starts_with("////") {
        return (LineKind::BlockComment, "", line);
    }
    // Prefix match so that `//comment` without a space still counts.
    if line.starts_with("//") {
        return (LineKind::Comment, "", line);
    }
    if matches!(line, "'''" | "---" | "- - -" | "***" | "* * *") {
        return (LineKind::HorizontalRule, "", line);
    }
    if line == "<<<" {
        return (LineKind::PageBreak, "", line);
    }
    if line == "--" {
        return (LineKind::BlockOpen, "", line);
    }
    if let Some(tail) = line.strip_prefix("image::") {
        return (LineKind::BlockImage, "", tail.trim_end_matches([' ', '\t']));
    }
    if let Some(tail) = line.strip_prefix("video::") {
        return (LineKind::BlockVideo, "", tail.trim_end_matches([' ', '\t']));
    }
    if let Some(tail) = line.strip_prefix("audio::") {
        return (LineKind::BlockAudio, "", tail.trim_end_matches([' ', '\t']));
    }
    if is_admonition(line) {
        return (LineKind::Admonition, "", line);
    }

    let payload = line.trim_start_matches([' ', '\t']);
    if payload.len() < line.len() {
        let spaces = &line[..line.len() - payload.len()];
        if payload.is_empty() {
            // Whitespace-only line: indentation with nothing after it.
            return (LineKind::LiteralParagraph, spaces, payload);
        }
        // Indentation is only allowed on list items; anything else indented
        // is a literal paragraph.
        if is_description_item(payload) {
            return (LineKind::ListDescriptionItem, spaces, payload);
        }
        if !payload.starts_with('*') && !payload.starts_with('.') {
            return (LineKind::LiteralParagraph, spaces, payload);
        }
        return (dispatch(payload), spaces, payload);
    }
    (dispatch(line), "", line)
}

/// First-character dispatch for unindented payloads.
fn dispatch(line: &str) -> LineKind {
    match line.as_bytes()[0] {
        b':' => LineKind::Attribute,
        b'[' => {
            let closed = line.trim_end_matches([' ', '\t']);
            if closed.ends_with(']') {
                if line == "[literal]" {
                    LineKind::BlockLiteralNamed
                } else if line.as_bytes()[1] == b'.' {
                    LineKind::StyleClass
                } else {
                    LineKind::Style
                }
            } else {
                LineKind::Text
            }
        }
        b'=' => {
            if line == "====" {
                LineKind::BlockExample
            } else {
                match line.split_whitespace().next() {
                    Some("==") => LineKind::SectionL1,
                    Some("===") => LineKind::SectionL2,
                    Some("====") => LineKind::SectionL3,
                    Some("=====") => LineKind::SectionL4,
                    Some("======") => LineKind::SectionL5,
                    _ => LineKind::Text,
                }
            }
        }
        b'.' => {
            if line.len() <= 1 {
                LineKind::Text
            } else if line == "...." {
                LineKind::BlockLiteralDelim
            } else if line.as_bytes()[1].is_ascii_alphanumeric() {
                LineKind::BlockTitle
            } else if marker_run_ends_in_space(line, b'.') {
                LineKind::ListOrderedItem
            } else {
                LineKind::Text
            }
        }
        b'*' => {
            if line.len() <= 1 {
                LineKind::Text
            } else if line == "****" {
                LineKind::BlockSidebar
            } else if marker_run_ends_in_space(line, b'*') {
                LineKind::ListUnorderedItem
            } else {
                LineKind::Text
            }
        }
        _ => {
            if line == "+" {
                LineKind::ListContinue
            } else if line == "----" {
                LineKind::BlockListingDelim
            } else if is_description_item(line) {
                LineKind::ListDescriptionItem
            } else {
                LineKind::Text
            }
        }
    }
}

/// Scan for a list-item marker: skips marker and non-marker characters alike
/// until whitespace is found (or the line ends without any).
fn marker_run_ends_in_space(line: &str, marker: u8) -> bool {
    for &b in line.as_bytes() {
        if b == marker {
            continue;
        }
        if b == b' ' || b == b'\t' {
            return true;
        }
    }
    false
}

/// An admonition line: a label, a colon, then whitespace.
fn is_admonition(line: &str) -> bool {
    for label in ["CAUTION", "IMPORTANT", "NOTE", "TIP", "WARNING"] {
        if let Some(rest) = line.strip_prefix(label) {
            let bytes = rest.as_bytes();
            return bytes.first() == Some(&b':') && matches!(bytes.get(1), Some(&b' ' | &b'\t'));
        }
    }
    false
}

/// A description-list item contains `::` past its first character.
fn is_description_item(line: &str) -> bool {
    matches!(line.find("::"), Some(x) if x > 0)
}

/// A pull source of logical lines.
///
/// Lines never contain their terminating newline. The source tracks a
/// 1-based line number for trace logging.
#[derive(Debug)]
pub struct LineSource<'a> {
    rest: Option<&'a str>,
    line_num: usize,
}

impl<'a> LineSource<'a> {
    /// Wrap a raw document.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: Some(input),
            line_num: 0,
        }
    }

    /// Yield the next line, or `None` at end of input.
    pub fn next_line(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        match rest.find('\n') {
            Some(i) => {
                self.rest = Some(&rest[i + 1..]);
                self.line_num += 1;
                Some(&rest[..i])
            }
            None if rest.is_empty() => {
                self.rest = None;
                None
            }
            None => {
                self.rest = None;
                self.line_num += 1;
                Some(rest)
            }
        }
    }

    /// 1-based number of the most recently yielded line.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_num
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(line: &str) -> LineKind {
        classify(line).0
    }

    // ── Line source ──────────────────────────────────────────────────

    #[test]
    fn source_empty_input() {
        let mut src = LineSource::new("");
        assert_eq!(src.next_line(), None);
    }

    #[test]
    fn source_final_line_without_newline() {
        let mut src = LineSource::new("abc");
        assert_eq!(src.next_line(), Some("abc"));
        assert_eq!(src.next_line(), None);
        assert_eq!(src.line_number(), 1);
    }

    #[test]
    fn source_trailing_newline() {
        let mut src = LineSource::new("a\n");
        assert_eq!(src.next_line(), Some("a"));
        assert_eq!(src.next_line(), None);
    }

    #[test]
    fn source_blank_lines_preserved() {
        let mut src = LineSource::new("a\n\nb");
        assert_eq!(src.next_line(), Some("a"));
        assert_eq!(src.next_line(), Some(""));
        assert_eq!(src.next_line(), Some("b"));
        assert_eq!(src.next_line(), None);
        assert_eq!(src.line_number(), 3);
    }

    // ── Structural kinds ─────────────────────────────────────────────

    #[test]
    fn classify_empty() {
        assert_eq!(kind(""), LineKind::Empty);
    }

    #[test]
    fn classify_comments() {
        assert_eq!(kind("// a comment"), LineKind::Comment);
        assert_eq!(kind("//no space"), LineKind::Comment);
        assert_eq!(kind("////"), LineKind::BlockComment);
        assert_eq!(kind("//// trailing"), LineKind::BlockComment);
    }

    #[test]
    fn classify_horizontal_rules() {
        for hr in ["'''", "---", "- - -", "***", "* * *"] {
            assert_eq!(kind(hr), LineKind::HorizontalRule, "line {hr:?}");
        }
        assert_eq!(kind("----"), LineKind::BlockListingDelim);
        assert_eq!(kind("'' '"), LineKind::Text);
    }

    #[test]
    fn classify_page_break() {
        assert_eq!(kind("<<<"), LineKind::PageBreak);
        assert_eq!(kind("<<<<"), LineKind::Text);
    }

    #[test]
    fn classify_block_fences() {
        assert_eq!(kind("--"), LineKind::BlockOpen);
        assert_eq!(kind("...."), LineKind::BlockLiteralDelim);
        assert_eq!(kind("[literal]"), LineKind::BlockLiteralNamed);
        assert_eq!(kind("****"), LineKind::BlockSidebar);
        assert_eq!(kind("===="), LineKind::BlockExample);
    }

    #[test]
    fn classify_macros_strip_tail() {
        let (k, spaces, payload) = classify("image::logo.png[Logo]  ");
        assert_eq!(k, LineKind::BlockImage);
        assert_eq!(spaces, "");
        assert_eq!(payload, "logo.png[Logo]");

        assert_eq!(kind("video::abc[youtube]"), LineKind::BlockVideo);
        assert_eq!(kind("audio::song.mp3[]"), LineKind::BlockAudio);
    }

    #[test]
    fn classify_admonitions() {
        assert_eq!(kind("NOTE: remember"), LineKind::Admonition);
        assert_eq!(kind("WARNING:\tcareful"), LineKind::Admonition);
        assert_eq!(kind("CAUTION: hot"), LineKind::Admonition);
        // No space after the colon, or no colon: plain text.
        assert_eq!(kind("NOTE:remember"), LineKind::Text);
        assert_eq!(kind("NOTE remember"), LineKind::Text);
        assert_eq!(kind("NOTE:"), LineKind::Text);
    }

    // ── Sections ─────────────────────────────────────────────────────

    #[test]
    fn classify_sections() {
        assert_eq!(kind("== Intro"), LineKind::SectionL1);
        assert_eq!(kind("=== Deeper"), LineKind::SectionL2);
        assert_eq!(kind("==== More"), LineKind::SectionL3);
        assert_eq!(kind("===== Still"), LineKind::SectionL4);
        assert_eq!(kind("====== Last"), LineKind::SectionL5);
        // A document title is not a section; the header parser owns it.
        assert_eq!(kind("= Title"), LineKind::Text);
        // No space after the markers: text.
        assert_eq!(kind("==Intro"), LineKind::Text);
    }

    // ── Lists and indentation ────────────────────────────────────────

    #[test]
    fn classify_list_items() {
        assert_eq!(kind(". one"), LineKind::ListOrderedItem);
        assert_eq!(kind("... deep"), LineKind::ListOrderedItem);
        assert_eq!(kind("* one"), LineKind::ListUnorderedItem);
        assert_eq!(kind("** two"), LineKind::ListUnorderedItem);
        assert_eq!(kind("CPU:: Fast"), LineKind::ListDescriptionItem);
        assert_eq!(kind("CPU::"), LineKind::ListDescriptionItem);
        // `::` at the start of the line does not make an item.
        assert_eq!(kind(":: nothing"), LineKind::Attribute);
    }

    #[test]
    fn classify_indented_lines() {
        let (k, spaces, payload) = classify("  literal body");
        assert_eq!(k, LineKind::LiteralParagraph);
        assert_eq!(spaces, "  ");
        assert_eq!(payload, "literal body");

        let (k, _, payload) = classify("\t* item");
        assert_eq!(k, LineKind::ListUnorderedItem);
        assert_eq!(payload, "* item");

        let (k, _, payload) = classify("  . item");
        assert_eq!(k, LineKind::ListOrderedItem);
        assert_eq!(payload, ". item");

        let (k, _, payload) = classify("  CPU:: Fast");
        assert_eq!(k, LineKind::ListDescriptionItem);
        assert_eq!(payload, "CPU:: Fast");
    }

    #[test]
    fn classify_block_title_and_attribute() {
        assert_eq!(kind(".A Title"), LineKind::BlockTitle);
        assert_eq!(kind(".9 lives"), LineKind::BlockTitle);
        assert_eq!(kind("."), LineKind::Text);
        assert_eq!(kind(":toc:"), LineKind::Attribute);
        assert_eq!(kind(":imagesdir: images"), LineKind::Attribute);
    }

    #[test]
    fn classify_style_lines() {
        assert_eq!(kind("[horizontal]"), LineKind::Style);
        assert_eq!(kind("[NOTE]"), LineKind::Style);
        assert_eq!(kind("[.lead.center]"), LineKind::StyleClass);
        assert_eq!(kind("[unclosed"), LineKind::Text);
        assert_eq!(kind("[]"), LineKind::Style);
    }

    #[test]
    fn classify_list_continue() {
        assert_eq!(kind("+"), LineKind::ListContinue);
        assert_eq!(kind("++"), LineKind::Text);
    }

    #[test]
    fn classify_is_pure() {
        // Same input, same answer — classification carries no state.
        for line in ["== Intro", ". one", "text", "----", "NOTE: x"] {
            assert_eq!(classify(line), classify(line));
        }
    }
}
