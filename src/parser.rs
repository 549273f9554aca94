//! The header and body parsers.
//!
//! The body parser is a stateful recursive-descent loop over classified
//! lines: each line either appends to the current open node, opens a new
//! node, or terminates open nodes up to the appropriate ancestor. Lists are
//! handled by three mutually recursive parsers sharing a common frame, and
//! open/example blocks re-enter the body loop with the closing delimiter as
//! terminator.
//!
//! The parser is total: every input produces a document. Unknown constructs
//! degrade to plain text and unclosed delimited blocks consume to the end of
//! input.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::document::Document;
use crate::line::{classify, LineKind, LineSource};
use crate::node::{Node, NodeArena, NodeId, NodeKind};
use crate::style::parse_style;

/// Line kinds that end an open paragraph (besides the empty line).
const PARAGRAPH_TERMS: &[LineKind] = &[
    LineKind::BlockListingDelim,
    LineKind::BlockLiteralDelim,
    LineKind::BlockLiteralNamed,
    LineKind::ListContinue,
    LineKind::BlockOpen,
    LineKind::BlockExample,
    LineKind::BlockSidebar,
];

/// Line kinds that end a literal paragraph (besides the empty line).
const LITERAL_PARAGRAPH_TERMS: &[LineKind] = &[
    LineKind::BlockListingDelim,
    LineKind::BlockLiteralNamed,
    LineKind::BlockLiteralDelim,
    LineKind::BlockOpen,
    LineKind::BlockExample,
    LineKind::BlockSidebar,
];

/// Parser state: the line cursor plus the document under construction.
pub(crate) struct Parser<'src> {
    source: LineSource<'src>,
    kind: LineKind,
    prev_kind: LineKind,
    /// The original text of the current line, for verbatim accumulation.
    raw_line: &'src str,

    arena: NodeArena,
    content: NodeId,
    header: Option<NodeId>,
    /// The staging node: accumulates pending style flags, classes, and block
    /// title until a block opens, then becomes that block.
    current: Node,
    parent: NodeId,

    title: String,
    author: String,
    rev_number: String,
    rev_separator: String,
    rev_date: String,
    attributes: HashMap<String, String>,
}

impl<'src> Parser<'src> {
    fn new(input: &'src str) -> Self {
        let mut arena = NodeArena::new();
        let content = arena.alloc(Node::new(NodeKind::DocContent));
        Self {
            source: LineSource::new(input),
            kind: LineKind::Empty,
            prev_kind: LineKind::Empty,
            raw_line: "",
            arena,
            content,
            header: None,
            current: Node::new(NodeKind::Unknown),
            parent: content,
            title: String::new(),
            author: String::new(),
            rev_number: String::new(),
            rev_separator: String::new(),
            rev_date: String::new(),
            attributes: HashMap::new(),
        }
    }

    /// Parse the whole input and return the finished document.
    pub(crate) fn parse(input: &'src str) -> Document {
        let mut parser = Parser::new(input);
        let header_line = parser.parse_header();
        let preamble = parser
            .arena
            .append(parser.content, Node::new(NodeKind::Preamble));
        parser.parent = preamble;
        parser.current = Node::new(NodeKind::Unknown);
        let root = parser.content;
        parser.parse_body(header_line, None, root);
        debug!(nodes = parser.arena.len(), "document parsed");
        parser.into_document()
    }

    fn into_document(self) -> Document {
        Document {
            title: self.title,
            author: self.author,
            rev_number: self.rev_number,
            rev_separator: self.rev_separator,
            rev_date: self.rev_date,
            last_updated: String::new(),
            attributes: self.attributes,
            header: self.header,
            content: self.content,
            arena: self.arena,
        }
    }

    /// Fetch and classify the next line. Returns the classified payload.
    fn next_line(&mut self) -> Option<&'src str> {
        self.prev_kind = self.kind;
        let raw = self.source.next_line()?;
        let (kind, _spaces, payload) = classify(raw);
        self.kind = kind;
        self.raw_line = raw;
        trace!(
            line = self.source.line_number(),
            kind = ?kind,
            text = raw,
            "classified line"
        );
        Some(payload)
    }

    // ── Header ───────────────────────────────────────────────────────

    /// Parse the optional document header: attribute and comment lines, a
    /// title, an optional author line, an optional revision line.
    ///
    /// Returns the first unconsumed body line, if any.
    fn parse_header(&mut self) -> Option<&'src str> {
        #[derive(PartialEq)]
        enum State {
            Title,
            Author,
            Revision,
            End,
        }
        let mut state = State::Title;
        loop {
            let l = self.next_line()?;
            if l.is_empty() {
                // Blank lines are only allowed before the title.
                if state == State::Title {
                    continue;
                }
                return Some(l);
            }
            if l.starts_with("////") {
                self.skip_comment_block();
                continue;
            }
            if l.starts_with("//") {
                continue;
            }
            if l.starts_with(':') {
                if self.parse_attribute(l, false) {
                    continue;
                }
                if state != State::Title {
                    return Some(l);
                }
            }
            match state {
                State::Title => {
                    if !is_title(l) {
                        return Some(l);
                    }
                    let mut header = Node::new(NodeKind::DocHeader);
                    header.raw.push_str(l[2..].trim());
                    self.title = header.raw.clone();
                    self.header = Some(self.arena.alloc(header));
                    state = State::Author;
                }
                State::Author => {
                    self.author = l.to_string();
                    state = State::Revision;
                }
                State::Revision => {
                    if !self.parse_header_revision(l) {
                        return Some(l);
                    }
                    state = State::End;
                }
                State::End => return Some(l),
            }
        }
    }

    /// Parse a `vVERSION[,DATE]` revision line.
    fn parse_header_revision(&mut self, line: &str) -> bool {
        if !line.starts_with('v') {
            return false;
        }
        match line.find(',') {
            Some(idx) => {
                self.rev_number = line[1..idx].to_string();
                self.rev_date = line[idx + 1..].trim().to_string();
                self.rev_separator = ",".to_string();
            }
            None => self.rev_number = line[1..].to_string(),
        }
        true
    }

    /// Parse a `:key: value` attribute line into the document attribute map.
    ///
    /// The key must start with an alphanumeric or `_` and continue with
    /// alphanumerics, `_`, or `-`. In strict mode any other character makes
    /// the line invalid; otherwise stray characters are skipped.
    fn parse_attribute(&mut self, line: &str, strict: bool) -> bool {
        let bytes = line.as_bytes();
        let Some(&first) = bytes.get(1) else {
            return false;
        };
        if !(first.is_ascii_alphanumeric() || first == b'_') {
            return false;
        }
        let mut key = String::with_capacity(line.len());
        key.push(first as char);
        let mut x = 2;
        while x < bytes.len() {
            let b = bytes[x];
            if b == b':' {
                break;
            }
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
                key.push(b as char);
                x += 1;
                continue;
            }
            if strict {
                return false;
            }
            x += 1;
        }
        if x == bytes.len() {
            return false;
        }
        let value = line[x + 1..].trim();
        self.attributes.insert(key, value.to_string());
        true
    }

    // ── Body ─────────────────────────────────────────────────────────

    /// The central dispatch loop.
    ///
    /// `pending` is a line already fetched but not consumed; `term` is the
    /// delimiter kind that ends this (sub-)body, and `root` the node that
    /// bounds section-ancestor walks.
    fn parse_body(&mut self, mut pending: Option<&'src str>, term: Option<LineKind>, root: NodeId) {
        loop {
            let l = match pending.take() {
                Some(l) if !l.is_empty() => l,
                _ => match self.next_line() {
                    Some(l) => l,
                    None => break,
                },
            };

            if term == Some(self.kind) {
                break;
            }

            match self.kind {
                LineKind::Empty => {
                    if self.current.kind != NodeKind::Unknown {
                        self.terminate_current();
                    }
                }
                LineKind::BlockComment => self.skip_comment_block(),
                LineKind::Comment => {}
                LineKind::Attribute => {
                    if self.parse_attribute(l, true) {
                        self.terminate_current();
                    } else if self.current.kind != NodeKind::Unknown {
                        self.current.raw.push_str(l);
                    }
                }
                LineKind::Style => {
                    let style = parse_style(l);
                    if !style.is_none() {
                        self.current.style |= style;
                    }
                    // Unknown style names are consumed and ignored.
                }
                LineKind::StyleClass => self.current.parse_style_class(l),
                LineKind::BlockTitle => self.current.raw_title = l[1..].to_string(),
                LineKind::HorizontalRule => {
                    self.arena
                        .append(self.parent, Node::new(NodeKind::HorizontalRule));
                }
                LineKind::PageBreak => {
                    self.arena
                        .append(self.parent, Node::new(NodeKind::PageBreak));
                }
                LineKind::Text | LineKind::ListContinue => {
                    if self.current.kind == NodeKind::Unknown {
                        self.current.kind = NodeKind::Paragraph;
                        self.current.raw.push_str(l);
                        self.current.raw.push('\n');
                        pending = self.consume_into_current(LineKind::Empty, PARAGRAPH_TERMS);
                        self.terminate_current();
                    } else {
                        self.current.raw.push_str(l);
                    }
                }
                k if k.is_section() => {
                    if self.current.kind != NodeKind::Unknown {
                        self.terminate_current();
                    }
                    self.open_section(l, root);
                }
                LineKind::LiteralParagraph => {
                    self.current.kind = NodeKind::LiteralParagraph;
                    self.current.raw.push_str(l);
                    self.current.raw.push('\n');
                    pending = self.consume_into_current(LineKind::Empty, LITERAL_PARAGRAPH_TERMS);
                    self.terminate_current();
                }
                LineKind::BlockLiteralDelim => {
                    self.current.kind = NodeKind::BlockLiteral;
                    pending = self.consume_into_current(LineKind::BlockLiteralDelim, &[]);
                    self.terminate_current();
                }
                LineKind::BlockLiteralNamed => {
                    self.current.kind = NodeKind::BlockLiteralNamed;
                    pending = self.consume_into_current(LineKind::Empty, &[]);
                    self.terminate_current();
                }
                LineKind::BlockListingDelim => {
                    self.current.kind = NodeKind::BlockListing;
                    pending = self.consume_into_current(LineKind::BlockListingDelim, &[]);
                    self.terminate_current();
                }
                LineKind::BlockOpen | LineKind::BlockExample => {
                    let delim = self.kind;
                    if self.current.kind != NodeKind::Unknown {
                        self.terminate_current();
                    }
                    self.current.kind = if delim == LineKind::BlockOpen {
                        NodeKind::BlockOpen
                    } else {
                        NodeKind::BlockExample
                    };
                    let node = std::mem::take(&mut self.current);
                    let block = self.arena.append(self.parent, node);
                    let saved_parent = self.parent;
                    self.parent = block;
                    self.parse_body(None, Some(delim), block);
                    self.parent = saved_parent;
                }
                LineKind::BlockSidebar => {
                    // The fence is consumed; the enclosed content parses as
                    // ordinary blocks.
                }
                LineKind::BlockImage => {
                    if self.current.kind != NodeKind::Unknown {
                        self.terminate_current();
                    }
                    self.current.kind = NodeKind::BlockImage;
                    if self.current.parse_image(l) {
                        self.terminate_current();
                    } else {
                        pending = self.degrade_to_paragraph();
                    }
                }
                LineKind::BlockVideo => {
                    if self.current.kind != NodeKind::Unknown {
                        self.terminate_current();
                    }
                    self.current.kind = NodeKind::BlockVideo;
                    if self.current.parse_video(l) {
                        self.terminate_current();
                    } else {
                        pending = self.degrade_to_paragraph();
                    }
                }
                LineKind::BlockAudio => {
                    if self.current.kind != NodeKind::Unknown {
                        self.terminate_current();
                    }
                    self.current.kind = NodeKind::BlockAudio;
                    if self.current.parse_block_audio(l) {
                        self.terminate_current();
                    } else {
                        pending = self.degrade_to_paragraph();
                    }
                }
                LineKind::Admonition => {
                    if self.current.kind != NodeKind::Unknown {
                        self.terminate_current();
                    }
                    self.current.kind = NodeKind::Admonition;
                    self.current.parse_line_admonition(l);
                    pending = self.consume_into_current(LineKind::Empty, PARAGRAPH_TERMS);
                    self.terminate_current();
                }
                LineKind::ListOrderedItem => {
                    let parent = self.parent;
                    pending = self.parse_list_ordered(parent, l, term);
                    self.terminate_current();
                }
                LineKind::ListUnorderedItem => {
                    let parent = self.parent;
                    pending = self.parse_list_unordered(parent, l, term);
                    self.terminate_current();
                }
                LineKind::ListDescriptionItem => {
                    let parent = self.parent;
                    pending = self.parse_list_description(parent, l, term);
                    self.terminate_current();
                }
                // Section kinds are handled by the guard arm above.
                _ => {}
            }
        }
        self.terminate_current();
    }

    /// A failed block macro degrades to a paragraph holding the literal line.
    fn degrade_to_paragraph(&mut self) -> Option<&'src str> {
        self.current.kind = NodeKind::Paragraph;
        self.current.raw.push_str(self.raw_line);
        self.current.raw.push('\n');
        let pending = self.consume_into_current(LineKind::Empty, PARAGRAPH_TERMS);
        self.terminate_current();
        pending
    }

    /// Open a section: walk the parent chain to the enclosing section one
    /// level up (or the bounding root), attach, and become the new parent.
    fn open_section(&mut self, line: &str, root: NodeId) {
        let level = self.kind.section_level().unwrap_or(1);
        self.current.kind = match level {
            1 => NodeKind::SectionL1,
            2 => NodeKind::SectionL2,
            3 => NodeKind::SectionL3,
            4 => NodeKind::SectionL4,
            _ => NodeKind::SectionL5,
        };
        self.current.raw.push_str(section_title(line, level));

        let want = level - 1;
        let mut parent = self.parent;
        loop {
            let node = &self.arena[parent];
            let reached = if want == 0 {
                node.kind == NodeKind::DocContent
            } else {
                node.kind.section_level() == Some(want)
            };
            if reached || parent == root {
                break;
            }
            match node.parent {
                Some(p) => parent = p,
                None => {
                    parent = root;
                    break;
                }
            }
        }
        let node = std::mem::take(&mut self.current);
        let id = self.arena.append(parent, node);
        self.parent = id;
    }

    /// Attach the staging node to the current parent if it was opened, and
    /// reset the staging node.
    fn terminate_current(&mut self) {
        let node = std::mem::take(&mut self.current);
        if node.kind != NodeKind::Unknown {
            self.arena.append(self.parent, node);
        }
    }

    /// Accumulate raw lines until `term` (consumed) or one of `terms`
    /// (returned unconsumed). Comments are skipped. Returns `None` at end of
    /// input or when the terminator was consumed.
    fn consume_lines_until(
        &mut self,
        raw: &mut String,
        term: LineKind,
        terms: &[LineKind],
    ) -> Option<&'src str> {
        loop {
            let l = self.next_line()?;
            if self.kind == LineKind::BlockComment {
                self.skip_comment_block();
                continue;
            }
            if self.kind == LineKind::Comment {
                continue;
            }
            if self.kind == term {
                return None;
            }
            if terms.contains(&self.kind) {
                return Some(l);
            }
            raw.push_str(self.raw_line);
            raw.push('\n');
        }
    }

    /// [`consume_lines_until`](Self::consume_lines_until) into the staging
    /// node.
    fn consume_into_current(&mut self, term: LineKind, terms: &[LineKind]) -> Option<&'src str> {
        let mut raw = std::mem::take(&mut self.current.raw);
        let pending = self.consume_lines_until(&mut raw, term, terms);
        self.current.raw = raw;
        pending
    }

    /// Skip a `////` comment block up to its closing fence or end of input.
    fn skip_comment_block(&mut self) {
        while let Some(line) = self.source.next_line() {
            if line.starts_with("////") {
                return;
            }
        }
    }

    // ── Lists ────────────────────────────────────────────────────────

    /// Whether any node on the parent chain starting at `from` is a list
    /// item of the given kind and level.
    fn has_ancestor(&self, from: NodeId, kind: NodeKind, level: i32) -> bool {
        let mut cur = Some(from);
        while let Some(id) = cur {
            let node = &self.arena[id];
            if node.kind == kind && node.level == level {
                return true;
            }
            cur = node.parent;
        }
        false
    }

    /// Shared non-list-line handling for the three list parsers.
    ///
    /// Returns `Some(line)` when the list ends at this line (unconsumed),
    /// `None` when the line was absorbed into the current item.
    fn list_absorb_or_end(&mut self, item: NodeId, l: &'src str) -> Option<&'src str> {
        match self.kind {
            LineKind::Text | LineKind::Admonition | LineKind::BlockExample => {
                if self.prev_kind == LineKind::Empty {
                    return Some(l);
                }
            }
            k if k.is_section() => {
                if self.prev_kind == LineKind::Empty {
                    return Some(l);
                }
            }
            LineKind::BlockListingDelim => return Some(l),
            _ => {}
        }
        let node = &mut self.arena[item];
        node.raw.push_str(l.trim());
        node.raw.push('\n');
        None
    }

    /// Attach a named literal block (`[literal]` inside a list) to the
    /// current item.
    fn list_literal_named(&mut self, item: NodeId) -> Option<&'src str> {
        let mut node = Node::new(NodeKind::BlockLiteralNamed);
        let pending = self.consume_lines_until(
            &mut node.raw,
            LineKind::Empty,
            &[LineKind::ListOrderedItem, LineKind::ListUnorderedItem],
        );
        let id = self.arena.alloc(node);
        self.arena.add_child(item, id);
        pending
    }

    /// Parse an ordered list starting at `line`, attaching the container to
    /// `parent`. Returns the first line that is not part of the list.
    fn parse_list_ordered(
        &mut self,
        parent: NodeId,
        line: &'src str,
        term: Option<LineKind>,
    ) -> Option<&'src str> {
        let mut list = Node::new(NodeKind::ListOrdered);
        list.raw_title = self.current.raw_title.clone();
        let mut first = Node::new(NodeKind::ListOrderedItem);
        first.parse_list_ordered(line);
        list.level = first.level;
        let list_id = self.arena.append(parent, list);
        let mut item_id = self.arena.append(list_id, first);

        let mut pending: Option<&'src str> = None;
        loop {
            let l = match pending.take() {
                Some(l) if !l.is_empty() => l,
                _ => match self.next_line() {
                    Some(l) => l,
                    None => break,
                },
            };
            if term == Some(self.kind) {
                return Some(l);
            }
            match self.kind {
                LineKind::BlockComment => self.skip_comment_block(),
                LineKind::Comment => {}
                LineKind::ListContinue => {
                    let (node, ret) = self.parse_list_block(term);
                    if let Some(node) = node {
                        let id = self.arena.alloc(node);
                        self.arena.add_child(item_id, id);
                    }
                    pending = ret;
                }
                LineKind::Empty => {
                    // Keep going; the next line may continue the list.
                }
                LineKind::ListOrderedItem => {
                    let mut node = Node::new(NodeKind::ListOrderedItem);
                    node.parse_list_ordered(l);
                    if self.arena[item_id].level == node.level {
                        let id = self.arena.alloc(node);
                        self.arena.add_child(list_id, id);
                        item_id = id;
                    } else if self.has_ancestor(parent, NodeKind::ListOrderedItem, node.level) {
                        // An enclosing list owns this item.
                        return Some(l);
                    } else {
                        pending = self.parse_list_ordered(item_id, l, term);
                    }
                }
                LineKind::ListUnorderedItem => {
                    let mut probe = Node::new(NodeKind::ListUnorderedItem);
                    probe.parse_list_unordered(l);
                    if self.has_ancestor(parent, NodeKind::ListUnorderedItem, probe.level) {
                        return Some(l);
                    }
                    pending = self.parse_list_unordered(item_id, l, term);
                }
                LineKind::ListDescriptionItem => {
                    let mut probe = Node::new(NodeKind::ListDescriptionItem);
                    probe.parse_list_description(l);
                    if self.has_ancestor(parent, NodeKind::ListDescriptionItem, probe.level) {
                        return Some(l);
                    }
                    pending = self.parse_list_description(item_id, l, term);
                }
                LineKind::BlockLiteralNamed => {
                    if self.prev_kind == LineKind::Empty {
                        return Some(l);
                    }
                    pending = self.list_literal_named(item_id);
                }
                _ => {
                    if let Some(l) = self.list_absorb_or_end(item_id, l) {
                        return Some(l);
                    }
                }
            }
        }
        None
    }

    /// Parse an unordered list starting at `line`.
    fn parse_list_unordered(
        &mut self,
        parent: NodeId,
        line: &'src str,
        term: Option<LineKind>,
    ) -> Option<&'src str> {
        let mut list = Node::new(NodeKind::ListUnordered);
        list.raw_title = self.current.raw_title.clone();
        let mut first = Node::new(NodeKind::ListUnorderedItem);
        first.parse_list_unordered(line);
        list.level = first.level;
        let list_id = self.arena.append(parent, list);
        let mut item_id = self.arena.append(list_id, first);

        let mut pending: Option<&'src str> = None;
        loop {
            let l = match pending.take() {
                Some(l) if !l.is_empty() => l,
                _ => match self.next_line() {
                    Some(l) => l,
                    None => break,
                },
            };
            if term == Some(self.kind) {
                return Some(l);
            }
            match self.kind {
                LineKind::BlockComment => self.skip_comment_block(),
                LineKind::Comment => {}
                LineKind::ListContinue => {
                    let (node, ret) = self.parse_list_block(term);
                    if let Some(node) = node {
                        let id = self.arena.alloc(node);
                        self.arena.add_child(item_id, id);
                    }
                    pending = ret;
                }
                LineKind::Empty => {}
                LineKind::ListOrderedItem => {
                    let mut probe = Node::new(NodeKind::ListOrderedItem);
                    probe.parse_list_ordered(l);
                    if self.has_ancestor(parent, NodeKind::ListOrderedItem, probe.level) {
                        return Some(l);
                    }
                    pending = self.parse_list_ordered(item_id, l, term);
                }
                LineKind::ListUnorderedItem => {
                    let mut node = Node::new(NodeKind::ListUnorderedItem);
                    node.parse_list_unordered(l);
                    if self.arena[item_id].level == node.level {
                        let id = self.arena.alloc(node);
                        self.arena.add_child(list_id, id);
                        item_id = id;
                    } else if self.has_ancestor(parent, NodeKind::ListUnorderedItem, node.level) {
                        return Some(l);
                    } else {
                        pending = self.parse_list_unordered(item_id, l, term);
                    }
                }
                LineKind::ListDescriptionItem => {
                    let mut probe = Node::new(NodeKind::ListDescriptionItem);
                    probe.parse_list_description(l);
                    if self.has_ancestor(parent, NodeKind::ListDescriptionItem, probe.level) {
                        return Some(l);
                    }
                    pending = self.parse_list_description(item_id, l, term);
                }
                LineKind::BlockLiteralNamed => {
                    if self.prev_kind == LineKind::Empty {
                        return Some(l);
                    }
                    pending = self.list_literal_named(item_id);
                }
                _ => {
                    if let Some(l) = self.list_absorb_or_end(item_id, l) {
                        return Some(l);
                    }
                }
            }
        }
        None
    }

    /// Parse a description list starting at `line`.
    fn parse_list_description(
        &mut self,
        parent: NodeId,
        line: &'src str,
        term: Option<LineKind>,
    ) -> Option<&'src str> {
        let mut list = Node::new(NodeKind::ListDescription);
        list.raw_title = self.current.raw_title.clone();
        list.style = self.current.style;
        let mut first = Node::new(NodeKind::ListDescriptionItem);
        first.style = list.style;
        first.parse_list_description(line);
        list.level = first.level;
        let list_id = self.arena.append(parent, list);
        let mut item_id = self.arena.append(list_id, first);

        let mut pending: Option<&'src str> = None;
        loop {
            let l = match pending.take() {
                Some(l) if !l.is_empty() => l,
                _ => match self.next_line() {
                    Some(l) => l,
                    None => break,
                },
            };
            if term == Some(self.kind) {
                return Some(l);
            }
            match self.kind {
                LineKind::BlockComment => self.skip_comment_block(),
                LineKind::Comment => {}
                LineKind::ListContinue => {
                    let (node, ret) = self.parse_list_block(term);
                    if let Some(node) = node {
                        let id = self.arena.alloc(node);
                        self.arena.add_child(item_id, id);
                    }
                    pending = ret;
                }
                LineKind::Empty => {}
                LineKind::ListOrderedItem => {
                    pending = self.parse_list_ordered(item_id, l, term);
                }
                LineKind::ListUnorderedItem => {
                    pending = self.parse_list_unordered(item_id, l, term);
                }
                LineKind::ListDescriptionItem => {
                    let mut node = Node::new(NodeKind::ListDescriptionItem);
                    node.style = self.arena[list_id].style;
                    node.parse_list_description(l);
                    if self.arena[item_id].level == node.level {
                        let id = self.arena.alloc(node);
                        self.arena.add_child(list_id, id);
                        item_id = id;
                    } else if self.has_ancestor(parent, NodeKind::ListDescriptionItem, node.level) {
                        return Some(l);
                    } else {
                        pending = self.parse_list_description(item_id, l, term);
                    }
                }
                LineKind::BlockLiteralNamed => {
                    if self.prev_kind == LineKind::Empty {
                        return Some(l);
                    }
                    pending = self.list_literal_named(item_id);
                }
                _ => {
                    if let Some(l) = self.list_absorb_or_end(item_id, l) {
                        return Some(l);
                    }
                }
            }
        }
        None
    }

    /// Parse exactly one block after a `+` list continuation.
    ///
    /// Returns the constructed node (if any) and the first unconsumed line.
    fn parse_list_block(&mut self, term: Option<LineKind>) -> (Option<Node>, Option<&'src str>) {
        let mut node: Option<Node> = None;
        let mut pending: Option<&'src str> = None;
        loop {
            let Some(l) = self.next_line() else {
                break;
            };
            if term == Some(self.kind) {
                return (node, Some(l));
            }
            match self.kind {
                LineKind::BlockComment => self.skip_comment_block(),
                LineKind::Comment => {}
                LineKind::Empty => return (node, None),
                LineKind::ListContinue => {}
                LineKind::LiteralParagraph => {
                    let mut n = Node::new(NodeKind::LiteralParagraph);
                    n.raw.push_str(l);
                    n.raw.push('\n');
                    pending = self.consume_lines_until(
                        &mut n.raw,
                        LineKind::Empty,
                        &[
                            LineKind::ListContinue,
                            LineKind::ListOrderedItem,
                            LineKind::ListUnorderedItem,
                        ],
                    );
                    node = Some(n);
                    break;
                }
                LineKind::Text => {
                    let mut n = Node::new(NodeKind::Paragraph);
                    n.raw.push_str(l);
                    n.raw.push('\n');
                    pending = self.consume_lines_until(
                        &mut n.raw,
                        LineKind::Empty,
                        &[
                            LineKind::ListContinue,
                            LineKind::ListOrderedItem,
                            LineKind::ListUnorderedItem,
                            LineKind::ListDescriptionItem,
                        ],
                    );
                    node = Some(n);
                    break;
                }
                LineKind::Admonition => {
                    let mut n = Node::new(NodeKind::Admonition);
                    n.parse_line_admonition(l);
                    pending = self.consume_lines_until(
                        &mut n.raw,
                        LineKind::Empty,
                        &[
                            LineKind::ListContinue,
                            LineKind::ListOrderedItem,
                            LineKind::ListUnorderedItem,
                            LineKind::ListDescriptionItem,
                        ],
                    );
                    node = Some(n);
                    break;
                }
                LineKind::BlockListingDelim => {
                    let mut n = Node::new(NodeKind::BlockListing);
                    self.consume_lines_until(&mut n.raw, LineKind::BlockListingDelim, &[]);
                    node = Some(n);
                    break;
                }
                LineKind::ListOrderedItem
                | LineKind::ListUnorderedItem
                | LineKind::ListDescriptionItem => {
                    pending = Some(l);
                    break;
                }
                _ => {}
            }
        }
        (node, pending)
    }
}

/// A document title line: `=` or `#`, then a space or tab.
fn is_title(line: &str) -> bool {
    let bytes = line.as_bytes();
    matches!(bytes.first(), Some(&b'=' | &b'#')) && matches!(bytes.get(1), Some(&b' ' | &b'\t'))
}

/// Section title text: the line minus exactly `level + 1` markers and the
/// whitespace after them, so `== =a` keeps its leading `=`.
fn section_title(line: &str, level: i32) -> &str {
    let markers = (level + 1) as usize;
    line[markers.min(line.len())..].trim_start_matches([' ', '\t'])
}
