//! The document tree: arena storage, the node model, and node-level
//! sub-parsers.
//!
//! Nodes live in a flat arena and reference each other through
//! first-child/next-sibling links, which keeps the cyclic
//! parent/child/sibling structure free of ownership cycles. A `last_child`
//! back-link makes appending O(1).

use std::collections::HashMap;

use serde::Serialize;
use url::Url;

use crate::style::{parse_block_attribute, Style};

pub(crate) const ATTR_END: &str = "end";
pub(crate) const ATTR_HEIGHT: &str = "height";
pub(crate) const ATTR_LANG: &str = "lang";
pub(crate) const ATTR_OPTIONS: &str = "options";
pub(crate) const ATTR_POSTER: &str = "poster";
pub(crate) const ATTR_SRC: &str = "src";
pub(crate) const ATTR_START: &str = "start";
pub(crate) const ATTR_THEME: &str = "theme";
pub(crate) const ATTR_VIMEO: &str = "vimeo";
pub(crate) const ATTR_WIDTH: &str = "width";
pub(crate) const ATTR_YOUTUBE: &str = "youtube";
pub(crate) const ATTR_YOUTUBE_LANG: &str = "hl";

pub(crate) const OPT_AUTOPLAY: &str = "autoplay";
pub(crate) const OPT_CONTROLS: &str = "controls";
pub(crate) const OPT_LOOP: &str = "loop";
pub(crate) const OPT_NOCONTROLS: &str = "nocontrols";
pub(crate) const OPT_FULLSCREEN: &str = "fs";
pub(crate) const OPT_MODEST: &str = "modest";
pub(crate) const OPT_MODESTBRANDING: &str = "modestbranding";
pub(crate) const OPT_NOFULLSCREEN: &str = "nofullscreen";
pub(crate) const OPT_PLAYLIST: &str = "playlist";

/// The kind of a document-tree node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    /// A node that has been created but not yet given a kind. Never appears
    /// in a finished tree.
    #[default]
    Unknown,
    /// Wrapper holding the document title.
    DocHeader,
    /// Wrapper for body content before the first section.
    Preamble,
    /// The content root.
    DocContent,
    /// `== ` section.
    SectionL1,
    /// `=== ` section.
    SectionL2,
    /// `==== ` section.
    SectionL3,
    /// `===== ` section.
    SectionL4,
    /// `====== ` section.
    SectionL5,
    /// A plain paragraph.
    Paragraph,
    /// An indented literal paragraph.
    LiteralParagraph,
    /// A `NOTE: …` admonition.
    Admonition,
    /// An `audio::` block macro.
    BlockAudio,
    /// An `image::` block macro.
    BlockImage,
    /// A `----`-delimited listing block.
    BlockListing,
    /// A `....`-delimited literal block.
    BlockLiteral,
    /// A `[literal]`-opened literal block.
    BlockLiteralNamed,
    /// A `--`-delimited open block (recursive container).
    BlockOpen,
    /// A `====`-delimited example block (recursive container).
    BlockExample,
    /// A `video::` block macro.
    BlockVideo,
    /// Ordered-list container.
    ListOrdered,
    /// Ordered-list item.
    ListOrderedItem,
    /// Unordered-list container.
    ListUnordered,
    /// Unordered-list item.
    ListUnorderedItem,
    /// Description-list container.
    ListDescription,
    /// Description-list item.
    ListDescriptionItem,
    /// A horizontal rule.
    HorizontalRule,
    /// A page break.
    PageBreak,
}

impl NodeKind {
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
}

/// Index of a node in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

/// A single node of the document tree.
///
/// One wide struct covers every kind; fields that do not apply to a kind
/// stay at their defaults. This mirrors the homogeneous traversal the HTML
/// backend performs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Node {
    /// The node kind.
    pub kind: NodeKind,
    /// List nesting depth: the number of `.`/`*` markers, or the
    /// colon-derived depth for description lists (`::` is depth 0).
    pub level: i32,
    /// Accumulated unparsed payload; may span many lines.
    pub raw: String,
    /// Description-list term, or the capitalized admonition label.
    pub raw_term: String,
    /// Block title from a preceding `.Title` line.
    pub raw_title: String,
    /// Style flags from `[name]` lines.
    pub style: Style,
    /// CSS class names from `[.x.y]` lines and positional image attributes.
    pub classes: Vec<String>,
    /// Image alternative text.
    pub alt: String,
    /// Image or video width.
    pub width: String,
    /// Image or video height.
    pub height: String,
    /// Named attributes for audio/video macros.
    pub attrs: HashMap<String, String>,
    /// Option tokens for audio macros, mapped to `"1"`/`"0"`.
    pub opts: HashMap<String, String>,
    /// Parent link.
    pub parent: Option<NodeId>,
    /// First child link.
    pub first_child: Option<NodeId>,
    /// Last child link; keeps appending O(1).
    pub last_child: Option<NodeId>,
    /// Next sibling link.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling link.
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    /// Create a node of the given kind with every other field empty.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    // ── Node-level sub-parsers ───────────────────────────────────────

    /// Parse an ordered-list item line: count `.` markers into `level`, then
    /// take the rest of the line as the first raw line.
    pub fn parse_list_ordered(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let mut x = 0;
        while x < bytes.len() {
            if bytes[x] == b'.' {
                self.level += 1;
                x += 1;
                continue;
            }
            if bytes[x] == b' ' || bytes[x] == b'\t' {
                break;
            }
            x += 1;
        }
        while x < bytes.len() && (bytes[x] == b' ' || bytes[x] == b'\t') {
            x += 1;
        }
        self.raw.push_str(&line[x..]);
        self.raw.push('\n');
    }

    /// Parse an unordered-list item line: count `*` markers into `level`.
    pub fn parse_list_unordered(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let mut x = 0;
        while x < bytes.len() {
            if bytes[x] == b'*' {
                self.level += 1;
                x += 1;
                continue;
            }
            if bytes[x] == b' ' || bytes[x] == b'\t' {
                break;
            }
            x += 1;
        }
        while x < bytes.len() && (bytes[x] == b' ' || bytes[x] == b'\t') {
            x += 1;
        }
        self.raw.push_str(&line[x..]);
        self.raw.push('\n');
    }

    /// Parse a description-list item line: the term before the colons, the
    /// colon run as depth (`::` is depth 0), and the rest as the body.
    pub fn parse_list_description(&mut self, line: &str) {
        let colon = line.find(':').unwrap_or(line.len());
        self.raw_term.push_str(&line[..colon]);
        let line = &line[colon..];
        let bytes = line.as_bytes();
        let mut x = 0;
        while x < bytes.len() {
            if bytes[x] == b':' {
                self.level += 1;
                x += 1;
                continue;
            }
            break;
        }
        self.level -= 2;
        let rest = if x + 1 < bytes.len() { &line[x..] } else { "" };
        self.raw.push_str(rest.trim_start_matches([' ', '\t']));
    }

    /// Parse an `image::` macro tail `target[attrs]`.
    ///
    /// Positional attributes are alt, width, height; named `float`/`align`/
    /// `role` attributes become classes (`center` maps to `text-center`).
    /// Returns `false` when the attribute brackets are missing or out of
    /// order.
    pub fn parse_image(&mut self, line: &str) -> bool {
        let Some(attr_begin) = line.find('[') else {
            return false;
        };
        let Some(attr_end) = line.find(']') else {
            return false;
        };
        if attr_end < attr_begin {
            return false;
        }
        let name = line[..attr_begin].trim_end_matches([' ', '\t']);
        self.raw.push_str(name);

        for (x, attr) in line[attr_begin + 1..attr_end].split(',').enumerate() {
            match x {
                0 => {
                    self.alt = attr.trim().to_string();
                    if self.alt.is_empty() {
                        if let Some(dot) = name.find('.') {
                            if dot > 0 {
                                self.alt = name[..dot].to_string();
                            }
                        }
                    }
                }
                1 => self.width = attr.to_string(),
                2 => self.height = attr.to_string(),
                _ => {
                    let Some((key, val)) = attr.split_once('=') else {
                        continue;
                    };
                    let val = val.trim_matches('"');
                    if matches!(key, "float" | "align" | "role") {
                        let val = if val == "center" { "text-center" } else { val };
                        if !val.is_empty() {
                            self.classes.push(val.to_string());
                        }
                    }
                }
            }
        }
        true
    }

    /// Parse a `[.a.b]` style-class line into `classes`.
    pub fn parse_style_class(&mut self, line: &str) {
        let inner = line.trim_matches(['[', ']']);
        for class in inner.split('.') {
            let class = class.trim();
            if !class.is_empty() {
                self.classes.push(class.to_string());
            }
        }
    }

    /// Parse an `audio::` macro tail `target[attrs]`.
    ///
    /// Stores the source under `src` and expands the `options` attribute into
    /// `opts`, with `controls` on by default and `nocontrols` switching it
    /// off.
    pub fn parse_block_audio(&mut self, line: &str) -> bool {
        let Some(attr_begin) = line.find('[') else {
            return false;
        };
        let Some(attr_end) = line.find(']') else {
            return false;
        };
        if attr_end < attr_begin {
            return false;
        }
        let src = line[..attr_begin].trim_end_matches([' ', '\t']);
        self.attrs.insert(ATTR_SRC.to_string(), src.to_string());

        let entries = parse_block_attribute(&line[attr_begin..=attr_end]).unwrap_or_default();
        for (key, val) in entries {
            let key = key.to_lowercase();
            let val = val.unwrap_or("1");
            if key == ATTR_OPTIONS {
                self.attrs.insert(key, val.to_string());
                self.opts.insert(OPT_CONTROLS.to_string(), "1".to_string());
                for opt in val.split(',') {
                    match opt {
                        OPT_NOCONTROLS => {
                            self.opts.insert(OPT_CONTROLS.to_string(), "0".to_string());
                        }
                        OPT_CONTROLS => {
                            self.opts.insert(OPT_CONTROLS.to_string(), "1".to_string());
                        }
                        _ => {
                            self.opts.insert(opt.to_string(), "1".to_string());
                        }
                    }
                }
            }
        }
        true
    }

    /// Parse a `video::` macro tail `target[attrs]`.
    ///
    /// A first attribute of `youtube` or `vimeo` selects the embed service;
    /// `width`/`height` fill the dimension fields; the remaining known
    /// attributes land in `attrs`.
    pub fn parse_video(&mut self, line: &str) -> bool {
        let Some(attr_begin) = line.find('[') else {
            return false;
        };
        let Some(attr_end) = line.find(']') else {
            return false;
        };
        if attr_end < attr_begin {
            return false;
        }
        let src = line[..attr_begin].trim_end_matches([' ', '\t']);
        self.attrs.insert(ATTR_SRC.to_string(), src.to_string());

        let entries = parse_block_attribute(&line[attr_begin..=attr_end]).unwrap_or_default();
        for (x, (key, val)) in entries.into_iter().enumerate() {
            let key = key.to_lowercase();
            let val = val.unwrap_or("1");
            if x == 0 && (key == ATTR_YOUTUBE || key == ATTR_VIMEO) {
                self.attrs.insert(key, val.to_string());
                continue;
            }
            match key.as_str() {
                ATTR_WIDTH => self.width = val.to_string(),
                ATTR_HEIGHT => self.height = val.to_string(),
                ATTR_OPTIONS | ATTR_POSTER | ATTR_START | ATTR_END | ATTR_THEME | ATTR_LANG => {
                    self.attrs.insert(key, val.to_string());
                }
                _ => {}
            }
        }
        true
    }

    /// Parse an admonition line `LABEL: text`: the lowercased label becomes a
    /// class, the capitalized label the term, and the rest the first raw
    /// line.
    pub fn parse_line_admonition(&mut self, line: &str) {
        let Some(sep) = line.find(':') else {
            return;
        };
        let class = line[..sep].to_lowercase();
        self.raw_term.push_str(&capitalize(&class));
        self.classes.push(class);
        self.raw.push_str(line[sep + 1..].trim());
        self.raw.push('\n');
    }

    // ── Render helpers ───────────────────────────────────────────────

    /// The raw payload, trimmed for rendering.
    #[must_use]
    pub fn content(&self) -> &str {
        self.raw.trim()
    }

    /// The block title (may be empty).
    #[must_use]
    pub fn title(&self) -> &str {
        &self.raw_title
    }

    /// The description-list term or admonition label.
    #[must_use]
    pub fn terminology(&self) -> &str {
        &self.raw_term
    }

    /// The class list as `" a b"`, or the empty string when there are none.
    #[must_use]
    pub fn classes(&self) -> String {
        if self.classes.is_empty() {
            return String::new();
        }
        format!(" {}", self.classes.join(" "))
    }

    /// Ordered-list numbering class as a function of nesting depth.
    #[must_use]
    pub fn list_ordered_class(&self) -> &'static str {
        match self.level {
            2 => "loweralpha",
            3 => "lowerroman",
            4 => "upperalpha",
            5 => "upperroman",
            _ => "arabic",
        }
    }

    /// HTML `type=` attribute for ordered lists, empty for arabic.
    #[must_use]
    pub fn list_ordered_type(&self) -> &'static str {
        match self.level {
            2 => "a",
            3 => "i",
            4 => "A",
            5 => "I",
            _ => "",
        }
    }

    /// Whether the `[horizontal]` description-list style is set.
    #[must_use]
    pub fn is_style_horizontal(&self) -> bool {
        self.style.contains(Style::DESCRIPTION_HORIZONTAL)
    }

    /// Whether the `[qanda]` description-list style is set.
    #[must_use]
    pub fn is_style_qanda(&self) -> bool {
        self.style.contains(Style::DESCRIPTION_QANDA)
    }

    /// Compute the embeddable URL for a video node.
    ///
    /// YouTube sources build an `/embed/` URL with `rel=0` plus the
    /// start/end/option/theme/language parameters; Vimeo sources build a
    /// `/video/` URL with an `#at=` fragment for the start offset; direct
    /// sources get a `#t=` media fragment.
    #[must_use]
    pub fn video_source(&self) -> String {
        let src = self.attrs.get(ATTR_SRC).map_or("", String::as_str);
        let opts = self.attrs.get(ATTR_OPTIONS).map_or("", String::as_str);

        if self.attrs.contains_key(ATTR_YOUTUBE) {
            let mut q = vec!["rel=0".to_string()];
            if let Some(v) = self.attrs.get(ATTR_START) {
                q.push(format!("{ATTR_START}={v}"));
            }
            if let Some(v) = self.attrs.get(ATTR_END) {
                q.push(format!("{ATTR_END}={v}"));
            }
            for opt in opts.split(',') {
                match opt.trim() {
                    OPT_AUTOPLAY | OPT_LOOP => q.push(format!("{}=1", opt.trim())),
                    OPT_MODEST => q.push(format!("{OPT_MODESTBRANDING}=1")),
                    OPT_NOCONTROLS => {
                        q.push(format!("{OPT_CONTROLS}=0"));
                        q.push(format!("{OPT_PLAYLIST}={src}"));
                    }
                    OPT_NOFULLSCREEN => q.push(format!("{OPT_FULLSCREEN}=0")),
                    _ => {}
                }
            }
            if let Some(v) = self.attrs.get(ATTR_THEME) {
                q.push(format!("{ATTR_THEME}={v}"));
            }
            if let Some(v) = self.attrs.get(ATTR_LANG) {
                q.push(format!("{ATTR_YOUTUBE_LANG}={v}"));
            }
            let mut u = Url::parse("https://www.youtube.com").expect("static base URL");
            u.set_path(&format!("/embed/{src}"));
            u.set_query(Some(&q.join("&")));
            u.to_string()
        } else if self.attrs.contains_key(ATTR_VIMEO) {
            let mut q = Vec::new();
            for opt in opts.split(',') {
                match opt.trim() {
                    OPT_AUTOPLAY | OPT_LOOP => q.push(format!("{}=1", opt.trim())),
                    _ => {}
                }
            }
            let mut u = Url::parse("https://player.vimeo.com").expect("static base URL");
            u.set_path(&format!("/video/{src}"));
            if !q.is_empty() {
                u.set_query(Some(&q.join("&")));
            }
            if let Some(v) = self.attrs.get(ATTR_START) {
                u.set_fragment(Some(&format!("at={v}")));
            }
            u.to_string()
        } else {
            let fragment = match (self.attrs.get(ATTR_START), self.attrs.get(ATTR_END)) {
                (Some(start), Some(end)) => format!("t={start},{end}"),
                (Some(start), None) => format!("t={start}"),
                (None, Some(end)) => format!("t=0,{end}"),
                (None, None) => String::new(),
            };
            if fragment.is_empty() {
                src.to_string()
            } else {
                format!("{src}#{fragment}")
            }
        }
    }
}

/// Derive a canonical anchor ID from a title.
///
/// Prepends `_`, lowercases, collapses each run of non-letter/non-digit
/// code points to a single `_`, and trims trailing `_`. Idempotent;
/// uniqueness is not enforced.
#[must_use]
pub fn generate_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len() + 1);
    id.push('_');
    for c in text.to_lowercase().chars() {
        if c.is_alphabetic() || c.is_numeric() {
            id.push(c);
        } else if !id.ends_with('_') {
            id.push('_');
        }
    }
    id.trim_end_matches('_').to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Flat storage for the document tree.
#[derive(Debug, Default, Serialize)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes allocated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Store a node, returning its id. The node is not linked anywhere.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Link `child` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self[child].parent = Some(parent);
        self[child].next_sibling = None;
        self[child].prev_sibling = None;
        match self[parent].last_child {
            Some(last) => {
                self[last].next_sibling = Some(child);
                self[child].prev_sibling = Some(last);
            }
            None => self[parent].first_child = Some(child),
        }
        self[parent].last_child = Some(child);
    }

    /// Store a node and link it as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.alloc(node);
        self.add_child(parent, id);
        id
    }

    /// Iterate over the child ids of `id`, in order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut cur = self[id].first_child;
        std::iter::from_fn(move || {
            let c = cur?;
            cur = self[c].next_sibling;
            Some(c)
        })
    }
}

impl std::ops::Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl std::ops::IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Arena links ──────────────────────────────────────────────────

    #[test]
    fn add_child_links_siblings() {
        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::new(NodeKind::DocContent));
        let a = arena.append(root, Node::new(NodeKind::Paragraph));
        let b = arena.append(root, Node::new(NodeKind::Paragraph));
        let c = arena.append(root, Node::new(NodeKind::Paragraph));

        assert_eq!(arena[root].first_child, Some(a));
        assert_eq!(arena[root].last_child, Some(c));
        assert_eq!(arena[a].next_sibling, Some(b));
        assert_eq!(arena[b].prev_sibling, Some(a));
        assert_eq!(arena[b].next_sibling, Some(c));
        assert_eq!(arena[c].prev_sibling, Some(b));
        assert_eq!(arena[c].next_sibling, None);
        assert_eq!(arena[b].parent, Some(root));
        let children: Vec<_> = arena.children(root).collect();
        assert_eq!(children, vec![a, b, c]);
    }

    // ── List item parsing ────────────────────────────────────────────

    #[test]
    fn ordered_marker_counts_level() {
        let mut node = Node::new(NodeKind::ListOrderedItem);
        node.parse_list_ordered(". one");
        assert_eq!(node.level, 1);
        assert_eq!(node.raw, "one\n");

        let mut node = Node::new(NodeKind::ListOrderedItem);
        node.parse_list_ordered("... three\tdeep");
        assert_eq!(node.level, 3);
        assert_eq!(node.raw, "three\tdeep\n");
    }

    #[test]
    fn unordered_marker_counts_level() {
        let mut node = Node::new(NodeKind::ListUnorderedItem);
        node.parse_list_unordered("** item");
        assert_eq!(node.level, 2);
        assert_eq!(node.raw, "item\n");
    }

    #[test]
    fn description_term_and_level() {
        let mut node = Node::new(NodeKind::ListDescriptionItem);
        node.parse_list_description("CPU::");
        assert_eq!(node.level, 0);
        assert_eq!(node.raw_term, "CPU");
        assert_eq!(node.raw, "");

        let mut node = Node::new(NodeKind::ListDescriptionItem);
        node.parse_list_description("CPU:: Fast");
        assert_eq!(node.level, 0);
        assert_eq!(node.raw_term, "CPU");
        assert_eq!(node.raw, "Fast");

        let mut node = Node::new(NodeKind::ListDescriptionItem);
        node.parse_list_description("Deep::: nested");
        assert_eq!(node.level, 1);
        assert_eq!(node.raw_term, "Deep");
        assert_eq!(node.raw, "nested");
    }

    // ── Macro tails ──────────────────────────────────────────────────

    #[test]
    fn image_positional_attributes() {
        let mut node = Node::new(NodeKind::BlockImage);
        assert!(node.parse_image("logo.png[Logo,640,480]"));
        assert_eq!(node.raw, "logo.png");
        assert_eq!(node.alt, "Logo");
        assert_eq!(node.width, "640");
        assert_eq!(node.height, "480");
    }

    #[test]
    fn image_alt_falls_back_to_stem() {
        let mut node = Node::new(NodeKind::BlockImage);
        assert!(node.parse_image("logo.png[]"));
        assert_eq!(node.alt, "logo");
    }

    #[test]
    fn image_role_becomes_class() {
        let mut node = Node::new(NodeKind::BlockImage);
        assert!(node.parse_image("a.png[alt,1,2,align=\"center\",role=thumb]"));
        assert_eq!(node.classes, vec!["text-center", "thumb"]);
    }

    #[test]
    fn image_without_brackets_fails() {
        let mut node = Node::new(NodeKind::BlockImage);
        assert!(!node.parse_image("logo.png"));
        assert!(!node.parse_image("logo]png["));
    }

    #[test]
    fn audio_options_expand() {
        let mut node = Node::new(NodeKind::BlockAudio);
        assert!(node.parse_block_audio("song.mp3[options=\"loop,nocontrols\"]"));
        assert_eq!(node.attrs.get("src").map(String::as_str), Some("song.mp3"));
        assert_eq!(node.opts.get("loop").map(String::as_str), Some("1"));
        assert_eq!(node.opts.get("controls").map(String::as_str), Some("0"));
    }

    #[test]
    fn audio_controls_default_on() {
        let mut node = Node::new(NodeKind::BlockAudio);
        assert!(node.parse_block_audio("song.mp3[options=autoplay]"));
        assert_eq!(node.opts.get("controls").map(String::as_str), Some("1"));
        assert_eq!(node.opts.get("autoplay").map(String::as_str), Some("1"));
    }

    #[test]
    fn video_youtube_dispatch() {
        let mut node = Node::new(NodeKind::BlockVideo);
        assert!(node.parse_video("abc123[youtube,width=640,height=480]"));
        assert!(node.attrs.contains_key("youtube"));
        assert_eq!(node.width, "640");
        assert_eq!(node.height, "480");
    }

    #[test]
    fn admonition_label_split() {
        let mut node = Node::new(NodeKind::Admonition);
        node.parse_line_admonition("NOTE: Remember this.");
        assert_eq!(node.classes, vec!["note"]);
        assert_eq!(node.raw_term, "Note");
        assert_eq!(node.raw, "Remember this.\n");
    }

    // ── Render helpers ───────────────────────────────────────────────

    #[test]
    fn ordered_class_by_level() {
        let mut node = Node::new(NodeKind::ListOrdered);
        node.level = 1;
        assert_eq!(node.list_ordered_class(), "arabic");
        assert_eq!(node.list_ordered_type(), "");
        node.level = 2;
        assert_eq!(node.list_ordered_class(), "loweralpha");
        assert_eq!(node.list_ordered_type(), "a");
        node.level = 5;
        assert_eq!(node.list_ordered_class(), "upperroman");
        assert_eq!(node.list_ordered_type(), "I");
        node.level = 6;
        assert_eq!(node.list_ordered_class(), "arabic");
    }

    #[test]
    fn classes_join_with_leading_space() {
        let mut node = Node::new(NodeKind::Paragraph);
        assert_eq!(node.classes(), "");
        node.classes.push("lead".to_string());
        node.classes.push("center".to_string());
        assert_eq!(node.classes(), " lead center");
    }

    #[test]
    fn content_is_trimmed() {
        let mut node = Node::new(NodeKind::Paragraph);
        node.raw.push_str("  hello\nworld\n");
        assert_eq!(node.content(), "hello\nworld");
    }

    // ── generate_id ──────────────────────────────────────────────────

    #[test]
    fn generate_id_basic() {
        assert_eq!(generate_id("Intro"), "_intro");
        assert_eq!(generate_id("Hello, World!"), "_hello_world");
        assert_eq!(generate_id("A  B"), "_a_b");
    }

    #[test]
    fn generate_id_trims_trailing_underscore() {
        assert_eq!(generate_id("End!"), "_end");
        assert_eq!(generate_id("!!!"), "");
    }

    #[test]
    fn generate_id_idempotent() {
        for s in ["Intro", "Hello, World!", "a-b-c", "Ünïcode Títle", ""] {
            let once = generate_id(s);
            assert_eq!(generate_id(&once), once, "input {s:?}");
        }
    }

    // ── video_source ─────────────────────────────────────────────────

    fn video_node(tail: &str) -> Node {
        let mut node = Node::new(NodeKind::BlockVideo);
        assert!(node.parse_video(tail));
        node
    }

    #[test]
    fn video_source_youtube() {
        let node = video_node("abc123[youtube]");
        assert_eq!(
            node.video_source(),
            "https://www.youtube.com/embed/abc123?rel=0"
        );
    }

    #[test]
    fn video_source_youtube_options() {
        let node = video_node("abc123[youtube,start=60,options=\"autoplay,modest\"]");
        assert_eq!(
            node.video_source(),
            "https://www.youtube.com/embed/abc123?rel=0&start=60&autoplay=1&modestbranding=1"
        );
    }

    #[test]
    fn video_source_vimeo() {
        let node = video_node("900168[vimeo,start=12]");
        assert_eq!(
            node.video_source(),
            "https://player.vimeo.com/video/900168#at=12"
        );
    }

    #[test]
    fn video_source_direct_with_fragment() {
        let node = video_node("movie.mp4[start=5,end=9]");
        assert_eq!(node.video_source(), "movie.mp4#t=5,9");

        let node = video_node("movie.mp4[end=9]");
        assert_eq!(node.video_source(), "movie.mp4#t=0,9");

        let node = video_node("movie.mp4[]");
        assert_eq!(node.video_source(), "movie.mp4");
    }
}
