//! Block style flags and block-attribute parsing.
//!
//! A `[name,…]` line ahead of a block sets style flags on the node that opens
//! next; flags are additive across consecutive style lines. The bracketed
//! attribute list used by block macros (`[a=2,b="c, d",e]`) is a small
//! grammar of its own — quoted values may contain commas and spaces — and is
//! parsed with chumsky combinators.

use chumsky::{extra, prelude::*};
use serde::Serialize;

/// A bitset of style tokens parsed from `[name]` lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Style(u32);

impl Style {
    /// No style.
    pub const NONE: Style = Style(0);
    /// `[colophon]` section style.
    pub const SECTION_COLOPHON: Style = Style(1);
    /// `[abstract]` section style.
    pub const SECTION_ABSTRACT: Style = Style(1 << 1);
    /// `[preface]` section style.
    pub const SECTION_PREFACE: Style = Style(1 << 2);
    /// `[dedication]` section style.
    pub const SECTION_DEDICATION: Style = Style(1 << 3);
    /// `[partintro]` section style.
    pub const SECTION_PART_INTRODUCTION: Style = Style(1 << 4);
    /// `[appendix]` section style.
    pub const SECTION_APPENDIX: Style = Style(1 << 5);
    /// `[glossary]` section style.
    pub const SECTION_GLOSSARY: Style = Style(1 << 6);
    /// `[bibliography]` section style.
    pub const SECTION_BIBLIOGRAPHY: Style = Style(1 << 7);
    /// `[index]` section style.
    pub const SECTION_INDEX: Style = Style(1 << 8);
    /// `.lead` paragraph style.
    pub const PARAGRAPH_LEAD: Style = Style(1 << 9);
    /// `.normal` paragraph style.
    pub const PARAGRAPH_NORMAL: Style = Style(1 << 10);
    /// `[arabic]` ordered-list numbering.
    pub const NUMBERING_ARABIC: Style = Style(1 << 11);
    /// `[decimal]` ordered-list numbering.
    pub const NUMBERING_DECIMAL: Style = Style(1 << 12);
    /// `[loweralpha]` ordered-list numbering.
    pub const NUMBERING_LOWERALPHA: Style = Style(1 << 13);
    /// `[upperalpha]` ordered-list numbering.
    pub const NUMBERING_UPPERALPHA: Style = Style(1 << 14);
    /// `[lowerroman]` ordered-list numbering.
    pub const NUMBERING_LOWERROMAN: Style = Style(1 << 15);
    /// `[upperroman]` ordered-list numbering.
    pub const NUMBERING_UPPERROMAN: Style = Style(1 << 16);
    /// `[lowergreek]` ordered-list numbering.
    pub const NUMBERING_LOWERGREEK: Style = Style(1 << 17);
    /// `[horizontal]` description-list layout.
    pub const DESCRIPTION_HORIZONTAL: Style = Style(1 << 18);
    /// `[qanda]` description-list layout.
    pub const DESCRIPTION_QANDA: Style = Style(1 << 19);
    /// `[NOTE]`-style admonition label.
    pub const ADMONITION: Style = Style(1 << 20);
    /// `[listing]` block style.
    pub const BLOCK_LISTING: Style = Style(1 << 21);

    /// Returns `true` if any flag of `other` is set in `self`.
    #[must_use]
    pub fn contains(self, other: Style) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if no flag is set.
    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Style {
    type Output = Style;

    fn bitor(self, rhs: Style) -> Style {
        Style(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Style {
    fn bitor_assign(&mut self, rhs: Style) {
        self.0 |= rhs.0;
    }
}

/// Parse a `[name,…]` style line into its flag.
///
/// Admonition labels are matched case-sensitively; everything else matches
/// lowercased. Unknown names yield [`Style::NONE`].
#[must_use]
pub fn parse_style(line: &str) -> Style {
    let inner = line.trim_matches(['[', ']']);
    let name = inner.split(',').next().unwrap_or(inner).trim_matches('"');
    let style = style_for(name);
    if !style.is_none() {
        return style;
    }
    style_for(&name.to_lowercase())
}

fn style_for(name: &str) -> Style {
    match name {
        "colophon" => Style::SECTION_COLOPHON,
        "abstract" => Style::SECTION_ABSTRACT,
        "preface" => Style::SECTION_PREFACE,
        "dedication" => Style::SECTION_DEDICATION,
        "partintro" => Style::SECTION_PART_INTRODUCTION,
        "appendix" => Style::SECTION_APPENDIX,
        "glossary" => Style::SECTION_GLOSSARY,
        "bibliography" => Style::SECTION_BIBLIOGRAPHY,
        "index" => Style::SECTION_INDEX,
        ".lead" => Style::PARAGRAPH_LEAD,
        ".normal" => Style::PARAGRAPH_NORMAL,
        "arabic" => Style::NUMBERING_ARABIC,
        "decimal" => Style::NUMBERING_DECIMAL,
        "loweralpha" => Style::NUMBERING_LOWERALPHA,
        "upperalpha" => Style::NUMBERING_UPPERALPHA,
        "lowerroman" => Style::NUMBERING_LOWERROMAN,
        "upperroman" => Style::NUMBERING_UPPERROMAN,
        "lowergreek" => Style::NUMBERING_LOWERGREEK,
        "horizontal" => Style::DESCRIPTION_HORIZONTAL,
        "qanda" => Style::DESCRIPTION_QANDA,
        "CAUTION" | "IMPORTANT" | "NOTE" | "TIP" | "WARNING" => Style::ADMONITION,
        "listing" => Style::BLOCK_LISTING,
        _ => Style::NONE,
    }
}

/// One parsed attribute-list entry: a name, optionally with a value.
pub type AttrEntry<'a> = (&'a str, Option<&'a str>);

/// Parse a bracketed block-attribute list, e.g. `[a=2,b="c, d",e]`.
///
/// Values wrapped in double quotes may contain commas and spaces; the quotes
/// are removed and surrounding whitespace trimmed. Returns `None` when the
/// input is not a well-formed `[…]` list.
#[must_use]
pub fn parse_block_attribute(input: &str) -> Option<Vec<AttrEntry<'_>>> {
    let entries = attrlist().parse(input).into_output()?;
    Some(
        entries
            .into_iter()
            .filter(|(name, value)| !name.is_empty() || value.is_some())
            .collect(),
    )
}

/// The attrlist grammar: `[` entries separated by `,` `]`, where an entry is
/// a bare name or `name=value` with an optionally quoted value.
fn attrlist<'src>() -> impl Parser<'src, &'src str, Vec<AttrEntry<'src>>, extra::Default> {
    let name = none_of("=,]\"").repeated().to_slice().map(str::trim);

    let quoted = one_of(" \t")
        .repeated()
        .ignore_then(
            none_of("\"")
                .repeated()
                .to_slice()
                .map(str::trim)
                .delimited_by(just('"'), just('"')),
        )
        .then_ignore(one_of(" \t").repeated());

    let bare = none_of(",]\"").repeated().to_slice().map(str::trim);

    let value = just('=').ignore_then(choice((quoted, bare)));

    let entry = name.then(value.or_not());

    entry
        .separated_by(just(','))
        .collect::<Vec<_>>()
        .delimited_by(just('['), just(']'))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_style ──────────────────────────────────────────────────

    #[test]
    fn style_known_names() {
        assert_eq!(parse_style("[horizontal]"), Style::DESCRIPTION_HORIZONTAL);
        assert_eq!(parse_style("[qanda]"), Style::DESCRIPTION_QANDA);
        assert_eq!(parse_style("[appendix]"), Style::SECTION_APPENDIX);
        assert_eq!(parse_style("[listing]"), Style::BLOCK_LISTING);
    }

    #[test]
    fn style_case_folding() {
        // Non-admonition names fold to lowercase.
        assert_eq!(parse_style("[HORIZONTAL]"), Style::DESCRIPTION_HORIZONTAL);
        // Admonition labels match uppercase only.
        assert_eq!(parse_style("[NOTE]"), Style::ADMONITION);
        assert_eq!(parse_style("[note]"), Style::NONE);
    }

    #[test]
    fn style_unknown_is_none() {
        assert_eq!(parse_style("[source,rust]"), Style::NONE);
        assert_eq!(parse_style("[]"), Style::NONE);
    }

    #[test]
    fn style_first_element_only() {
        assert_eq!(
            parse_style("[horizontal,extra]"),
            Style::DESCRIPTION_HORIZONTAL
        );
        assert_eq!(parse_style("[\"qanda\"]"), Style::DESCRIPTION_QANDA);
    }

    #[test]
    fn style_flags_combine() {
        let mut s = Style::NONE;
        s |= Style::DESCRIPTION_HORIZONTAL;
        s |= Style::ADMONITION;
        assert!(s.contains(Style::DESCRIPTION_HORIZONTAL));
        assert!(s.contains(Style::ADMONITION));
        assert!(!s.contains(Style::DESCRIPTION_QANDA));
    }

    // ── parse_block_attribute ────────────────────────────────────────

    #[test]
    fn attrlist_rejects_non_bracketed() {
        assert_eq!(parse_block_attribute(""), None);
        assert_eq!(parse_block_attribute("a=2"), None);
    }

    #[test]
    fn attrlist_empty() {
        assert_eq!(parse_block_attribute("[]"), Some(vec![]));
    }

    #[test]
    fn attrlist_bare_name() {
        assert_eq!(parse_block_attribute("[a]"), Some(vec![("a", None)]));
    }

    #[test]
    fn attrlist_name_value() {
        assert_eq!(parse_block_attribute("[a=2]"), Some(vec![("a", Some("2"))]));
    }

    #[test]
    fn attrlist_quoted_value_keeps_commas() {
        assert_eq!(
            parse_block_attribute(r#"[a=2,b="c, d",e,f=3]"#),
            Some(vec![
                ("a", Some("2")),
                ("b", Some("c, d")),
                ("e", None),
                ("f", Some("3")),
            ])
        );
    }

    #[test]
    fn attrlist_trims_whitespace() {
        assert_eq!(
            parse_block_attribute("[ a = 2 , b ]"),
            Some(vec![("a", Some("2")), ("b", None)])
        );
    }

    #[test]
    fn attrlist_skips_empty_entries() {
        assert_eq!(
            parse_block_attribute("[a,,b]"),
            Some(vec![("a", None), ("b", None)])
        );
    }
}
