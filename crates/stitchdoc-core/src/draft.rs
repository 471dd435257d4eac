//! Draft parser
//!
//! Turns AsciiDoc-style text into a [`DraftDocument`]: a flat list of blocks
//! where sections are not nested yet and neither ids nor footnote numbers
//! are assigned. Feed the result to [`assemble`](crate::assemble).
//!
//! # Supported syntax
//!
//! - Sections: `= Title` (level 0) through `====== Title` (level 5)
//! - Anchors and block attributes: `[[id]]`, `[#id.role]`, `[.role]`
//! - Block titles: `.Title`
//! - Attribute entries: `:name: value`, `:name!:`
//! - Block macros: `name::value[attributes]` (including `include::`)
//! - Literal blocks delimited by `....`
//! - Lists: `* unordered`, `. ordered` (repeat the marker to nest)
//! - Admonitions: `NOTE: text`, `TIP:`, `IMPORTANT:`, `WARNING:`, `CAUTION:`
//! - Inline: `*bold*`, `_italic_`, `` `mono` ``, `^super^`, `~sub~`,
//!   `footnote:[text]`, `footnoteref:[name,text]`, `{name}`, URLs with an
//!   optional `[label]`, `name:value[attributes]` inline macros and a
//!   trailing ` +` line break
//!
//! Unknown constructs become paragraph text.
//!
//! # Example
//!
//! ```
//! use stitchdoc_ast::Block;
//! use stitchdoc_core::draft;
//!
//! let draft = draft::parse("= Guide\n:idprefix: g_\n\n== Install\n\nRun it.")?;
//! assert!(matches!(draft.blocks[0], Block::Section(_)));
//! assert_eq!(draft.document_attributes().get("idprefix"), Some("g_"));
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use stitchdoc_ast::{
    Admonition, AdmonitionType, AttributeDeclaration, AttributeReset, Block, DraftDocument,
    ElementAttributes, Footnote, FormatType, Inline, InlineUserMacro, Link, List, ListItem,
    ListType, LiteralBlock, Paragraph, Section, UserMacro, ATTR_ID, ATTR_ROLE, ATTR_TITLE,
};

use crate::location::{parse_location, PLACEHOLDER};

const LITERAL_DELIMITER: &str = "....";

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(={1,6})[ \t]+(\S.*?)\s*$").expect("valid heading pattern"));

static ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\[([A-Za-z_][\w:.-]*)(?:,\s*(.+?))?\]\]\s*$").expect("valid anchor pattern")
});

static BLOCK_ATTRIBUTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\[\]]*)\]\s*$").expect("valid block attributes pattern"));

static BLOCK_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\.([^\s.].*?)\s*$").expect("valid block title pattern"));

static ATTRIBUTE_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:(!)?([A-Za-z0-9_][A-Za-z0-9_-]*)(!)?:(?:[ \t]+(.*?))?\s*$")
        .expect("valid attribute entry pattern")
});

static BLOCK_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)::(\S*?)\[(.*)\]\s*$").expect("valid block macro pattern")
});

static ADMONITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(NOTE|TIP|IMPORTANT|WARNING|CAUTION):[ \t]+(.*)$").expect("valid admonition pattern")
});

static UNORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\*{1,5})[ \t]+(.*)$").expect("valid list pattern"));

static ORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\.{1,5})[ \t]+(.*)$").expect("valid list pattern"));

static SHORTHAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([#.])([^#.]+)").expect("valid shorthand pattern"));

static FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfootnote(ref)?:\[").expect("valid footnote pattern"));

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:https?|ftp|irc)://[^\s\[\]]+").expect("valid url pattern"));

static INLINE_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z][A-Za-z0-9_-]*):([^\s\[\]:]*)\[").expect("valid inline macro pattern")
});

/// Formatting markers, in priority order. Constrained markers only match
/// outside words (`snake_case_name` is not italic).
static FORMATS: Lazy<Vec<(Regex, FormatType, bool)>> = Lazy::new(|| {
    [
        (r"\*([^*\n]+)\*", FormatType::Bold, true),
        (r"_([^_\n]+)_", FormatType::Italic, true),
        (r"`([^`\n]+)`", FormatType::Monospace, true),
        (r"\^([^^\s]+)\^", FormatType::Superscript, false),
        (r"~([^~\s]+)~", FormatType::Subscript, false),
    ]
    .into_iter()
    .map(|(pattern, format, constrained)| {
        (Regex::new(pattern).expect("valid format pattern"), format, constrained)
    })
    .collect()
});

/// What the parser is currently building
#[derive(Debug, Clone, PartialEq)]
enum ParserState {
    /// Between blocks
    Root,
    /// Paragraph lines so far
    Paragraph(ElementAttributes, Vec<Vec<Inline>>),
    /// Admonition paragraph lines so far
    Admonition(AdmonitionType, ElementAttributes, Vec<Vec<Inline>>),
    /// List items so far
    List(ListType, ElementAttributes, Vec<ListItem>),
    /// Inside a `....` block opened at line `start`
    Literal {
        start: usize,
        attributes: ElementAttributes,
        lines: Vec<String>,
    },
}

/// Line-based parser using a state machine
struct Parser {
    blocks: Vec<Block>,
    state: ParserState,
    /// Attributes waiting for the next block
    pending: ElementAttributes,
}

impl Parser {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            state: ParserState::Root,
            pending: ElementAttributes::new(),
        }
    }

    fn parse(mut self, text: &str) -> Result<DraftDocument> {
        let text = text.replace("\r\n", "\n");

        for (index, line) in text.lines().enumerate() {
            self.process_line(index + 1, line);
        }

        if let ParserState::Literal { start, .. } = self.state {
            bail!("Unterminated literal block starting at line {}", start);
        }
        self.flush_state();

        Ok(DraftDocument::new(self.blocks))
    }

    fn process_line(&mut self, number: usize, line: &str) {
        if matches!(self.state, ParserState::Literal { .. }) {
            if line.trim_end() == LITERAL_DELIMITER {
                self.flush_state();
            } else if let ParserState::Literal { lines, .. } = &mut self.state {
                lines.push(line.to_string());
            }
            return;
        }

        if line.trim().is_empty() {
            self.flush_state();
            self.blocks.push(Block::BlankLine);
            return;
        }

        if line.trim_end() == LITERAL_DELIMITER {
            self.flush_state();
            self.state = ParserState::Literal {
                start: number,
                attributes: self.take_pending(),
                lines: Vec::new(),
            };
            return;
        }

        if let Some(caps) = HEADING.captures(line) {
            self.flush_state();
            let level = (caps[1].len() - 1) as u8;
            let mut section = Section::new(level, parse_inlines(&caps[2]));
            section.attributes = self.take_pending();
            self.blocks.push(Block::Section(section));
            return;
        }

        if let Some(caps) = ANCHOR.captures(line) {
            self.flush_state();
            self.pending.set_custom_id(&caps[1]);
            if let Some(reftext) = caps.get(2) {
                self.pending.insert("reftext", reftext.as_str());
            }
            return;
        }

        if let Some(caps) = BLOCK_ATTRIBUTES.captures(line) {
            self.flush_state();
            for (key, value) in block_attributes(&caps[1]).iter() {
                self.pending.insert(key, value);
            }
            return;
        }

        if let Some(caps) = BLOCK_TITLE.captures(line) {
            self.flush_state();
            self.pending.insert(ATTR_TITLE, &caps[1]);
            return;
        }

        if let Some(caps) = ATTRIBUTE_ENTRY.captures(line) {
            self.flush_state();
            let name = caps[2].to_string();
            let block = if caps.get(1).is_some() || caps.get(3).is_some() {
                Block::AttributeReset(AttributeReset { name })
            } else {
                let value = caps.get(4).map_or("", |m| m.as_str());
                Block::AttributeDeclaration(AttributeDeclaration::new(name, value))
            };
            self.blocks.push(block);
            return;
        }

        if let Some(caps) = BLOCK_MACRO.captures(line) {
            self.flush_state();
            let mut attributes = self.take_pending();
            for (key, value) in parse_attribute_list(&caps[3]).iter() {
                attributes.insert(key, value);
            }
            self.blocks.push(Block::UserMacro(UserMacro {
                name: caps[1].to_string(),
                value: caps[2].to_string(),
                attributes,
            }));
            return;
        }

        if let Some(caps) = ADMONITION.captures(line) {
            if let Some(admonition_type) = AdmonitionType::from_label(&caps[1]) {
                self.flush_state();
                self.state = ParserState::Admonition(
                    admonition_type,
                    self.take_pending(),
                    vec![parse_line(&caps[2])],
                );
                return;
            }
        }

        if let Some(caps) = UNORDERED_ITEM.captures(line) {
            self.handle_list_item(ListType::Unordered, caps[1].len() - 1, &caps[2]);
            return;
        }

        if let Some(caps) = ORDERED_ITEM.captures(line) {
            self.handle_list_item(ListType::Ordered, caps[1].len() - 1, &caps[2]);
            return;
        }

        self.handle_paragraph_line(line);
    }

    fn take_pending(&mut self) -> ElementAttributes {
        std::mem::take(&mut self.pending)
    }

    fn handle_list_item(&mut self, list_type: ListType, level: usize, content: &str) {
        let item = ListItem {
            level: level as u8,
            text: parse_line(content),
            content: Vec::new(),
        };

        match &mut self.state {
            ParserState::List(current_type, _, items) if *current_type == list_type => {
                items.push(item);
            }
            _ => {
                self.flush_state();
                self.state = ParserState::List(list_type, self.take_pending(), vec![item]);
            }
        }
    }

    fn handle_paragraph_line(&mut self, line: &str) {
        let inlines = parse_line(line);
        match &mut self.state {
            ParserState::Paragraph(_, lines) | ParserState::Admonition(_, _, lines) => {
                lines.push(inlines);
            }
            // Continuation of the last list item
            ParserState::List(_, _, items) => {
                if let Some(item) = items.last_mut() {
                    item.text.push(Inline::text(" "));
                    item.text.extend(inlines);
                }
            }
            _ => {
                self.flush_state();
                self.state = ParserState::Paragraph(self.take_pending(), vec![inlines]);
            }
        }
    }

    /// Emit the block being built, if any
    fn flush_state(&mut self) {
        let state = std::mem::replace(&mut self.state, ParserState::Root);

        match state {
            ParserState::Root => {}
            ParserState::Paragraph(attributes, lines) => {
                if !lines.is_empty() {
                    self.blocks
                        .push(Block::Paragraph(Paragraph { attributes, lines }));
                }
            }
            ParserState::Admonition(admonition_type, attributes, lines) => {
                self.blocks.push(Block::Admonition(Admonition {
                    admonition_type,
                    content: vec![Block::Paragraph(Paragraph::new(lines))],
                    attributes,
                }));
            }
            ParserState::List(list_type, attributes, items) => {
                if !items.is_empty() {
                    self.blocks.push(Block::List(List {
                        list_type,
                        items,
                        attributes,
                    }));
                }
            }
            ParserState::Literal {
                attributes, lines, ..
            } => {
                self.blocks
                    .push(Block::Literal(LiteralBlock { attributes, lines }));
            }
        }
    }
}

/// Expand a `[style#id.role1.role2, key=value]` line
fn block_attributes(list: &str) -> ElementAttributes {
    let mut attributes = parse_attribute_list(list);
    if let Some(id) = attributes.get(ATTR_ID).map(str::to_string) {
        attributes.set_custom_id(id);
    }
    let Some(first) = attributes.remove("1") else {
        return attributes;
    };

    let style_end = first.find(['#', '.']).unwrap_or(first.len());
    let style = first[..style_end].trim();
    if !style.is_empty() {
        attributes.insert("style", style);
    }

    let mut roles = Vec::new();
    for caps in SHORTHAND.captures_iter(&first[style_end..]) {
        match &caps[1] {
            "#" => attributes.set_custom_id(caps[2].trim()),
            _ => roles.push(caps[2].trim().to_string()),
        }
    }
    if !roles.is_empty() {
        attributes.insert(ATTR_ROLE, roles.join(" "));
    }
    attributes
}

/// Parse the content of an attribute list, e.g. `lines=1..3, tag=intro`
///
/// Named entries are stored under their name, positional entries under
/// their 1-based position (`"1"`, `"2"`, ...). Values may be quoted to
/// include commas: `lines="1,3..4"`.
pub fn parse_attribute_list(text: &str) -> ElementAttributes {
    let mut attributes = ElementAttributes::new();
    for (index, entry) in split_attribute_list(text).into_iter().enumerate() {
        match entry.split_once('=') {
            Some((key, value)) if is_attribute_name(key.trim()) => {
                attributes.insert(key.trim(), unquote(value.trim()));
            }
            _ => attributes.insert((index + 1).to_string(), unquote(entry)),
        }
    }
    attributes
}

fn split_attribute_list(text: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == ',' => {
                entries.push(&text[start..i]);
                start = i + 1;
            }
            None if c == '"' || c == '\'' => {
                // Quotes only open a value, an apostrophe inside text is literal
                let before = text[start..i].trim();
                if before.is_empty() || before.ends_with('=') {
                    quote = Some(c);
                }
            }
            None => {}
        }
    }
    entries.push(&text[start..]);

    entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parse one source line, turning a trailing ` +` into a line break
fn parse_line(line: &str) -> Vec<Inline> {
    let line = line.trim_end();
    match line.strip_suffix(" +") {
        Some(text) => {
            let mut inlines = parse_inlines(text);
            inlines.push(Inline::Break);
            inlines
        }
        None => parse_inlines(line),
    }
}

/// An inline construct found in the text, by byte span
struct Token<'a> {
    start: usize,
    end: usize,
    kind: TokenKind<'a>,
}

enum TokenKind<'a> {
    Footnote { reference: bool, content: &'a str },
    Link { target: &'a str, label: Option<&'a str> },
    Macro { name: &'a str, value: &'a str, attributes: &'a str },
    Placeholder(&'a str),
    Format(FormatType, &'a str),
}

impl TokenKind<'_> {
    fn into_inline(self) -> Inline {
        match self {
            TokenKind::Footnote {
                reference: false,
                content,
            } => Inline::Footnote(Footnote::new(parse_inlines(content))),
            TokenKind::Footnote {
                reference: true,
                content,
            } => {
                let (name, text) = content.split_once(',').unwrap_or((content, ""));
                Inline::Footnote(Footnote::with_ref(name.trim(), parse_inlines(text.trim())))
            }
            TokenKind::Link { target, label } => Inline::Link(Link {
                location: parse_location(target),
                text: label.map(parse_inlines).unwrap_or_default(),
            }),
            TokenKind::Macro {
                name,
                value,
                attributes,
            } => Inline::UserMacro(InlineUserMacro {
                name: name.to_string(),
                value: value.to_string(),
                attributes: parse_attribute_list(attributes),
            }),
            TokenKind::Placeholder(name) => Inline::AttributeSubstitution(name.to_string()),
            TokenKind::Format(format, content) => Inline::Format(format, parse_inlines(content)),
        }
    }
}

/// Parse inline markup in text
///
/// The earliest construct wins; when two start at the same offset, the
/// first in the order footnote, link, macro, placeholder, formatting wins.
pub fn parse_inlines(text: &str) -> Vec<Inline> {
    let mut result = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        match next_token(remaining) {
            Some(token) => {
                if token.start > 0 {
                    result.push(Inline::text(&remaining[..token.start]));
                }
                let end = token.end;
                result.push(token.kind.into_inline());
                remaining = &remaining[end..];
            }
            None => {
                result.push(Inline::text(remaining));
                break;
            }
        }
    }

    result
}

fn next_token(text: &str) -> Option<Token<'_>> {
    let mut candidates = vec![
        find_footnote(text),
        find_link(text),
        find_inline_macro(text),
        find_placeholder(text),
    ];
    candidates.extend(FORMATS.iter().map(|(regex, format, constrained)| {
        find_format(text, regex, *format, *constrained)
    }));

    candidates
        .into_iter()
        .flatten()
        .fold(None, |best: Option<Token<'_>>, token| match best {
            Some(best) if best.start <= token.start => Some(best),
            _ => Some(token),
        })
}

fn find_footnote(text: &str) -> Option<Token<'_>> {
    FOOTNOTE.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let open = whole.end() - 1;
        let close = matching_bracket(text, open)?;
        Some(Token {
            start: whole.start(),
            end: close + 1,
            kind: TokenKind::Footnote {
                reference: caps.get(1).is_some(),
                content: &text[open + 1..close],
            },
        })
    })
}

fn find_link(text: &str) -> Option<Token<'_>> {
    let url = URL.find(text)?;
    if text[url.end()..].starts_with('[') {
        if let Some(close) = matching_bracket(text, url.end()) {
            return Some(Token {
                start: url.start(),
                end: close + 1,
                kind: TokenKind::Link {
                    target: url.as_str(),
                    label: Some(&text[url.end() + 1..close]),
                },
            });
        }
    }
    // Sentence punctuation after a bare URL is not part of it
    let target = url
        .as_str()
        .trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
    Some(Token {
        start: url.start(),
        end: url.start() + target.len(),
        kind: TokenKind::Link {
            target,
            label: None,
        },
    })
}

fn find_inline_macro(text: &str) -> Option<Token<'_>> {
    INLINE_MACRO.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?.as_str();
        if name == "footnote" || name == "footnoteref" {
            return None;
        }
        let open = whole.end() - 1;
        let close = matching_bracket(text, open)?;
        Some(Token {
            start: whole.start(),
            end: close + 1,
            kind: TokenKind::Macro {
                name,
                value: caps.get(2)?.as_str(),
                attributes: &text[open + 1..close],
            },
        })
    })
}

fn find_placeholder(text: &str) -> Option<Token<'_>> {
    let caps = PLACEHOLDER.captures(text)?;
    let whole = caps.get(0)?;
    Some(Token {
        start: whole.start(),
        end: whole.end(),
        kind: TokenKind::Placeholder(caps.get(1)?.as_str()),
    })
}

fn find_format<'a>(
    text: &'a str,
    regex: &Regex,
    format: FormatType,
    constrained: bool,
) -> Option<Token<'a>> {
    regex.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if constrained && !at_word_boundary(text, whole.start(), whole.end()) {
            return None;
        }
        Some(Token {
            start: whole.start(),
            end: whole.end(),
            kind: TokenKind::Format(format, caps.get(1)?.as_str()),
        })
    })
}

fn at_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Byte offset of the `]` closing the `[` at `open`
fn matching_bracket(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in text[open..].char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse text into a draft document.
///
/// # Errors
///
/// Fails on a literal block that is never closed. Everything else the
/// parser does not recognize is kept as paragraph text.
pub fn parse(text: &str) -> Result<DraftDocument> {
    Parser::new().parse(text)
}
