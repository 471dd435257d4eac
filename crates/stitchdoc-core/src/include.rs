//! Include directive parsing and content selection.
//!
//! This module handles `include::` directives with partial selections.
//! Reading the included file is left to the caller; this module parses the
//! directive, resolves its location and filters the content it is given.
//!
//! # Syntax
//!
//! ```text
//! include::chapter.adoc[]
//! include::{includedir}/code.rs[lines=1..10;20..-1]
//! include::code.rs[tags=setup;!noise]
//! include::code.rs[tag=setup]
//! ```
//!
//! # Attributes
//!
//! - `lines=RANGES` - 1-based line ranges, separated by `;` (or `,` when quoted)
//! - `tags=DIRECTIVES` - tag directives, see [`crate::ranges`]
//! - `tag=NAME` - a single tag
//!
//! `lines` takes precedence over `tags` when both are given. Tag regions are
//! marked in the included content with `tag::name[]` and `end::name[]`;
//! marker lines are never part of a tag selection.
//!
//! # Example
//!
//! ```
//! use stitchdoc_core::include::IncludeDirective;
//!
//! let directive = IncludeDirective::parse("include::code.rs[tag=main]")?.unwrap();
//! let content = "use x;\n// tag::main[]\nfn main() {}\n// end::main[]\n";
//! assert_eq!(directive.select(content), "fn main() {}\n");
//! # Ok::<(), stitchdoc_core::RangeError>(())
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use stitchdoc_ast::{DocumentAttributes, ElementAttributes, Location, UserMacro};
use tracing::{debug, warn};

use crate::draft::parse_attribute_list;
use crate::error::RangeError;
use crate::location::{parse_location, LocationResolver};
use crate::ranges::{CurrentRanges, LineRanges, TagRanges, TAG_NAME_PATTERN};

/// Macro name of include directives
pub const INCLUDE_MACRO: &str = "include";

static INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^include::(\S*?)\[(.*)\]$").expect("valid include pattern"));

static TAG_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\btag::({})\[\]", TAG_NAME_PATTERN)).expect("valid tag pattern")
});

static TAG_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\bend::({})\[\]", TAG_NAME_PATTERN)).expect("valid tag pattern")
});

/// Parsed include directive
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeDirective {
    /// Target, possibly with `{name}` placeholders
    pub location: Location,
    pub line_ranges: Option<LineRanges>,
    pub tag_ranges: Option<TagRanges>,
    /// Every attribute of the directive, including `lines` and `tags`
    pub attributes: ElementAttributes,
}

impl IncludeDirective {
    /// Parse an include directive from a line
    ///
    /// Returns `Ok(None)` when the line is not an include directive.
    ///
    /// # Format
    /// `include::target[attributes]`
    pub fn parse(line: &str) -> Result<Option<Self>, RangeError> {
        let Some(caps) = INCLUDE.captures(line.trim()) else {
            return Ok(None);
        };
        Self::build(&caps[1], parse_attribute_list(&caps[2])).map(Some)
    }

    /// Interpret a block macro from a draft document
    ///
    /// Returns `Ok(None)` for any macro other than `include`.
    pub fn from_macro(user_macro: &UserMacro) -> Result<Option<Self>, RangeError> {
        if user_macro.name != INCLUDE_MACRO {
            return Ok(None);
        }
        Self::build(&user_macro.value, user_macro.attributes.clone()).map(Some)
    }

    fn build(target: &str, attributes: ElementAttributes) -> Result<Self, RangeError> {
        let line_ranges = attributes.get("lines").map(LineRanges::parse).transpose()?;
        let tag_ranges = match (attributes.get("tags"), attributes.get("tag")) {
            (Some(tags), _) => Some(TagRanges::parse(tags)?),
            (None, Some(tag)) => Some(TagRanges::from_directives([tag])?),
            (None, None) => None,
        };

        Ok(Self {
            location: parse_location(target),
            line_ranges,
            tag_ranges,
            attributes,
        })
    }

    /// The target with placeholders substituted and the base directory
    /// applied
    pub fn resolve_location(
        &self,
        attrs: &DocumentAttributes,
        resolver: &LocationResolver,
    ) -> Location {
        resolver.resolve(&self.location, attrs)
    }

    /// Whether only part of the content is included
    pub fn is_partial(&self) -> bool {
        self.line_ranges.is_some() || self.tag_ranges.is_some()
    }

    /// Keep the selected lines of `content`
    ///
    /// Each kept line is terminated with `\n`.
    pub fn select(&self, content: &str) -> String {
        if let Some(lines) = &self.line_ranges {
            if self.tag_ranges.is_some() {
                debug!("line ranges take precedence over tag ranges");
            }
            return select_lines(content, lines);
        }
        match &self.tag_ranges {
            Some(tags) => select_tags(content, tags),
            None => content.to_string(),
        }
    }
}

fn select_lines(content: &str, ranges: &LineRanges) -> String {
    let mut selected = String::new();
    for (index, line) in content.lines().enumerate() {
        if ranges.matches(index + 1) {
            selected.push_str(line);
            selected.push('\n');
        }
    }
    selected
}

fn select_tags(content: &str, tags: &TagRanges) -> String {
    let mut current = CurrentRanges::new();
    let mut selected = String::new();

    for (index, line) in content.lines().enumerate() {
        let number = index + 1;
        if let Some(caps) = TAG_START.captures(line) {
            current.open(&caps[1], number);
            continue;
        }
        if let Some(caps) = TAG_END.captures(line) {
            if !current.close(&caps[1], number) {
                warn!(
                    tag = &caps[1],
                    line = number,
                    "end of tag region that was never opened"
                );
            }
            continue;
        }
        if tags.matches(number, &current) {
            selected.push_str(line);
            selected.push('\n');
        }
    }

    if let Some(unclosed) = tags
        .iter()
        .find(|range| range.included && current.get(&range.name).is_some_and(|r| r.end.is_none()))
    {
        debug!(tag = unclosed.name.as_str(), "tag region runs to the end of the content");
    }
    selected
}
