//! Line and tag ranges for partial includes
//!
//! `lines=1..5;10..-1` selects lines by number. `tags=foo;!bar` selects
//! lines by the `tag::name[]` / `end::name[]` regions they sit in, using the
//! regions seen so far while the included content is scanned.
//!
//! # Tag directives
//!
//! - `**` - every line
//! - `*` - every line inside a tagged region
//! - `name` - every line inside the `name` region
//! - `!...` - removes lines a previous directive selected
//!
//! Directives are applied in order: `**;!foo` is every line except the
//! `foo` region, `*;!foo` is every tagged region except `foo`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RangeError;

/// An inclusive range of 1-based line numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    /// `None` runs to the end of the input
    pub end: Option<usize>,
}

impl LineRange {
    /// Lines `start..=end`
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Lines from `start` to the end of the input
    pub fn open(start: usize) -> Self {
        Self { start, end: None }
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && self.end.map_or(true, |end| line <= end)
    }
}

/// A set of line ranges; an empty set selects every line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineRanges(Vec<LineRange>);

impl LineRanges {
    pub fn new(ranges: impl IntoIterator<Item = LineRange>) -> Self {
        Self(ranges.into_iter().collect())
    }

    /// Parse a `lines=` value such as `1;3..4;6..-1`
    ///
    /// Entries may be separated by `;` or `,`.
    pub fn parse(spec: &str) -> Result<Self, RangeError> {
        let malformed = |reason: String| RangeError::MalformedLineRange {
            spec: spec.to_string(),
            reason,
        };

        let mut ranges = Vec::new();
        for entry in spec.split([';', ',']).map(str::trim).filter(|e| !e.is_empty()) {
            let (start, end) = match entry.split_once("..") {
                Some((start, end)) => (start.trim(), Some(end.trim())),
                None => (entry, None),
            };
            let start: usize = start
                .parse()
                .map_err(|_| malformed(format!("'{}' is not a line number", start)))?;
            if start == 0 {
                return Err(malformed("line numbers start at 1".to_string()));
            }
            let range = match end {
                None => LineRange::new(start, start),
                Some("") | Some("-1") => LineRange::open(start),
                Some(end) => {
                    let end: usize = end
                        .parse()
                        .map_err(|_| malformed(format!("'{}' is not a line number", end)))?;
                    if end < start {
                        return Err(malformed(format!("{}..{} ends before it starts", start, end)));
                    }
                    LineRange::new(start, end)
                }
            };
            ranges.push(range);
        }

        if ranges.is_empty() {
            return Err(malformed("no line range given".to_string()));
        }
        Ok(Self(ranges))
    }

    /// Whether `line` falls in any range
    pub fn matches(&self, line: usize) -> bool {
        self.0.is_empty() || self.0.iter().any(|range| range.contains(line))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One tag directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRange {
    pub name: String,
    pub included: bool,
}

impl TagRange {
    pub fn included(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            included: true,
        }
    }

    pub fn excluded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            included: false,
        }
    }
}

/// A region opened by `tag::name[]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentTagRange {
    pub start: usize,
    /// Set once `end::name[]` is seen
    pub end: Option<usize>,
}

impl CurrentTagRange {
    /// Whether the region is open at `line`
    pub fn is_active(&self, line: usize) -> bool {
        self.start <= line && self.end.is_none()
    }
}

/// Tag regions seen so far while scanning content
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CurrentRanges(BTreeMap<String, CurrentTagRange>);

impl CurrentRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `tag::name[]` at `line`, reopening the region if it was closed
    pub fn open(&mut self, name: impl Into<String>, line: usize) {
        self.0
            .insert(name.into(), CurrentTagRange { start: line, end: None });
    }

    /// Record `end::name[]` at `line`; false if the region was not open
    pub fn close(&mut self, name: &str, line: usize) -> bool {
        match self.0.get_mut(name) {
            Some(range) if range.end.is_none() => {
                range.end = Some(line);
                true
            }
            _ => false,
        }
    }

    /// Insert a region as-is
    pub fn insert(&mut self, name: impl Into<String>, range: CurrentTagRange) {
        self.0.insert(name.into(), range);
    }

    pub fn get(&self, name: &str) -> Option<&CurrentTagRange> {
        self.0.get(name)
    }

    fn is_active(&self, name: &str, line: usize) -> bool {
        self.0.get(name).is_some_and(|range| range.is_active(line))
    }

    fn any_active(&self, line: usize) -> bool {
        self.0.values().any(|range| range.is_active(line))
    }
}

impl<S: Into<String>> FromIterator<(S, CurrentTagRange)> for CurrentRanges {
    fn from_iter<I: IntoIterator<Item = (S, CurrentTagRange)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// An ordered list of tag directives; an empty list selects every line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagRanges(Vec<TagRange>);

impl TagRanges {
    /// Build from directives, rejecting unusable names
    pub fn new(ranges: impl IntoIterator<Item = TagRange>) -> Result<Self, RangeError> {
        let ranges: Vec<TagRange> = ranges.into_iter().collect();
        for range in &ranges {
            validate_tag_name(&range.name, &range.name)?;
        }
        Ok(Self(ranges))
    }

    /// Build from directive strings such as `"foo"`, `"!bar"`, `"**"`
    pub fn from_directives<I, S>(directives: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ranges = Vec::new();
        for directive in directives {
            let directive = directive.as_ref();
            let range = match directive.strip_prefix('!') {
                Some(name) => TagRange::excluded(name),
                None => TagRange::included(directive),
            };
            validate_tag_name(&range.name, directive)?;
            ranges.push(range);
        }
        Ok(Self(ranges))
    }

    /// Parse a `tags=` value such as `foo;!bar`
    pub fn parse(spec: &str) -> Result<Self, RangeError> {
        if spec.trim().is_empty() {
            return Err(RangeError::MalformedTagRange {
                spec: spec.to_string(),
                reason: "no tag given".to_string(),
            });
        }
        Self::from_directives(spec.split([';', ',']).map(str::trim))
    }

    /// Whether `line` is selected, given the regions seen so far
    pub fn matches(&self, line: usize, current: &CurrentRanges) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let mut matched = false;
        for range in &self.0 {
            let active = match range.name.as_str() {
                "**" => true,
                "*" => current.any_active(line),
                name => current.is_active(name, line),
            };
            if active {
                matched = range.included;
            }
        }
        matched
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagRange> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Characters a tag name may contain, for the `tag::name[]` marker patterns
pub(crate) const TAG_NAME_PATTERN: &str = r"[^\s\[\]]+";

fn validate_tag_name(name: &str, directive: &str) -> Result<(), RangeError> {
    let reason = if name.is_empty() {
        "empty tag name"
    } else if name.starts_with('!') {
        "repeated negation"
    } else if name.chars().any(|c| c.is_whitespace() || c == '[' || c == ']') {
        "invalid character in tag name"
    } else {
        return Ok(());
    };
    Err(RangeError::MalformedTagRange {
        spec: directive.to_string(),
        reason: reason.to_string(),
    })
}
