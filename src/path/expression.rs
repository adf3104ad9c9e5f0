//! Parsing of dotted/bracketed path expressions such as `orders[0].lines[*].sku`.

use crate::error::PathSyntaxError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

// A segment is a field name followed by any number of bracket suffixes.
static SEGMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^.\[\]]+)((?:\[[^\]]*\])*)$").unwrap()
});

static BRACKET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]*)\]").unwrap()
});

/// One step of a path expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// `name` - a named member of a record
    Field(String),
    /// `[3]` - a positional element of a list
    Index(usize),
    /// `[key]` - a map entry; absent keys resolve to null
    Key(String),
    /// `[*]` - every element of a list, joined into one string
    Wildcard,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, "{}", name),
            Segment::Index(index) => write!(f, "[{}]", index),
            Segment::Key(key) => write!(f, "[{}]", key),
            Segment::Wildcard => write!(f, "[*]"),
        }
    }
}

/// A parsed, immutable path expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathExpression {
    source: String,
    segments: Vec<Segment>,
}

impl PathExpression {
    /// Parse a path expression.
    ///
    /// ```rust
    /// use sheetmelt::path::{PathExpression, Segment};
    ///
    /// let path = PathExpression::parse("a.b[0].c").unwrap();
    /// assert_eq!(path.segments(), &[
    ///     Segment::Field("a".into()),
    ///     Segment::Field("b".into()),
    ///     Segment::Index(0),
    ///     Segment::Field("c".into()),
    /// ]);
    /// ```
    pub fn parse(expr: &str) -> Result<Self, PathSyntaxError> {
        if expr.is_empty() {
            return Err(PathSyntaxError::Empty);
        }

        let mut segments = Vec::new();
        for raw in split_segments(expr)? {
            parse_segment(expr, raw, &mut segments)?;
        }

        Ok(PathExpression {
            source: expr.to_string(),
            segments,
        })
    }

    /// A path consisting of a single field access
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        PathExpression {
            source: name.clone(),
            segments: vec![Segment::Field(name)],
        }
    }

    /// The empty path, which resolves to the root value itself
    pub fn identity() -> Self {
        PathExpression {
            source: String::new(),
            segments: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_identity(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for PathExpression {
    type Err = PathSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split on dots that are not inside brackets
fn split_segments(expr: &str) -> Result<Vec<&str>, PathSyntaxError> {
    let mut parts = Vec::new();
    let mut in_bracket = false;
    let mut start = 0;

    for (pos, ch) in expr.char_indices() {
        match ch {
            '[' if !in_bracket => in_bracket = true,
            ']' if in_bracket => in_bracket = false,
            ']' => return Err(PathSyntaxError::UnbalancedBracket(expr.to_string())),
            '.' if !in_bracket => {
                parts.push(&expr[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }

    if in_bracket {
        return Err(PathSyntaxError::UnbalancedBracket(expr.to_string()));
    }

    parts.push(&expr[start..]);
    Ok(parts)
}

fn parse_segment(
    expr: &str,
    raw: &str,
    segments: &mut Vec<Segment>,
) -> Result<(), PathSyntaxError> {
    if raw.is_empty() || raw.starts_with('[') {
        return Err(PathSyntaxError::EmptyName(expr.to_string()));
    }

    let captures = SEGMENT_REGEX.captures(raw).ok_or_else(|| PathSyntaxError::InvalidSegment {
        expr: expr.to_string(),
        segment: raw.to_string(),
    })?;

    segments.push(Segment::Field(captures[1].to_string()));

    let Some(brackets) = captures.get(2) else {
        return Ok(());
    };

    for bracket in BRACKET_REGEX.captures_iter(brackets.as_str()) {
        let content = &bracket[1];
        let segment = if content.is_empty() {
            return Err(PathSyntaxError::EmptyBracket(expr.to_string()));
        } else if content == "*" {
            Segment::Wildcard
        } else if content.bytes().all(|b| b.is_ascii_digit()) {
            let index = content.parse::<usize>().map_err(|_| PathSyntaxError::InvalidSegment {
                expr: expr.to_string(),
                segment: raw.to_string(),
            })?;
            Segment::Index(index)
        } else {
            Segment::Key(content.to_string())
        };
        segments.push(segment);
    }

    Ok(())
}
