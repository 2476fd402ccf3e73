mod exact_matcher;
mod json_matcher;
mod pattern;
mod pattern_matcher;

pub use exact_matcher::ExactMatcher;
pub use json_matcher::JsonMatcher;
pub use pattern::{Expander, Pattern, PatternType};
pub use pattern_matcher::PatternMatcher;

use std::fmt::{self, Debug, Display};

/// Decides whether an actual response body satisfies the body a fixture
/// expects.
pub trait BodyMatcher: Debug {
    fn matches(&self, expected: &str, actual: &str) -> Result<(), BodyMismatch>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchLocation {
    /// 1-based position in the actual body.
    Text { line: u32, column: u32 },
    /// JSON path such as `$.items[0].id`.
    Json { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyMismatch {
    pub location: MismatchLocation,
    pub expected_context: String,
    pub actual_context: String,
}

impl BodyMismatch {
    pub fn json<S1, S2, S3>(path: S1, expected: S2, actual: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            location: MismatchLocation::Json { path: path.into() },
            expected_context: expected.into(),
            actual_context: actual.into(),
        }
    }

    /// Points at byte `offset` of `actual`, quoting the rest of that line on
    /// both sides.
    pub fn at_offset(expected_rest: &str, actual: &str, offset: usize) -> Self {
        let offset = floor_char_boundary(actual, offset);
        let consumed = &actual[..offset];
        let line = consumed.matches('\n').count() as u32 + 1;
        let column = consumed
            .rfind('\n')
            .map_or(consumed, |newline| &consumed[newline + 1..])
            .chars()
            .count() as u32
            + 1;

        Self {
            location: MismatchLocation::Text { line, column },
            expected_context: first_line(expected_rest).into(),
            actual_context: first_line(&actual[offset..]).into(),
        }
    }

    /// Mismatch at the first byte where `expected` and `actual` differ.
    pub fn first_difference(expected: &str, actual: &str) -> Self {
        let offset = common_prefix_len(expected, actual);

        Self::at_offset(&expected[offset..], actual, offset)
    }
}

impl Display for BodyMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            MismatchLocation::Text { line, column } => {
                write!(f, "bodies differ at line {}, column {}", line, column)?
            }
            MismatchLocation::Json { path } => write!(f, "bodies differ at {}", path)?,
        }

        write!(
            f,
            ". Expected: \"{}\". Actual: \"{}\"",
            self.expected_context.escape_default(),
            self.actual_context.escape_default()
        )
    }
}

/// Length in bytes of the longest common prefix of `a` and `b`.
pub(crate) fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, left), right)| left != right)
        .map_or_else(|| a.len().min(b.len()), |((index, _), _)| index)
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
