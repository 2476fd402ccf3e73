use super::{
    common_prefix_len,
    pattern::{Pattern, PATTERN_REGEX},
    BodyMatcher, BodyMismatch,
};
use regex::Regex;
use std::collections::HashSet;

/// Compares bodies as text, letting wildcard tokens in the expected body
/// stand for any value of their shape. Everything else must match exactly.
/// When a wildcard could end in several places, each split is tried until
/// the expanders of every wildcard are satisfied.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternMatcher;

#[derive(Debug)]
enum SegmentKind {
    Literal,
    Wildcard(Pattern),
}

#[derive(Debug)]
struct Segment {
    kind: SegmentKind,
    start: usize,
    end: usize,
}

impl PatternMatcher {
    fn segments(expected: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut literal_start = 0;

        for captures in PATTERN_REGEX.captures_iter(expected) {
            let Some(token) = captures.get(0) else {
                continue;
            };
            // unknown tokens stay part of the surrounding literal
            let Some(pattern) = Pattern::from_captures(&captures) else {
                continue;
            };

            if token.start() > literal_start {
                segments.push(Segment {
                    kind: SegmentKind::Literal,
                    start: literal_start,
                    end: token.start(),
                });
            }
            segments.push(Segment {
                kind: SegmentKind::Wildcard(pattern),
                start: token.start(),
                end: token.end(),
            });
            literal_start = token.end();
        }

        if literal_start < expected.len() {
            segments.push(Segment {
                kind: SegmentKind::Literal,
                start: literal_start,
                end: expected.len(),
            });
        }

        segments
    }

    /// Regex for a prefix of the segments, used to locate a mismatch.
    fn build_regex(expected: &str, segments: &[Segment]) -> Option<Regex> {
        let mut source = String::from("^");
        for segment in segments {
            match &segment.kind {
                SegmentKind::Literal => {
                    source.push_str(&regex::escape(&expected[segment.start..segment.end]))
                }
                SegmentKind::Wildcard(pattern) => {
                    source.push('(');
                    source.push_str(pattern.pattern_type.text_regex());
                    source.push(')');
                }
            }
        }

        Regex::new(&source).ok()
    }

    fn full_match(expected: &str, segments: &[Segment], actual: &str) -> bool {
        Self::walk(expected, segments, actual, 0, 0, &mut HashSet::new())
    }

    /// Matches `segments[index..]` against `actual[offset..]`, trying every
    /// split a wildcard could take until one satisfies its expanders.
    /// `dead_ends` remembers `(index, offset)` pairs already known to fail.
    fn walk(
        expected: &str,
        segments: &[Segment],
        actual: &str,
        index: usize,
        offset: usize,
        dead_ends: &mut HashSet<(usize, usize)>,
    ) -> bool {
        let Some(segment) = segments.get(index) else {
            return offset == actual.len();
        };
        if dead_ends.contains(&(index, offset)) {
            return false;
        }

        let rest = &actual[offset..];
        let matched = match &segment.kind {
            SegmentKind::Literal => {
                let literal = &expected[segment.start..segment.end];
                rest.starts_with(literal)
                    && Self::walk(
                        expected,
                        segments,
                        actual,
                        index + 1,
                        offset + literal.len(),
                        dead_ends,
                    )
            }
            SegmentKind::Wildcard(pattern) => {
                let next_literal = segments.get(index + 1).and_then(|next| match next.kind {
                    SegmentKind::Literal => Some(&expected[next.start..next.end]),
                    SegmentKind::Wildcard(_) => None,
                });
                let ends = rest
                    .char_indices()
                    .map(|(end, _)| end)
                    .chain(std::iter::once(rest.len()))
                    .filter(|end| index + 1 < segments.len() || *end == rest.len())
                    .filter(|end| {
                        next_literal.map_or(true, |literal| rest[*end..].starts_with(literal))
                    })
                    .collect::<Vec<_>>();

                ends.into_iter().any(|end| {
                    pattern.matches_text(&rest[..end])
                        && Self::walk(
                            expected,
                            segments,
                            actual,
                            index + 1,
                            offset + end,
                            dead_ends,
                        )
                })
            }
        };

        if !matched {
            dead_ends.insert((index, offset));
        }
        matched
    }

    /// Finds how far into `actual` the expected segments still line up.
    fn locate(expected: &str, segments: &[Segment], actual: &str) -> BodyMismatch {
        let (matched, offset) = (1..=segments.len())
            .rev()
            .find_map(|count| {
                Self::build_regex(expected, &segments[..count])
                    .and_then(|regex| regex.find(actual))
                    .map(|found| (count, found.end()))
            })
            .unwrap_or((0, 0));

        match segments.get(matched) {
            Some(Segment {
                kind: SegmentKind::Literal,
                start,
                end,
            }) => {
                let common = common_prefix_len(&expected[*start..*end], &actual[offset..]);
                BodyMismatch::at_offset(&expected[start + common..], actual, offset + common)
            }
            Some(segment) => BodyMismatch::at_offset(&expected[segment.start..], actual, offset),
            None => BodyMismatch::at_offset("", actual, offset),
        }
    }
}

impl BodyMatcher for PatternMatcher {
    fn matches(&self, expected: &str, actual: &str) -> Result<(), BodyMismatch> {
        let segments = Self::segments(expected);

        if Self::full_match(expected, &segments, actual) {
            Ok(())
        } else {
            Err(Self::locate(expected, &segments, actual))
        }
    }
}
