use crate::matchers::BodyMismatch;
use std::fmt::Write;
use thiserror::Error;

/// One way an actual response failed to meet a fixture's expectation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertionFailure {
    #[error("Protocol versions differ. expected - {expected}, actual - {actual}")]
    ProtocolVersion { expected: String, actual: String },

    #[error("Status codes differ. expected - {expected}, actual - {actual}")]
    StatusCode { expected: u16, actual: u16 },

    #[error("Header \"{name}\" is missing. expected - \"{name}\": \"{expected}\"")]
    HeaderMissing { name: String, expected: String },

    #[error("Headers differ. expected - \"{name}\": \"{expected}\", actual - \"{name}\": \"{actual}\"")]
    HeaderMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Response {mismatch}\n{}", line_diff(.expected, .actual))]
    BodyMismatch {
        mismatch: BodyMismatch,
        expected: String,
        actual: String,
    },
}

/// Largest LCS table `line_diff` builds; past it the changed lines are
/// listed as removed then added.
const MAX_DIFF_CELLS: usize = 1 << 20;

/// Line diff of two bodies: `-` lines only expected, `+` lines only actual.
pub fn line_diff(expected: &str, actual: &str) -> String {
    let expected_lines = expected.lines().collect::<Vec<_>>();
    let actual_lines = actual.lines().collect::<Vec<_>>();

    let prefix = expected_lines
        .iter()
        .zip(&actual_lines)
        .take_while(|(expected, actual)| expected == actual)
        .count();
    let suffix = expected_lines[prefix..]
        .iter()
        .rev()
        .zip(actual_lines[prefix..].iter().rev())
        .take_while(|(expected, actual)| expected == actual)
        .count();
    let expected_changed = &expected_lines[prefix..expected_lines.len() - suffix];
    let actual_changed = &actual_lines[prefix..actual_lines.len() - suffix];

    let mut diff = String::new();
    for line in &expected_lines[..prefix] {
        let _ = writeln!(diff, "  {}", line);
    }

    let cells = (expected_changed.len() + 1).saturating_mul(actual_changed.len() + 1);
    if cells > MAX_DIFF_CELLS {
        for line in expected_changed {
            let _ = writeln!(diff, "- {}", line);
        }
        for line in actual_changed {
            let _ = writeln!(diff, "+ {}", line);
        }
    } else {
        lcs_diff(&mut diff, expected_changed, actual_changed);
    }

    for line in &expected_lines[expected_lines.len() - suffix..] {
        let _ = writeln!(diff, "  {}", line);
    }

    diff
}

fn lcs_diff(diff: &mut String, expected_lines: &[&str], actual_lines: &[&str]) {
    let (rows, columns) = (expected_lines.len(), actual_lines.len());

    // common[i][j] = longest common subsequence of expected[i..] and actual[j..]
    let mut common = vec![vec![0usize; columns + 1]; rows + 1];
    for i in (0..rows).rev() {
        for j in (0..columns).rev() {
            common[i][j] = if expected_lines[i] == actual_lines[j] {
                common[i + 1][j + 1] + 1
            } else {
                common[i + 1][j].max(common[i][j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < rows || j < columns {
        if i < rows && j < columns && expected_lines[i] == actual_lines[j] {
            let _ = writeln!(diff, "  {}", expected_lines[i]);
            i += 1;
            j += 1;
        } else if j == columns || (i < rows && common[i + 1][j] >= common[i][j + 1]) {
            let _ = writeln!(diff, "- {}", expected_lines[i]);
            i += 1;
        } else {
            let _ = writeln!(diff, "+ {}", actual_lines[j]);
            j += 1;
        }
    }
}
