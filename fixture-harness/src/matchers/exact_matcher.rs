use super::{BodyMatcher, BodyMismatch};

/// Byte-for-byte body comparison.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatcher;

impl BodyMatcher for ExactMatcher {
    fn matches(&self, expected: &str, actual: &str) -> Result<(), BodyMismatch> {
        if expected == actual {
            Ok(())
        } else {
            Err(BodyMismatch::first_difference(expected, actual))
        }
    }
}
