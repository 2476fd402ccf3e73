use super::{
    pattern::{Pattern, PATTERN_REGEX},
    BodyMatcher, BodyMismatch, PatternMatcher,
};
use serde_json::Value;

/// Compares JSON bodies structurally, so key order inside the text and
/// whitespace do not matter. String values holding wildcards match any value
/// of their shape. Bodies that are not JSON fall back to [`PatternMatcher`].
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonMatcher;

impl JsonMatcher {
    /// Wraps wildcards written where a JSON value goes in quotes, so the
    /// expected body parses as JSON.
    fn quote_bare_patterns(expected: &str) -> String {
        let mut quoted = String::with_capacity(expected.len());
        let mut in_string = false;
        let mut escaped = false;
        let mut index = 0;

        while let Some(c) = expected[index..].chars().next() {
            if !in_string && c == '@' {
                if let Some(token) = PATTERN_REGEX
                    .find_at(expected, index)
                    .filter(|token| token.start() == index)
                {
                    quoted.push('"');
                    quoted.push_str(&token.as_str().replace('"', "\\\""));
                    quoted.push('"');
                    index = token.end();
                    continue;
                }
            }

            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
            } else if c == '"' {
                in_string = true;
            }

            quoted.push(c);
            index += c.len_utf8();
        }

        quoted
    }

    fn compare(path: &str, expected: &Value, actual: &Value) -> Result<(), BodyMismatch> {
        let mismatch = || BodyMismatch::json(path, expected.to_string(), actual.to_string());

        match (expected, actual) {
            (Value::String(text), _) if text.contains('@') => {
                if let Some(pattern) = Pattern::parse(text) {
                    return if pattern.matches_json(actual) {
                        Ok(())
                    } else {
                        Err(mismatch())
                    };
                }
                match actual {
                    Value::String(actual_text) => PatternMatcher
                        .matches(text, actual_text)
                        .map_err(|_| mismatch()),
                    _ => Err(mismatch()),
                }
            }
            (Value::Object(expected_fields), Value::Object(actual_fields)) => {
                for (key, expected_value) in expected_fields {
                    let field_path = format!("{}.{}", path, key);
                    match actual_fields.get(key) {
                        Some(actual_value) => {
                            Self::compare(&field_path, expected_value, actual_value)?
                        }
                        None => {
                            return Err(BodyMismatch::json(
                                field_path,
                                expected_value.to_string(),
                                "<missing>",
                            ))
                        }
                    }
                }

                match actual_fields
                    .iter()
                    .find(|(key, _)| !expected_fields.contains_key(*key))
                {
                    Some((key, value)) => Err(BodyMismatch::json(
                        format!("{}.{}", path, key),
                        "<absent>",
                        value.to_string(),
                    )),
                    None => Ok(()),
                }
            }
            (Value::Array(expected_items), Value::Array(actual_items)) => {
                if expected_items.len() != actual_items.len() {
                    return Err(mismatch());
                }

                expected_items
                    .iter()
                    .zip(actual_items)
                    .enumerate()
                    .try_for_each(|(index, (expected_item, actual_item))| {
                        Self::compare(&format!("{}[{}]", path, index), expected_item, actual_item)
                    })
            }
            _ if expected == actual => Ok(()),
            _ => Err(mismatch()),
        }
    }
}

impl BodyMatcher for JsonMatcher {
    fn matches(&self, expected: &str, actual: &str) -> Result<(), BodyMismatch> {
        if expected.trim().is_empty() {
            return if actual.trim().is_empty() {
                Ok(())
            } else {
                Err(BodyMismatch::first_difference(expected, actual))
            };
        }

        let expected_json = serde_json::from_str::<Value>(&Self::quote_bare_patterns(expected));
        let actual_json = serde_json::from_str::<Value>(actual);

        match (expected_json, actual_json) {
            (Ok(expected_json), Ok(actual_json)) => Self::compare("$", &expected_json, &actual_json),
            _ => PatternMatcher.matches(expected, actual),
        }
    }
}
