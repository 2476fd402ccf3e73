use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    /// A wildcard token with its expanders, e.g. `@integer@.greaterThan(1)`.
    pub(crate) static ref PATTERN_REGEX: Regex = Regex::new(
        r#"@(?P<pattern_type>[a-z]+|\*)@(?P<expanders>(?:\.[a-zA-Z]+\((?:"[^"]*"|[^)"]*)\))*)"#
    )
    .unwrap();
    static ref EXPANDER_REGEX: Regex =
        Regex::new(r#"\.(?P<name>[a-zA-Z]+)\((?P<argument>"[^"]*"|[^)"]*)\)"#).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    Integer,
    Double,
    Number,
    String,
    Boolean,
    Null,
    Array,
    Wildcard,
}

impl PatternType {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "integer" => PatternType::Integer,
            "double" => PatternType::Double,
            "number" => PatternType::Number,
            "string" => PatternType::String,
            "boolean" => PatternType::Boolean,
            "null" => PatternType::Null,
            "array" => PatternType::Array,
            "*" | "wildcard" => PatternType::Wildcard,
            _ => return None,
        })
    }

    /// What a value of this type looks like in plain text.
    pub(crate) fn text_regex(self) -> &'static str {
        match self {
            PatternType::Integer => r"-?\d+",
            PatternType::Double => r"-?\d+\.\d+(?:[eE][-+]?\d+)?",
            PatternType::Number => r"-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?",
            PatternType::String => r"(?s:.*?)",
            PatternType::Boolean => r"true|false",
            PatternType::Null => r"null",
            PatternType::Array => r"(?s:\[.*?\])",
            PatternType::Wildcard => r"(?s:.*?)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expander {
    GreaterThan(f64),
    LowerThan(f64),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    NotEmpty,
}

impl Expander {
    fn parse(name: &str, argument: &str) -> Option<Self> {
        let text = || {
            argument
                .strip_prefix('"')
                .and_then(|a| a.strip_suffix('"'))
                .map(String::from)
        };
        let number = || argument.trim().parse::<f64>().ok();

        match name {
            "greaterThan" => number().map(Expander::GreaterThan),
            "lowerThan" => number().map(Expander::LowerThan),
            "startsWith" => text().map(Expander::StartsWith),
            "endsWith" => text().map(Expander::EndsWith),
            "contains" => text().map(Expander::Contains),
            "notEmpty" if argument.trim().is_empty() => Some(Expander::NotEmpty),
            _ => None,
        }
    }

    fn accepts_number(&self, number: f64) -> bool {
        match self {
            Expander::GreaterThan(bound) => number > *bound,
            Expander::LowerThan(bound) => number < *bound,
            _ => false,
        }
    }

    fn accepts_text(&self, text: &str) -> bool {
        match self {
            Expander::StartsWith(prefix) => text.starts_with(prefix.as_str()),
            Expander::EndsWith(suffix) => text.ends_with(suffix.as_str()),
            Expander::Contains(needle) => text.contains(needle.as_str()),
            Expander::NotEmpty => !text.is_empty(),
            Expander::GreaterThan(_) | Expander::LowerThan(_) => text
                .trim()
                .parse::<f64>()
                .map_or(false, |number| self.accepts_number(number)),
        }
    }
}

/// A wildcard standing in for any value of one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub pattern_type: PatternType,
    pub expanders: Vec<Expander>,
}

impl Pattern {
    /// Parses `token` when the whole of it is one wildcard.
    pub fn parse(token: &str) -> Option<Self> {
        let captures = PATTERN_REGEX.captures(token)?;
        let whole = captures.get(0)?;
        if whole.start() != 0 || whole.end() != token.len() {
            return None;
        }

        Self::from_captures(&captures)
    }

    pub(crate) fn from_captures(captures: &regex::Captures<'_>) -> Option<Self> {
        let pattern_type = PatternType::from_name(&captures["pattern_type"])?;
        let expanders = EXPANDER_REGEX
            .captures_iter(&captures["expanders"])
            .map(|expander| Expander::parse(&expander["name"], &expander["argument"]))
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            pattern_type,
            expanders,
        })
    }

    pub fn matches_text(&self, text: &str) -> bool {
        let shape_matches = match self.pattern_type {
            PatternType::Integer => text.parse::<i64>().is_ok(),
            PatternType::Double => text.contains('.') && text.parse::<f64>().is_ok(),
            PatternType::Number => text.parse::<f64>().is_ok(),
            PatternType::String | PatternType::Wildcard => true,
            PatternType::Boolean => text == "true" || text == "false",
            PatternType::Null => text == "null",
            PatternType::Array => matches!(serde_json::from_str(text), Ok(Value::Array(_))),
        };

        shape_matches
            && self
                .expanders
                .iter()
                .all(|expander| expander.accepts_text(text))
    }

    pub fn matches_json(&self, value: &Value) -> bool {
        let shape_matches = match self.pattern_type {
            PatternType::Integer => value.is_i64() || value.is_u64(),
            PatternType::Double => value.is_f64(),
            PatternType::Number => value.is_number(),
            PatternType::String => value.is_string(),
            PatternType::Boolean => value.is_boolean(),
            PatternType::Null => value.is_null(),
            PatternType::Array => value.is_array(),
            PatternType::Wildcard => true,
        };

        shape_matches
            && self.expanders.iter().all(|expander| match value {
                Value::Number(number) => number
                    .as_f64()
                    .map_or(false, |number| expander.accepts_number(number)),
                Value::String(text) => expander.accepts_text(text),
                Value::Array(items) => *expander == Expander::NotEmpty && !items.is_empty(),
                _ => false,
            })
    }
}
