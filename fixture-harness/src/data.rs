use indexmap::IndexMap;

/// Header names mapped to values, in the order they were written.
pub type Headers = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedRequest {
    pub method: String,
    pub uri: String,
    pub headers: Headers,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedResponse {
    pub protocol_version: String,
    pub status_code: u16,
    pub headers: Headers,
    pub body: String,
}

/// The response the service under test actually produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActualResponse {
    pub protocol_version: String,
    pub status_code: u16,
    pub headers: Headers,
    pub body: String,
}
