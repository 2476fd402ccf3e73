//! Reads and writes markdown fixtures.
//!
//! A fixture is two fenced `http request` blocks separated by a `---` line:
//! the request to send and the response to expect. Each block may be followed
//! by a second fence holding the raw body.

use crate::{
    data::{Headers, ParsedRequest, ParsedResponse},
    error::{Error, Result},
};
use hyper::StatusCode;
use lazy_static::lazy_static;
use regex::Regex;
use std::{fmt::Write, fs, path::Path};

const BLOCK_MARKER: &str = "```http request";
const FENCE: &str = "```";

lazy_static! {
    static ref SEPARATOR_REGEX: Regex = Regex::new(r"(?m)^---$").unwrap();
    static ref BODY_FENCE_REGEX: Regex = Regex::new(r"^```\w*$").unwrap();
    static ref REQUEST_LINE_REGEX: Regex =
        Regex::new(r"^(?P<method>\w+) +(?P<uri>\S.*)$").unwrap();
    static ref STATUS_LINE_REGEX: Regex = Regex::new(
        r"^(?P<protocol>[A-Za-z]+)/(?P<version>\d+(?:\.\d+)?) +(?P<status_code>\d{3})(?: .*)?$"
    )
    .unwrap();
}

/// The raw halves of a fixture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureDocument {
    pub request_block: String,
    pub response_block: String,
}

impl FixtureDocument {
    /// Splits `content` on its single `---` line.
    pub fn split(name: &str, content: &str) -> Result<Self> {
        let content = content.replace("\r\n", "\n");
        let mut separators = SEPARATOR_REGEX.find_iter(&content);

        let separator = separators
            .next()
            .ok_or_else(|| Error::malformed(name, "missing `---` separator line"))?;
        if separators.next().is_some() {
            return Err(Error::malformed(
                name,
                "expected exactly one `---` separator line",
            ));
        }

        let request_block = &content[..separator.start()];
        let response_block = &content[separator.end()..];

        if request_block.trim().is_empty() {
            return Err(Error::malformed(name, "request block is empty"));
        }
        if response_block.trim().is_empty() {
            return Err(Error::malformed(name, "response block is empty"));
        }

        Ok(Self {
            request_block: request_block.into(),
            response_block: response_block.into(),
        })
    }
}

/// Parses fixture text. `name` only labels errors.
pub fn parse_fixture(name: &str, content: &str) -> Result<(ParsedRequest, ParsedResponse)> {
    let document = FixtureDocument::split(name, content)?;

    let request = parse_request(&document.request_block)
        .map_err(|reason| Error::malformed(name, format!("request block: {}", reason)))?;
    let response = parse_response(&document.response_block)
        .map_err(|reason| Error::malformed(name, format!("response block: {}", reason)))?;

    Ok((request, response))
}

pub fn load_fixture<P: AsRef<Path>>(
    name: &str,
    path: P,
) -> Result<(ParsedRequest, ParsedResponse)> {
    let content = fs::read_to_string(path)?;
    parse_fixture(name, &content)
}

struct Block<'a> {
    start_line: &'a str,
    header_lines: Vec<&'a str>,
    body: Option<String>,
}

fn is_closing_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

/// Reads the `http request` fence and the body fence after it line by line.
/// A body line may hold backticks; only a line that is exactly three
/// backticks closes a fence.
fn parse_block(block: &str) -> std::result::Result<Block<'_>, String> {
    let mut lines = block
        .lines()
        .skip_while(|line| line.trim_end() != BLOCK_MARKER)
        .skip(1);

    let start_line = lines
        .next()
        .map(str::trim)
        .filter(|line| !line.starts_with(FENCE))
        .ok_or_else(|| format!("no {} fence with a start line", BLOCK_MARKER))?;

    let mut header_lines = Vec::new();
    loop {
        match lines.next() {
            Some(line) if is_closing_fence(line) => break,
            Some(line) => header_lines.push(line),
            None => return Err(format!("unterminated {} fence", BLOCK_MARKER)),
        }
    }

    let body = match lines.find(|line| BODY_FENCE_REGEX.is_match(line.trim_end())) {
        None => None,
        Some(_) => {
            let mut body_lines = Vec::new();
            loop {
                match lines.next() {
                    Some(line) if is_closing_fence(line) => break,
                    Some(line) => body_lines.push(line),
                    None => return Err("unterminated body fence".into()),
                }
            }
            Some(body_lines.join("\n"))
        }
    };

    Ok(Block {
        start_line,
        header_lines,
        body,
    })
}

fn parse_request(block: &str) -> std::result::Result<ParsedRequest, String> {
    let block = parse_block(block)?;
    let captures = REQUEST_LINE_REGEX
        .captures(block.start_line)
        .ok_or_else(|| format!("`{}` is not `<METHOD> <URI>`", block.start_line))?;

    Ok(ParsedRequest {
        method: captures["method"].into(),
        uri: captures["uri"].trim().into(),
        headers: parse_headers(&block.header_lines)?,
        body: block.body.unwrap_or_default(),
    })
}

fn parse_response(block: &str) -> std::result::Result<ParsedResponse, String> {
    let block = parse_block(block)?;
    let captures = STATUS_LINE_REGEX.captures(block.start_line).ok_or_else(|| {
        format!(
            "`{}` is not `<PROTOCOL>/<VERSION> <STATUS_CODE> <REASON_PHRASE>`",
            block.start_line
        )
    })?;
    let status_code = captures["status_code"]
        .parse()
        .map_err(|_| format!("invalid status code `{}`", &captures["status_code"]))?;

    let version = &captures["version"];
    // `HTTP/2` is the same version hyper reports as `2.0`
    let protocol_version = if version.contains('.') {
        version.to_owned()
    } else {
        format!("{}.0", version)
    };

    Ok(ParsedResponse {
        protocol_version,
        status_code,
        headers: parse_headers(&block.header_lines)?,
        body: block.body.unwrap_or_default(),
    })
}

fn parse_headers(header_lines: &[&str]) -> std::result::Result<Headers, String> {
    let mut headers = Headers::new();

    for line in header_lines.iter().filter(|line| !line.trim().is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| format!("header line `{}` has no `:`", line))?;
        headers.insert(name.trim().into(), value.trim().into());
    }

    Ok(headers)
}

/// Writes a request/response pair in the fixture format.
pub fn render_fixture(request: &ParsedRequest, response: &ParsedResponse) -> String {
    let mut fixture = String::new();

    render_block(
        &mut fixture,
        &format!("{} {}", request.method, request.uri),
        &request.headers,
        &request.body,
    );
    fixture.push_str("---\n\n");

    let reason = StatusCode::from_u16(response.status_code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown");
    render_block(
        &mut fixture,
        &format!(
            "HTTP/{} {} {}",
            response.protocol_version, response.status_code, reason
        ),
        &response.headers,
        &response.body,
    );

    fixture
}

fn render_block(out: &mut String, start_line: &str, headers: &Headers, body: &str) {
    // writing into a String cannot fail
    let _ = writeln!(out, "{}\n{}", BLOCK_MARKER, start_line);
    for (name, value) in headers {
        let _ = writeln!(out, "{}: {}", name, value);
    }
    out.push_str("```\n");

    if !body.is_empty() {
        let _ = writeln!(out, "\n```\n{}\n```", body);
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const POST_FIXTURE: &str = "\
```http request
POST /api/examples
Content-Type: application/json
X-Trace:  abc:def
```

```json
{\"title\": \"Hello\"}
```

---

```http request
HTTP/1.1 201 Created
content-type: application/json
```

```json
{\"id\": @integer@, \"title\": \"Hello\"}
```
";

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(name, value)| (String::from(*name), String::from(*value)))
            .collect()
    }

    #[test]
    fn parses_request_and_response_halves() {
        let (request, response) = parse_fixture("post.md", POST_FIXTURE).unwrap();

        assert_eq!(
            request,
            ParsedRequest {
                method: "POST".into(),
                uri: "/api/examples".into(),
                headers: headers(&[
                    ("Content-Type", "application/json"),
                    ("X-Trace", "abc:def"),
                ]),
                body: "{\"title\": \"Hello\"}".into(),
            }
        );
        assert_eq!(
            response,
            ParsedResponse {
                protocol_version: "1.1".into(),
                status_code: 201,
                headers: headers(&[("content-type", "application/json")]),
                body: "{\"id\": @integer@, \"title\": \"Hello\"}".into(),
            }
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(
            parse_fixture("post.md", POST_FIXTURE).unwrap(),
            parse_fixture("post.md", POST_FIXTURE).unwrap()
        );
    }

    #[test]
    fn missing_body_fence_gives_empty_body() {
        let content = "```http request\nGET /api/examples/2\n```\n---\n```http request\nHTTP/1.1 404 Not Found\n```\n";

        let (request, response) = parse_fixture("get.md", content).unwrap();

        assert_eq!(request.method, "GET");
        assert_eq!(request.uri, "/api/examples/2");
        assert!(request.headers.is_empty());
        assert_eq!(request.body, "");
        assert_eq!(response.status_code, 404);
        assert_eq!(response.body, "");
    }

    #[test]
    fn accepts_crlf_line_endings_and_unlabelled_body_fence() {
        let content = "```http request\r\nGET /x\r\n```\r\n---\r\n```http request\r\nHTTP/2 200\r\n```\r\n```\r\nok\r\n```\r\n";

        let (_, response) = parse_fixture("crlf.md", content).unwrap();

        assert_eq!(response.protocol_version, "2.0");
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "ok");
    }

    #[test]
    fn bare_major_version_reads_like_hyper_reports_it() {
        let content = "```http request\nGET /x\n```\n---\n```http request\nHTTP/2 204\n```\n";

        let (_, response) = parse_fixture("h2.md", content).unwrap();

        assert_eq!(
            response.protocol_version,
            crate::util::protocol_version(hyper::Version::HTTP_2)
        );
    }

    #[test]
    fn body_may_contain_backticks() {
        let content = "```http request\nPOST /api/examples\n```\n\n```json\n{\"title\": \"use `cargo`\"}\n```\n---\n```http request\nHTTP/1.1 201 Created\n```\n\n```json\n{\"id\": @integer@, \"title\": \"use ``` here\"}\n```\n";

        let (request, response) = parse_fixture("backticks.md", content).unwrap();

        assert_eq!(request.body, "{\"title\": \"use `cargo`\"}");
        assert_eq!(response.body, "{\"id\": @integer@, \"title\": \"use ``` here\"}");
    }

    #[test]
    fn unterminated_body_fence_is_malformed() {
        let content = "```http request\nPOST /api/examples\n```\n\n```json\n{\"title\": \"Hello\"}\n---\n```http request\nHTTP/1.1 201 Created\n```\n";

        let error = parse_fixture("open.md", content).unwrap_err();

        assert_eq!(
            error.to_string(),
            "Malformed fixture open.md: request block: unterminated body fence"
        );
    }

    #[test]
    fn unterminated_request_fence_is_malformed() {
        let content = "```http request\nGET /x\nAccept: a\n---\n```http request\nHTTP/1.1 200 OK\n```\n";

        let error = parse_fixture("open.md", content).unwrap_err();

        assert!(error.to_string().contains("unterminated ```http request fence"));
    }

    #[test]
    fn repeated_header_keeps_last_value() {
        let content = "```http request\nGET /x\nAccept: a\nAccept: b\n```\n---\n```http request\nHTTP/1.1 200 OK\n```\n";

        let (request, _) = parse_fixture("dup.md", content).unwrap();

        assert_eq!(request.headers, headers(&[("Accept", "b")]));
    }

    #[test]
    fn missing_separator_is_malformed() {
        let content = "```http request\nGET /x\n```\n```http request\nHTTP/1.1 200 OK\n```\n";

        let error = parse_fixture("fixtures/no_separator.md", content).unwrap_err();

        match error {
            Error::MalformedFixture { fixture, reason } => {
                assert_eq!(fixture, "fixtures/no_separator.md");
                assert!(reason.contains("separator"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn second_separator_is_malformed() {
        let content = "```http request\nGET /x\n```\n---\n```http request\nHTTP/1.1 200 OK\n```\n---\n";

        let error = parse_fixture("two.md", content).unwrap_err();

        assert!(error.to_string().contains("exactly one"));
    }

    #[test]
    fn empty_half_is_malformed() {
        let error = parse_fixture("empty.md", "\n---\n```http request\nHTTP/1.1 200 OK\n```\n")
            .unwrap_err();

        assert!(error.to_string().contains("request block is empty"));
    }

    #[test]
    fn bad_status_line_is_malformed() {
        let content = "```http request\nGET /x\n```\n---\n```http request\n200 OK\n```\n";

        let error = parse_fixture("status.md", content).unwrap_err();

        assert!(error.to_string().starts_with("Malformed fixture status.md: response block"));
    }

    #[test]
    fn header_line_without_colon_is_malformed() {
        let content = "```http request\nGET /x\nnot a header\n```\n---\n```http request\nHTTP/1.1 200 OK\n```\n";

        let error = parse_fixture("header.md", content).unwrap_err();

        assert!(error.to_string().contains("has no `:`"));
    }

    #[test]
    fn rendered_fixture_parses_back_to_the_same_pair() {
        let request = ParsedRequest {
            method: "POST".into(),
            uri: "/api/examples?draft=true".into(),
            headers: headers(&[("X-Auth-Token", "token"), ("Accept", "*/*")]),
            body: "{\n  \"title\": \"Hello\"\n}\n".into(),
        };
        let response = ParsedResponse {
            protocol_version: "1.1".into(),
            status_code: 201,
            headers: headers(&[("content-type", "application/json")]),
            body: "{\"id\": @integer@, \"title\": \"Hello\"}".into(),
        };

        let rendered = render_fixture(&request, &response);

        assert!(rendered.contains("HTTP/1.1 201 Created"));
        assert_eq!(
            parse_fixture("rendered.md", &rendered).unwrap(),
            (request, response)
        );
    }

    #[test]
    fn loads_fixture_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.md");
        fs::write(&path, POST_FIXTURE).unwrap();

        let (request, _) = load_fixture("post.md", &path).unwrap();

        assert_eq!(request.method, "POST");
    }
}
