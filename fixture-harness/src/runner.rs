use crate::{
    assertion::AssertionFailure,
    configuration::HarnessConfiguration,
    data::{ActualResponse, ParsedRequest, ParsedResponse},
    error::Error,
    fixture,
    http_client::ApiClient,
    report::{FixtureOutcome, FixtureStatus, RunReport},
    util,
};
use hyper::{body, Body, Method, Request, Uri};
use std::path::Path;
use tracing::{debug, info, warn};

/// Replays fixtures one at a time, each against a fresh client from
/// `client_factory`.
#[derive(Debug)]
pub struct FixtureRunner<F> {
    configuration: HarnessConfiguration,
    client_factory: F,
}

impl<F, C> FixtureRunner<F>
where
    F: Fn() -> C,
    C: ApiClient,
{
    pub fn new(configuration: HarnessConfiguration, client_factory: F) -> Self {
        Self {
            configuration,
            client_factory,
        }
    }

    pub fn configuration(&self) -> &HarnessConfiguration {
        &self.configuration
    }

    /// Runs every fixture under the configured directory.
    pub async fn run_all(&self) -> RunReport {
        let discovery = self.configuration.discovery();
        let mut report = RunReport::default();

        for file in &discovery {
            let outcome = match file {
                Ok(file) => self.run_fixture(&file.name, &file.path).await,
                Err(e) => {
                    warn!(root = %discovery.root().display(), error = %e, "fixture discovery failed");
                    FixtureOutcome {
                        name: discovery.root().display().to_string(),
                        status: FixtureStatus::Errored(e.into()),
                    }
                }
            };
            report.push(outcome);
        }

        info!(
            fixtures = report.outcomes().len(),
            passed = report.passed_count(),
            failed = report.failed_count(),
            "fixture run finished"
        );

        report
    }

    pub async fn run_fixture(&self, name: &str, path: &Path) -> FixtureOutcome {
        debug!(fixture = name, "running fixture");

        let status = match self.execute(name, path).await {
            Ok(failures) if failures.is_empty() => FixtureStatus::Passed,
            Ok(failures) => {
                for failure in &failures {
                    warn!(fixture = name, "{}", failure);
                }
                FixtureStatus::Failed(failures)
            }
            Err(e @ Error::MalformedFixture { .. }) => {
                warn!(fixture = name, error = %e, "malformed fixture");
                FixtureStatus::Malformed(e)
            }
            Err(e) => {
                warn!(fixture = name, error = %e, "fixture could not be run");
                FixtureStatus::Errored(e)
            }
        };

        FixtureOutcome {
            name: name.into(),
            status,
        }
    }

    /// Runs one fixture and panics with the outcome unless it passes.
    pub async fn assert_fixture<P: AsRef<Path>>(&self, name: &str, path: P) {
        let outcome = self.run_fixture(name, path.as_ref()).await;
        if !outcome.passed() {
            panic!("{}", outcome);
        }
    }

    async fn execute(&self, name: &str, path: &Path) -> Result<Vec<AssertionFailure>, Error> {
        let (request, expected) = fixture::load_fixture(name, path)?;
        let mut client = (self.client_factory)();
        let actual = dispatch(&mut client, &request).await?;

        Ok(assert_response(&self.configuration, &expected, &actual))
    }
}

pub fn build_request(request: &ParsedRequest) -> Result<Request<Body>, Error> {
    let method = Method::from_bytes(request.method.as_bytes())
        .map_err(|_| Error::InvalidMethod(request.method.clone()))?;
    let uri = request
        .uri
        .parse::<Uri>()
        .map_err(|_| Error::InvalidUri(request.uri.clone()))?;

    let mut request_builder = Request::builder().method(method).uri(uri);
    if let Some(headers_mut) = request_builder.headers_mut() {
        util::put_headers(headers_mut, &request.headers)?;
    }

    Ok(request_builder.body(request.body.clone().into())?)
}

pub async fn dispatch<C: ApiClient + ?Sized>(
    client: &mut C,
    request: &ParsedRequest,
) -> Result<ActualResponse, Error> {
    let response = client.send(build_request(request)?).await?;

    let protocol_version = util::protocol_version(response.version());
    let status_code = response.status().as_u16();
    let headers = util::extract_headers(response.headers());
    let body = body::to_bytes(response.into_body()).await?;

    Ok(ActualResponse {
        protocol_version,
        status_code,
        headers,
        body: String::from_utf8_lossy(&body).into(),
    })
}

/// Checks every expectation independently and returns all that failed.
pub fn assert_response(
    configuration: &HarnessConfiguration,
    expected: &ParsedResponse,
    actual: &ActualResponse,
) -> Vec<AssertionFailure> {
    let mut failures = Vec::new();

    if expected.protocol_version != actual.protocol_version {
        failures.push(AssertionFailure::ProtocolVersion {
            expected: expected.protocol_version.clone(),
            actual: actual.protocol_version.clone(),
        });
    }

    if expected.status_code != actual.status_code {
        failures.push(AssertionFailure::StatusCode {
            expected: expected.status_code,
            actual: actual.status_code,
        });
    }

    let comparison = configuration.header_name_comparison();
    for (name, expected_value) in &expected.headers {
        let actual_value = actual
            .headers
            .iter()
            .find(|(actual_name, _)| comparison.names_equal(name, actual_name))
            .map(|(_, value)| value);

        match actual_value {
            None => failures.push(AssertionFailure::HeaderMissing {
                name: name.clone(),
                expected: expected_value.clone(),
            }),
            Some(actual_value) if actual_value != expected_value => {
                failures.push(AssertionFailure::HeaderMismatch {
                    name: name.clone(),
                    expected: expected_value.clone(),
                    actual: actual_value.clone(),
                })
            }
            Some(_) => {}
        }
    }

    if let Err(mismatch) = configuration
        .body_matcher()
        .matches(&expected.body, &actual.body)
    {
        failures.push(AssertionFailure::BodyMismatch {
            mismatch,
            expected: expected.body.clone(),
            actual: actual.body.clone(),
        });
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{configuration::HeaderNameComparison, data::Headers, matchers::ExactMatcher};
    use pretty_assertions::assert_eq;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(name, value)| (String::from(*name), String::from(*value)))
            .collect()
    }

    fn actual() -> ActualResponse {
        ActualResponse {
            protocol_version: "1.1".into(),
            status_code: 200,
            headers: headers(&[
                ("content-type", "application/json"),
                ("content-length", "25"),
            ]),
            body: "{\"id\":1,\"title\":\"Test\"}".into(),
        }
    }

    fn expected() -> ParsedResponse {
        ParsedResponse {
            protocol_version: "1.1".into(),
            status_code: 200,
            headers: headers(&[("content-type", "application/json")]),
            body: "{\"id\": 1, \"title\": \"Test\"}".into(),
        }
    }

    #[test]
    fn extra_actual_headers_are_ignored() {
        let failures = assert_response(&HarnessConfiguration::default(), &expected(), &actual());

        assert_eq!(failures, vec![]);
    }

    #[test]
    fn every_failure_is_reported() {
        let mut expected = expected();
        expected.protocol_version = "2.0".into();
        expected.status_code = 201;
        expected.headers = headers(&[("content-type", "text/plain"), ("location", "/x")]);
        expected.body = "{\"id\": 2, \"title\": \"Test\"}".into();

        let failures = assert_response(&HarnessConfiguration::default(), &expected, &actual());

        assert_eq!(failures.len(), 5);
        assert!(matches!(failures[0], AssertionFailure::ProtocolVersion { .. }));
        assert!(matches!(
            failures[1],
            AssertionFailure::StatusCode {
                expected: 201,
                actual: 200
            }
        ));
        assert!(matches!(&failures[2], AssertionFailure::HeaderMismatch { name, .. } if name == "content-type"));
        assert!(matches!(&failures[3], AssertionFailure::HeaderMissing { name, .. } if name == "location"));
        assert!(matches!(failures[4], AssertionFailure::BodyMismatch { .. }));
    }

    #[test]
    fn header_names_are_case_sensitive_by_default() {
        let mut expected = expected();
        expected.headers = headers(&[("Content-Type", "application/json")]);

        let failures = assert_response(&HarnessConfiguration::default(), &expected, &actual());
        assert!(matches!(&failures[..], [AssertionFailure::HeaderMissing { .. }]));

        let mut configuration = HarnessConfiguration::default();
        configuration.set_header_name_comparison(HeaderNameComparison::CaseInsensitive);
        assert_eq!(assert_response(&configuration, &expected, &actual()), vec![]);
    }

    #[test]
    fn header_values_are_compared_exactly() {
        let mut expected = expected();
        expected.headers = headers(&[("content-type", "Application/JSON")]);

        let failures = assert_response(&HarnessConfiguration::default(), &expected, &actual());

        assert!(matches!(&failures[..], [AssertionFailure::HeaderMismatch { .. }]));
    }

    #[test]
    fn body_matcher_is_pluggable() {
        let mut configuration = HarnessConfiguration::default();
        configuration.set_body_matcher(ExactMatcher);

        let failures = assert_response(&configuration, &expected(), &actual());

        assert!(matches!(&failures[..], [AssertionFailure::BodyMismatch { .. }]));
    }

    #[test]
    fn builds_request_with_transport_header_names() {
        let request = ParsedRequest {
            method: "POST".into(),
            uri: "/api/examples".into(),
            headers: headers(&[("X-Auth-Token", "secret")]),
            body: "{\"title\": \"Hello\"}".into(),
        };

        let built = build_request(&request).unwrap();

        assert_eq!(built.method(), Method::POST);
        assert_eq!(built.uri(), "/api/examples");
        assert_eq!(built.headers()["x-auth-token"], "secret");
    }

    #[test]
    fn rejects_unparseable_method() {
        let request = ParsedRequest {
            method: "G@T".into(),
            uri: "/".into(),
            ..Default::default()
        };

        assert!(matches!(build_request(&request), Err(Error::InvalidMethod(_))));
    }
}
