//! Replays the markdown fixtures under `fixtures/` against the example API.

use example_api::ExampleApi;
use fixture_harness::{fixture_tests, HarnessConfiguration, HeaderNameComparison, ServiceClient};

pub const AUTH_TOKEN: &str = "e1f4ec0d-54df-465e-8cf3-78dad2ca8463";

#[fixture_tests("fixtures")]
pub fn example_api() -> ServiceClient<ExampleApi> {
    ServiceClient::new(ExampleApi::default())
}

#[fixture_tests("fixtures-auth", configure_auth_fixtures, extension = "md")]
pub fn example_api_with_auth() -> ServiceClient<ExampleApi> {
    ServiceClient::new(ExampleApi::builder().with_auth_token(AUTH_TOKEN).build())
}

// the auth fixtures spell header names the way clients send them
pub fn configure_auth_fixtures(configuration: &mut HarnessConfiguration) {
    configuration.set_header_name_comparison(HeaderNameComparison::CaseInsensitive);
}

#[cfg(test)]
mod tests {
    use super::*;
    use example_api::{server, FixedIdGenerator};
    use fixture_harness::{
        fixture, runner, FixtureRunner, FixtureStatus, ParsedRequest, RemoteClient,
    };
    use pretty_assertions::assert_eq;
    use std::{fs, path::Path};

    const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

    #[tokio::test]
    async fn every_fixture_passes_in_process() {
        let runner = FixtureRunner::new(HarnessConfiguration::new(FIXTURES_DIR), example_api);

        let report = runner.run_all().await;

        assert!(report.is_success(), "{}", report);
        assert_eq!(report.outcomes().len(), 6);
    }

    #[tokio::test]
    async fn malformed_fixture_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        fs::copy(
            Path::new(FIXTURES_DIR).join("get_example.md"),
            dir.path().join("a_get_example.md"),
        )
        .unwrap();
        fs::write(
            dir.path().join("b_broken.md"),
            "```http request\nGET /api/examples/1\n```\n```http request\nHTTP/1.1 200 OK\n```\n",
        )
        .unwrap();
        fs::copy(
            Path::new(FIXTURES_DIR).join("get_missing_example.md"),
            dir.path().join("c_get_missing_example.md"),
        )
        .unwrap();

        let report = FixtureRunner::new(HarnessConfiguration::new(dir.path()), example_api)
            .run_all()
            .await;

        assert_eq!(report.passed_count(), 2);
        let broken = report.failures().collect::<Vec<_>>();
        assert_eq!(broken.len(), 1);
        assert!(broken[0].name.ends_with("b_broken.md"));
        match &broken[0].status {
            FixtureStatus::Malformed(error) => {
                assert!(error.to_string().contains("b_broken.md"), "{}", error)
            }
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[tokio::test]
    async fn failing_expectations_are_all_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("wrong.md"),
            "```http request\nGET /api/examples/1\n```\n---\n```http request\nHTTP/1.1 201 Created\ncontent-type: text/html\n```\n```json\n{\"id\": 1, \"title\": \"Other\"}\n```\n",
        )
        .unwrap();

        let report = FixtureRunner::new(HarnessConfiguration::new(dir.path()), example_api)
            .run_all()
            .await;

        match &report.outcomes()[0].status {
            FixtureStatus::Failed(failures) => assert_eq!(failures.len(), 3),
            other => panic!("unexpected status: {:?}", other),
        }
        assert!(report.to_string().contains("Status codes differ. expected - 201, actual - 200"));
        assert!(report.to_string().contains("bodies differ at $.title"));
    }

    #[tokio::test]
    async fn created_ids_come_from_the_injected_generator() {
        let mut client = ServiceClient::new(
            ExampleApi::builder()
                .with_id_generator(FixedIdGenerator(99))
                .build(),
        );
        let (request, _) = fixture::load_fixture(
            "create_example.md",
            Path::new(FIXTURES_DIR).join("create_example.md"),
        )
        .unwrap();

        let actual = runner::dispatch(&mut client, &request).await.unwrap();

        assert_eq!(actual.status_code, 201);
        assert_eq!(actual.body, r#"{"id":99,"title":"Hello"}"#);
    }

    #[tokio::test]
    async fn protocol_version_and_headers_are_captured() {
        let mut client = example_api();
        let request = ParsedRequest {
            method: "GET".into(),
            uri: "/api/examples/1".into(),
            ..Default::default()
        };

        let actual = runner::dispatch(&mut client, &request).await.unwrap();

        assert_eq!(actual.protocol_version, "1.1");
        assert_eq!(
            actual.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn fixtures_pass_against_a_running_server() {
        let (address, server) =
            server::bind(([127, 0, 0, 1], 0).into(), ExampleApi::default()).unwrap();
        let server = tokio::spawn(server);

        let report = FixtureRunner::new(HarnessConfiguration::new(FIXTURES_DIR), || {
            RemoteClient::new(format!("http://{}", address))
        })
        .run_all()
        .await;

        server.abort();
        assert!(report.is_success(), "{}", report);
    }
}
