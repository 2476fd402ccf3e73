mod assertion;
mod configuration;
mod data;
pub mod discovery;
pub mod error;
pub mod fixture;
mod http_client;
pub mod matchers;
mod report;
pub mod runner;
mod util;

pub use assertion::{line_diff, AssertionFailure};
pub use configuration::{HarnessConfiguration, HeaderNameComparison, FIXTURES_DIR_VARIABLE};
pub use data::{ActualResponse, Headers, ParsedRequest, ParsedResponse};
pub use discovery::{FixtureDiscovery, FixtureFile};
pub use error::Error;
pub use fixture_harness_codegen::fixture_tests;
pub use http_client::{ApiClient, RemoteClient, ServiceClient};
pub use report::{FixtureOutcome, FixtureStatus, RunReport};
pub use runner::FixtureRunner;
