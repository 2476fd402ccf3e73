use crate::{
    discovery::FixtureDiscovery,
    matchers::{BodyMatcher, JsonMatcher},
};
use std::{env, path::PathBuf, sync::Arc};

pub const FIXTURES_DIR_VARIABLE: &str = "FIXTURES_DIR";
const DEFAULT_EXTENSION: &str = "md";

/// How expected header names are looked up among the actual response headers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HeaderNameComparison {
    /// The name must equal the transport's header name exactly. hyper reports
    /// names in lowercase.
    CaseSensitive,
    CaseInsensitive,
}

impl HeaderNameComparison {
    pub fn names_equal(self, expected: &str, actual: &str) -> bool {
        match self {
            HeaderNameComparison::CaseSensitive => expected == actual,
            HeaderNameComparison::CaseInsensitive => expected.eq_ignore_ascii_case(actual),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfiguration {
    fixtures_dir: PathBuf,
    extension: String,
    ignore_vcs: bool,
    body_matcher: Arc<dyn BodyMatcher + Send + Sync>,
    header_name_comparison: HeaderNameComparison,
}

impl HarnessConfiguration {
    pub fn new<P: Into<PathBuf>>(fixtures_dir: P) -> Self {
        Self {
            fixtures_dir: fixtures_dir.into(),
            extension: String::from(DEFAULT_EXTENSION),
            ignore_vcs: true,
            body_matcher: Arc::new(JsonMatcher),
            header_name_comparison: HeaderNameComparison::CaseSensitive,
        }
    }

    /// Uses `$FIXTURES_DIR` when set, `default_dir` otherwise.
    pub fn from_env<P: Into<PathBuf>>(default_dir: P) -> Self {
        match env::var_os(FIXTURES_DIR_VARIABLE) {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::new(default_dir),
        }
    }

    pub fn fixtures_dir(&self) -> &PathBuf {
        &self.fixtures_dir
    }

    pub fn set_fixtures_dir<P: Into<PathBuf>>(&mut self, fixtures_dir: P) {
        self.fixtures_dir = fixtures_dir.into();
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn set_extension<S: Into<String>>(&mut self, extension: S) {
        self.extension = extension.into();
    }

    pub fn ignore_vcs(&self) -> bool {
        self.ignore_vcs
    }

    pub fn set_ignore_vcs(&mut self, value: bool) {
        self.ignore_vcs = value;
    }

    pub fn body_matcher(&self) -> Arc<dyn BodyMatcher + Send + Sync> {
        self.body_matcher.clone()
    }

    pub fn set_body_matcher<M: BodyMatcher + Send + Sync + 'static>(&mut self, matcher: M) {
        self.body_matcher = Arc::new(matcher);
    }

    pub fn header_name_comparison(&self) -> HeaderNameComparison {
        self.header_name_comparison
    }

    pub fn set_header_name_comparison(&mut self, comparison: HeaderNameComparison) {
        self.header_name_comparison = comparison;
    }

    pub fn discovery(&self) -> FixtureDiscovery {
        let mut discovery = FixtureDiscovery::new(&self.fixtures_dir, &self.extension);
        discovery.set_ignore_vcs(self.ignore_vcs);
        discovery
    }
}

impl Default for HarnessConfiguration {
    fn default() -> Self {
        Self::new("tests/fixtures")
    }
}
