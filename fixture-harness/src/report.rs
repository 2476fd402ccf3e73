use crate::{assertion::AssertionFailure, error::Error};
use std::fmt::{self, Display};

#[derive(Debug)]
pub enum FixtureStatus {
    Passed,
    /// The fixture file could not be parsed.
    Malformed(Error),
    Failed(Vec<AssertionFailure>),
    /// Reading the file or dispatching the request failed.
    Errored(Error),
}

#[derive(Debug)]
pub struct FixtureOutcome {
    pub name: String,
    pub status: FixtureStatus,
}

impl FixtureOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.status, FixtureStatus::Passed)
    }
}

impl Display for FixtureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            FixtureStatus::Passed => write!(f, "PASS {}", self.name),
            FixtureStatus::Malformed(error) => write!(f, "MALFORMED {}: {}", self.name, error),
            FixtureStatus::Errored(error) => write!(f, "ERROR {}: {}", self.name, error),
            FixtureStatus::Failed(failures) => {
                write!(f, "FAIL {}", self.name)?;
                for (number, failure) in failures.iter().enumerate() {
                    write!(f, "\n  {}. {}", number + 1, failure)?;
                }
                Ok(())
            }
        }
    }
}

/// Outcomes of every fixture in one run, in discovery order.
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<FixtureOutcome>,
}

impl RunReport {
    pub fn push(&mut self, outcome: FixtureOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[FixtureOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, name: &str) -> Option<&FixtureOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FixtureOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed())
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.passed_count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in self.failures() {
            writeln!(f, "{}", outcome)?;
        }

        write!(
            f,
            "{} fixtures, {} passed, {} failed",
            self.outcomes.len(),
            self.passed_count(),
            self.failed_count()
        )
    }
}
