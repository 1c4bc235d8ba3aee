//! Expected failures tracking via TOML file.

use crate::{load_all_fixtures, run_fixture, FixtureError, FixtureResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Loaded expected failures configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedFailures {
    /// Known failures (won't fix soon).
    #[serde(default)]
    pub known: Vec<FailureEntry>,
    /// Pending failures (awaiting fix).
    #[serde(default)]
    pub pending: Vec<FailureEntry>,
}

/// A single expected failure entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    /// Fixture path relative to the fixtures directory.
    pub fixture: String,
    /// Query label (its name, or `#<position> <Op>`).
    pub query: String,
    #[serde(default)]
    pub reason: Option<String>,
    /// Related issue URL.
    #[serde(default)]
    pub issue: Option<String>,
}

/// Failure lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureState {
    /// Known limitation, won't fix soon.
    Known,
    /// Awaiting fix, not blocking.
    Pending,
    /// Expected to pass - failure is a regression.
    Regression,
}

impl ExpectedFailures {
    /// Load from a TOML file. A missing file means no expected failures.
    pub fn load(path: &Path) -> FixtureResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let load_error = |message: String| FixtureError::Load {
            path: path.display().to_string(),
            message,
        };
        let content = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        toml::from_str(&content).map_err(|e| load_error(e.to_string()))
    }

    pub fn is_expected(&self, fixture: &str, query: &str) -> FailureState {
        if self.known.iter().any(|e| e.fixture == fixture && e.query == query) {
            return FailureState::Known;
        }
        if self.pending.iter().any(|e| e.fixture == fixture && e.query == query) {
            return FailureState::Pending;
        }
        FailureState::Regression
    }

    pub fn count(&self) -> usize {
        self.known.len() + self.pending.len()
    }
}

/// Result of running the harness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessResult {
    /// Total queries checked.
    pub total: usize,
    pub passed: usize,
    /// Expected failures (known + pending).
    pub expected_failures: usize,
    /// Regressions (unexpected failures).
    pub regressions: usize,
}

impl HarnessResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the exit code (0 = pass, 1 = regressions).
    pub fn exit_code(&self) -> i32 {
        if self.regressions > 0 {
            1
        } else {
            0
        }
    }

    /// Check if all tests passed (no regressions).
    pub fn success(&self) -> bool {
        self.regressions == 0
    }

    pub fn record_pass(&mut self) {
        self.total += 1;
        self.passed += 1;
    }

    pub fn record_failure(&mut self, state: FailureState) {
        self.total += 1;
        match state {
            FailureState::Known | FailureState::Pending => {
                self.expected_failures += 1;
            }
            FailureState::Regression => {
                self.regressions += 1;
            }
        }
    }
}

/// Run every fixture under `dir`, classifying failures against `expected`.
pub fn run_harness(dir: &Path, expected: &ExpectedFailures) -> FixtureResult<HarnessResult> {
    let mut result = HarnessResult::new();
    for (name, fixture) in load_all_fixtures(dir)? {
        let report = run_fixture(&fixture)?;
        for outcome in &report.outcomes {
            if outcome.passed() {
                result.record_pass();
            } else {
                result.record_failure(expected.is_expected(&name, &outcome.label));
            }
        }
        if !report.success() {
            tracing::warn!(summary = %report.summary(&name), "fixture failed");
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_expected_regression() {
        let failures = ExpectedFailures::default();
        assert_eq!(failures.count(), 0);
        assert_eq!(
            failures.is_expected("covering.toml", "#0 Covering"),
            FailureState::Regression
        );
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"
[[known]]
fixture = "covering.toml"
query = "far covering"
reason = "Scan bound too tight"

[[pending]]
fixture = "relative.toml"
query = "#3 Preceding"
"##
        )
        .unwrap();

        let failures = ExpectedFailures::load(file.path()).unwrap();
        assert_eq!(failures.count(), 2);
        assert_eq!(
            failures.is_expected("covering.toml", "far covering"),
            FailureState::Known
        );
        assert_eq!(
            failures.is_expected("relative.toml", "#3 Preceding"),
            FailureState::Pending
        );
        assert_eq!(
            failures.is_expected("relative.toml", "far covering"),
            FailureState::Regression
        );
    }

    #[test]
    fn test_load_reports_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "known = \"covering.toml\"").unwrap();

        let err = ExpectedFailures::load(file.path()).unwrap_err();
        assert!(matches!(err, FixtureError::Load { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_load_missing_file() {
        let failures = ExpectedFailures::load(Path::new("/nonexistent/path.toml")).unwrap();
        assert_eq!(failures.count(), 0);
    }

    #[test]
    fn test_harness_result_exit_code() {
        let mut result = HarnessResult::new();
        result.record_pass();
        result.record_failure(FailureState::Known);
        assert_eq!(result.exit_code(), 0);
        result.record_failure(FailureState::Regression);
        assert_eq!(result.exit_code(), 1);
        assert_eq!(result.total, 3);
    }
}
