//! Check failure classification
//!
//! Different check integrations populate different subsets of fields, so a
//! check counts as failing if any one of its fields says so.

use crate::types::{CheckRun, normalize_field};
use regex::Regex;
use std::sync::LazyLock;

/// Which field of a check a rule inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckField {
    /// Terminal conclusion
    Conclusion,
    /// Lifecycle state or status
    State,
    /// Coarse bucket
    Bucket,
}

impl CheckField {
    fn read(self, check: &CheckRun) -> String {
        let raw = match self {
            Self::Conclusion => check.conclusion.as_deref(),
            Self::State => check.state.as_deref(),
            Self::Bucket => check.bucket.as_deref(),
        };
        normalize_field(raw)
    }
}

/// Failure rules, evaluated in order. Any match marks the check failing.
pub const FAILURE_RULES: &[(CheckField, &[&str])] = &[
    (
        CheckField::Conclusion,
        &["failure", "cancelled", "timed_out", "action_required"],
    ),
    (
        CheckField::State,
        &["failure", "error", "cancelled", "timed_out", "action_required"],
    ),
    (CheckField::Bucket, &["fail"]),
];

/// Whether a check counts as failing
pub fn is_failing(check: &CheckRun) -> bool {
    FAILURE_RULES.iter().any(|(field, values)| {
        let value = field.read(check);
        !value.is_empty() && values.contains(&value.as_str())
    })
}

/// Keep only failing checks, preserving host order
pub fn failing_checks(checks: &[CheckRun]) -> Vec<&CheckRun> {
    checks.iter().filter(|c| is_failing(c)).collect()
}

static RUN_ID_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"/actions/runs/(\d+)").expect("valid regex"),
        Regex::new(r"/runs/(\d+)").expect("valid regex"),
    ]
});

static JOB_ID_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"/actions/runs/\d+/job/(\d+)").expect("valid regex"),
        Regex::new(r"/job/(\d+)").expect("valid regex"),
    ]
});

fn first_capture(patterns: &[Regex], url: &str) -> Option<u64> {
    patterns
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extract the workflow run id from a check details URL
pub fn extract_run_id(url: &str) -> Option<u64> {
    if url.is_empty() {
        return None;
    }
    first_capture(RUN_ID_PATTERNS.as_slice(), url)
}

/// Extract the job id from a check details URL
pub fn extract_job_id(url: &str) -> Option<u64> {
    if url.is_empty() {
        return None;
    }
    first_capture(JOB_ID_PATTERNS.as_slice(), url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_from_job_url() {
        let url = "https://github.com/o/r/actions/runs/123/job/456";
        assert_eq!(extract_run_id(url), Some(123));
        assert_eq!(extract_job_id(url), Some(456));
    }

    #[test]
    fn test_run_id_bare_runs_shape() {
        assert_eq!(extract_run_id("https://ci.example.com/runs/77"), Some(77));
        assert_eq!(extract_job_id("https://ci.example.com/runs/77"), None);
    }

    #[test]
    fn test_job_id_bare_shape() {
        assert_eq!(extract_job_id("https://ci.example.com/job/9"), Some(9));
        assert_eq!(extract_run_id("https://ci.example.com/job/9"), None);
    }

    #[test]
    fn test_external_url_has_no_ids() {
        let url = "https://app.circleci.com/pipelines/github/o/r/12";
        assert_eq!(extract_run_id(url), None);
        assert_eq!(extract_job_id(url), None);
        assert_eq!(extract_run_id(""), None);
    }
}
