#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Deserializer, Serialize};
use typed_builder::TypedBuilder;

use crate::grade::{Grade, Severity};

/// Treats an explicit JSON `null` the same as a missing field. The grading
/// backend serializes empty lists as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[builder(doc)]
/// A single problem reported by a check
pub struct Issue {
    /// * `line_number`: line the problem was found on
    pub line_number:  u32,
    /// * `error_string`: the linter's message
    pub error_string: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[builder(doc)]
/// Problems found in one file
pub struct FileSummary {
    /// * `filename`: path of the file within the repository
    pub filename: String,
    /// * `file_url`: link to the file at the graded revision, may be empty
    #[serde(default)]
    pub file_url: String,
    /// * `errors`: problems found in the file
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors:   Vec<Issue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[builder(doc)]
/// The outcome of one named check
pub struct CheckResult {
    /// * `name`: name of the check, eg. `gofmt`
    pub name:           String,
    /// * `description`: what the check looks for
    #[serde(default)]
    pub description:    String,
    /// * `file_summaries`: per-file problems
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_summaries: Vec<FileSummary>,
    /// * `weight`: contribution to the overall score
    #[serde(default)]
    pub weight:         f64,
    /// * `percentage`: passing fraction in `[0, 1]`, before display scaling
    #[serde(default)]
    pub percentage:     f64,
    /// * `error`: set when the check itself failed to run
    #[serde(default)]
    pub error:          String,
    /// Fields this client does not interpret, kept so they survive a
    /// round trip.
    #[serde(flatten)]
    pub extra:          serde_json::Map<String, serde_json::Value>,
}

impl CheckResult {
    /// Percentage scaled to `[0, 100]` and truncated toward zero.
    pub fn display_percentage(&self) -> i64 {
        (self.percentage * 100.0).trunc() as i64
    }

    /// Display category of the scaled percentage.
    pub fn severity(&self) -> Severity {
        Severity::from_percentage(self.display_percentage() as f64)
    }

    /// Total number of problems across all files.
    pub fn issue_count(&self) -> usize {
        self.file_summaries.iter().map(|f| f.errors.len()).sum()
    }

    /// Whether the check failed to run at all.
    pub fn errored(&self) -> bool {
        !self.error.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[builder(doc)]
/// A graded repository as returned by the backend
pub struct GradeResult {
    /// * `grade`: letter grade as sent; may be empty or unknown
    #[serde(default)]
    pub grade:                  String,
    /// * `percentage`: overall score in `[0, 100]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage:             Option<f64>,
    /// * `average`: overall score as a fraction, sent by older backends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average:                Option<f64>,
    /// * `repo`: repository identifier, eg. `github.com/owner/name`
    #[serde(default)]
    pub repo:                   String,
    /// * `resolved_repo`: URL the repository was fetched from
    #[serde(default, rename = "resolvedRepo")]
    pub resolved_repo:          String,
    /// * `scores`: per-check results, in display order
    #[serde(default, alias = "checks", deserialize_with = "null_as_default")]
    pub scores:                 Vec<CheckResult>,
    /// * `files`: number of files graded
    #[serde(default, alias = "files_count", skip_serializing_if = "Option::is_none")]
    pub files:                  Option<u64>,
    /// * `issues`: number of problems found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues:                 Option<u64>,
    /// * `branch`: graded branch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch:                 Option<String>,
    /// * `last_refresh`: timestamp of the grading run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh:           Option<String>,
    /// * `formatted_last_refresh`: absolute, human-formatted timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_last_refresh: Option<String>,
    /// * `humanized_last_refresh`: relative timestamp, eg. `3 hours ago`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humanized_last_refresh: Option<String>,
}

impl GradeResult {
    /// Overall score in `[0, 100]`, falling back to `average * 100` for
    /// results that only carry a fraction.
    pub fn score(&self) -> Option<f64> {
        self.percentage.or(self.average.map(|a| a * 100.0))
    }

    /// Overall score, or zero when the result carries none.
    pub fn percentage(&self) -> f64 {
        self.score().unwrap_or_default()
    }

    /// The classified grade. A blank grade is derived from the score when
    /// there is one; an unrecognised grade classifies as `None`.
    pub fn grade(&self) -> Option<Grade> {
        if self.grade.trim().is_empty() {
            return self.score().map(Grade::from_percentage);
        }
        self.grade.parse().ok()
    }

    /// The grade label to display: the classified grade, or the raw string
    /// when it is unrecognised.
    pub fn grade_label(&self) -> String {
        self.grade()
            .map(|g| g.as_str().to_string())
            .unwrap_or_else(|| self.grade.clone())
    }

    /// Problem count as reported, or summed over the checks.
    pub fn issue_count(&self) -> u64 {
        self.issues
            .unwrap_or_else(|| self.scores.iter().map(|c| c.issue_count() as u64).sum())
    }
}
