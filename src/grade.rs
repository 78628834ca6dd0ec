#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt::Display, str::FromStr};

use colored::Color;
use serde::{Deserialize, Serialize};

/// A letter grade summarizing repository quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// `A+`
    #[serde(rename = "A+")]
    APlus,
    /// `A`
    A,
    /// `B`
    B,
    /// `C`
    C,
    /// `D`
    D,
    /// `E`
    E,
    /// `F`
    F,
}

impl Grade {
    /// Every grade, best first.
    pub const ALL: [Grade; 7] = [
        Grade::APlus,
        Grade::A,
        Grade::B,
        Grade::C,
        Grade::D,
        Grade::E,
        Grade::F,
    ];

    /// Returns the letter as it appears on the wire, eg. `A+`.
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
        }
    }

    /// Returns the human-readable phrase shown next to the grade.
    pub fn message(self) -> &'static str {
        match self {
            Grade::APlus => "Excellent!",
            Grade::A => "Great!",
            Grade::B => "Not bad!",
            Grade::C => "Needs some work",
            Grade::D => "Needs lots of improvement",
            Grade::E => "Urgent improvement needed",
            Grade::F => "... is for lots of things to Fix!",
        }
    }

    /// Maps an overall score in `[0, 100]` to a grade. Bands are strict
    /// greater-than, so exactly 90 is an `A`.
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p > 90.0 => Grade::APlus,
            p if p > 80.0 => Grade::A,
            p if p > 70.0 => Grade::B,
            p if p > 60.0 => Grade::C,
            p if p > 50.0 => Grade::D,
            p if p > 40.0 => Grade::E,
            _ => Grade::F,
        }
    }

    /// Whether the grade reads "an A" rather than "a B".
    pub fn takes_an(self) -> bool {
        matches!(self, Grade::A | Grade::APlus)
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the seven known grades.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("`{0}` is not a recognised grade (expected one of A+, A, B, C, D, E, F)")]
pub struct GradeParseError(pub String);

impl FromStr for Grade {
    type Err = GradeParseError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| GradeParseError(s.to_string()))
    }
}

/// Looks up the message for a raw grade string. Unknown grades have no
/// message.
pub fn grade_message(grade: &str) -> Option<&'static str> {
    grade.parse::<Grade>().ok().map(Grade::message)
}

/// Display category for a percentage, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Below 30.
    Danger,
    /// From 30 up to 50.
    Warning,
    /// From 50 up to 80.
    Info,
    /// 80 and above.
    Success,
}

impl Severity {
    /// Classifies a percentage in `[0, 100]`. Thresholds are checked in
    /// ascending order and the first match wins.
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p < 30.0 => Severity::Danger,
            p if p < 50.0 => Severity::Warning,
            p if p < 80.0 => Severity::Info,
            _ => Severity::Success,
        }
    }

    /// Category name, eg. `danger`.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Danger => "danger",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Success => "success",
        }
    }

    /// CSS modifier class used by progress bars and tags, eg. `is-danger`.
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Danger => "is-danger",
            Severity::Warning => "is-warning",
            Severity::Info => "is-info",
            Severity::Success => "is-success",
        }
    }

    /// Terminal color for the category.
    pub fn color(self) -> Color {
        match self {
            Severity::Danger => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Info => Color::Cyan,
            Severity::Success => Color::Green,
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
