#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use colored::Colorize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use crate::{
    grade::Severity,
    links::BadgeLinks,
    report::{CheckResult, GradeResult},
};

#[derive(Tabled)]
/// One row of the check overview table
struct CheckRow {
    /// * `name`: check name
    #[tabled(rename = "Check")]
    name:        String,
    /// * `score`: scaled percentage
    #[tabled(rename = "Score")]
    score:       String,
    /// * `issues`: number of problems
    #[tabled(rename = "Issues")]
    issues:      usize,
    /// * `description`: what the check looks for, or why it failed
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&CheckResult> for CheckRow {
    fn from(check: &CheckResult) -> Self {
        Self {
            name:        check.name.clone(),
            score:       format!("{}%", check.display_percentage()),
            issues:      check.issue_count(),
            description: if check.errored() {
                format!("error: {}", check.error)
            } else {
                check.description.clone()
            },
        }
    }
}

/// Colored one-line summary, eg. `Grade: A+ (95.3%) Excellent!`.
pub fn headline(result: &GradeResult) -> String {
    let percentage = result.percentage();
    let message = result.grade().map(|g| g.message()).unwrap_or_default();
    let grade = format!("Grade: {} ({percentage:.1}%)", result.grade_label())
        .color(Severity::from_percentage(percentage).color())
        .bold();

    if message.is_empty() {
        grade.to_string()
    } else {
        format!("{grade} {message}")
    }
}

/// Table of every check, with the repository in the header and totals in
/// the footer.
pub fn overview(result: &GradeResult) -> String {
    let rows: Vec<CheckRow> = result.scores.iter().map(CheckRow::from).collect();
    let files = result
        .files
        .map(|f| f.to_string())
        .unwrap_or_else(|| "?".to_string());

    Table::new(&rows)
        .with(Panel::header(format!("Report card for {}", result.repo)))
        .with(Panel::footer(format!("Files: {files}  Issues: {}", result.issue_count())))
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(48).keep_words(true)))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(
            Modify::new(Rows::last())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}

/// Every problem, grouped by check and file.
pub fn issue_listing(result: &GradeResult) -> String {
    let mut out = String::new();
    for check in result.scores.iter().filter(|c| c.issue_count() > 0) {
        out.push_str(&format!("{}: {}%\n", check.name.bold(), check.display_percentage()));
        for summary in &check.file_summaries {
            out.push_str(&format!("\t{}\n", summary.filename));
            for issue in &summary.errors {
                out.push_str(&format!("\t\tLine {}: {}\n", issue.line_number, issue.error_string));
            }
        }
    }
    out
}

/// Markdown and HTML embed snippets for a badge.
pub fn badge_snippets(links: &BadgeLinks) -> String {
    format!(
        "{}\n{}\n\n{}\n{}\n\n{}\n{}\n",
        "Markdown".bold(),
        links.markdown(),
        "HTML".bold(),
        links.html(),
        "Report".bold(),
        links.url()
    )
}
