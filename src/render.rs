#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::Serialize;
use serde_json::json;

use crate::{
    constants::RESULTS_HEADING,
    grade::{Grade, Severity},
    links::{BadgeLinks, source_link},
    report::{CheckResult, GradeResult},
    template::{TemplateError, TemplateId, Templates, escape_html},
};

/// A rendered alert, ready to be mounted in the notification area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// The unescaped message.
    pub message: String,
    /// The rendered fragment.
    pub html:    String,
}

/// One check, rendered as a navigation row and a details section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCheck {
    /// Check name.
    pub name:       String,
    /// Percentage scaled to `[0, 100]`.
    pub percentage: i64,
    /// Display category of `percentage`.
    pub severity:   Severity,
    /// Whether the row starts out expanded.
    pub active:     bool,
    /// Navigation row fragment.
    pub nav:        String,
    /// Details fragment.
    pub details:    String,
}

/// Everything the report page mounts for one result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedReport {
    /// Grade header fragment.
    pub grade:        String,
    /// Heading placed above the navigation rows.
    pub heading:      String,
    /// Rendered checks, in result order.
    pub checks:       Vec<RenderedCheck>,
    /// Last-refresh fragment.
    pub last_refresh: String,
    /// Badge dropdown fragment.
    pub badge:        String,
    /// Source link, only set for allowed hosts.
    pub link:         Option<String>,
    /// Badge and report URLs.
    pub badge_links:  BadgeLinks,
}

impl RenderedReport {
    /// Index of the initially expanded check.
    pub fn active_check(&self) -> Option<usize> {
        self.checks.iter().position(|c| c.active)
    }

    /// Assembles the fragments into a standalone HTML document.
    pub fn to_page(&self, title: &str) -> String {
        let nav = self
            .checks
            .iter()
            .map(|c| c.nav.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let details = self
            .checks
            .iter()
            .map(|c| c.details.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<section class="section container-results">
<div class="results-text">
{grade}
</div>
<div class="badge-col">
{badge}
</div>
<div class="container-update">
{last_refresh}
</div>
<div class="columns">
<nav class="panel results column is-one-quarter">
{heading}
{nav}
</nav>
<div class="results-details column">
{details}
</div>
</div>
</section>
</body>
</html>
"#,
            title = escape_html(title),
            grade = self.grade,
            badge = self.badge,
            last_refresh = self.last_refresh,
            heading = self.heading,
        )
    }
}

/// Renders results and alerts through a template registry.
#[derive(Debug, Clone)]
pub struct Renderer<'t> {
    /// Compiled templates.
    templates: &'t Templates,
    /// Public domain used for badge links.
    domain:    String,
}

impl<'t> Renderer<'t> {
    /// Creates a renderer over `templates`, building badge links against
    /// `domain`.
    pub fn new(templates: &'t Templates, domain: impl Into<String>) -> Self {
        Self {
            templates,
            domain: domain.into(),
        }
    }

    /// Returns the template registry.
    pub fn templates(&self) -> &'t Templates {
        self.templates
    }

    /// Returns the badge domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Renders a notification for `message`.
    pub fn alert(&self, message: impl Into<String>) -> Result<Notification, TemplateError> {
        let message = message.into();
        let html = self
            .templates
            .render(TemplateId::Alert, &json!({ "message": message }))?;
        Ok(Notification { message, html })
    }

    /// Classifies `result` and renders every fragment of the report page.
    /// Unknown grades render with an empty message.
    pub fn populate_results(&self, result: &GradeResult) -> Result<RenderedReport, TemplateError> {
        let grade = result.grade();
        let label = result.grade_label();
        let percentage = result.percentage();
        let link = source_link(&result.resolved_repo).map(str::to_string);

        tracing::debug!(
            repo = %result.repo,
            grade = %label,
            checks = result.scores.len(),
            "rendering report"
        );

        let grade_html = self.templates.render(
            TemplateId::Grade,
            &json!({
                "grade": label,
                "message": grade.map(Grade::message).unwrap_or_default(),
                "percentage": format!("{percentage:.1}"),
                "color": Severity::from_percentage(percentage).css_class(),
                "repo": result.repo,
                "resolvedRepo": result.resolved_repo,
                "link": link,
                "use_an": grade.is_some_and(Grade::takes_an),
                "grade_encoded": urlencoding::encode(&label),
                "files": result.files,
                "issues": result.issue_count(),
            }),
        )?;

        let checks = result
            .scores
            .iter()
            .enumerate()
            .map(|(i, check)| self.render_check(check, i == 0))
            .collect::<Result<Vec<_>, _>>()?;

        let last_refresh = self.templates.render(TemplateId::LastRefresh, result)?;

        let badge_links = BadgeLinks::new(&self.domain, &result.repo);
        let badge = self.templates.render(
            TemplateId::BadgeDropdown,
            &json!({
                "url": badge_links.url(),
                "image_url": badge_links.image_url(),
                "markdown": badge_links.markdown(),
                "html": badge_links.html(),
            }),
        )?;

        Ok(RenderedReport {
            grade: grade_html,
            heading: RESULTS_HEADING.to_string(),
            checks,
            last_refresh,
            badge,
            link,
            badge_links,
        })
    }

    /// Renders the navigation row and details section for one check.
    fn render_check(&self, check: &CheckResult, active: bool) -> Result<RenderedCheck, TemplateError> {
        let percentage = check.display_percentage();
        let severity = check.severity();

        let mut context = serde_json::to_value(check)
            .map_err(|source| TemplateError::Data {
                id: TemplateId::Check,
                source,
            })?;
        if let Some(fields) = context.as_object_mut() {
            fields.insert("percentage".into(), percentage.into());
            fields.insert("color".into(), severity.css_class().into());
            fields.insert("active".into(), active.into());
        }

        Ok(RenderedCheck {
            name: check.name.clone(),
            percentage,
            severity,
            active,
            nav: self.templates.render(TemplateId::Check, &context)?,
            details: self.templates.render(TemplateId::Details, &context)?,
        })
    }
}
