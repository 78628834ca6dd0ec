#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::HashMap, fmt::Display, str::FromStr};

use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;

use crate::links::is_allowed_link;

/// Identifies one of the report page templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    /// Dismissable notification.
    Alert,
    /// Grade header with message and source link.
    Grade,
    /// One row of the check navigation.
    Check,
    /// Per-file problems for one check.
    Details,
    /// Last refresh timestamp and refresh button.
    LastRefresh,
    /// Badge image and embed snippets.
    BadgeDropdown,
}

impl TemplateId {
    /// Every template the report page uses.
    pub const ALL: [TemplateId; 6] = [
        TemplateId::Alert,
        TemplateId::Grade,
        TemplateId::Check,
        TemplateId::Details,
        TemplateId::LastRefresh,
        TemplateId::BadgeDropdown,
    ];

    /// Returns the template's name, eg. `lastrefresh`.
    pub fn name(self) -> &'static str {
        match self {
            TemplateId::Alert => "alert",
            TemplateId::Grade => "grade",
            TemplateId::Check => "check",
            TemplateId::Details => "details",
            TemplateId::LastRefresh => "lastrefresh",
            TemplateId::BadgeDropdown => "badgedropdown",
        }
    }
}

impl Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TemplateId {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| TemplateError::Unknown(s.to_string()))
    }
}

/// Errors raised while looking up or rendering a template.
#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    /// No render function is registered under the identifier.
    #[error("No template registered for `{0}`")]
    Missing(TemplateId),
    /// The name does not identify any template.
    #[error("`{0}` is not a known template name")]
    Unknown(String),
    /// The data handed to the template could not be converted to JSON.
    #[error("Could not prepare data for template `{id}`")]
    Data {
        /// Template being rendered.
        id:     TemplateId,
        /// Underlying serialization failure.
        #[source]
        source: serde_json::Error,
    },
}

/// A compiled template: renders a JSON context to an HTML fragment.
pub type RenderFn = Box<dyn Fn(&Value) -> String + Send + Sync>;

/// Mapping from template identifier to compiled render function. Build it
/// once and pass it by reference to whatever renders.
#[derive(Default)]
pub struct Templates {
    /// Registered render functions.
    compiled: HashMap<TemplateId, RenderFn>,
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates")
            .field("registered", &self.compiled.keys().map(|id| id.name()).sorted().collect_vec())
            .finish()
    }
}

impl Templates {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the built-in report page templates.
    pub fn builtin() -> Self {
        let mut templates = Self::empty();
        templates
            .register(TemplateId::Alert, alert)
            .register(TemplateId::Grade, grade)
            .register(TemplateId::Check, check)
            .register(TemplateId::Details, details)
            .register(TemplateId::LastRefresh, last_refresh)
            .register(TemplateId::BadgeDropdown, badge_dropdown);
        templates
    }

    /// Registers (or replaces) the render function for `id`.
    pub fn register<F>(&mut self, id: TemplateId, render: F) -> &mut Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.compiled.insert(id, Box::new(render));
        self
    }

    /// Whether a render function is registered for `id`.
    pub fn contains(&self, id: TemplateId) -> bool {
        self.compiled.contains_key(&id)
    }

    /// Renders `data` with the template registered under `id`.
    pub fn render<T: Serialize + ?Sized>(
        &self,
        id: TemplateId,
        data: &T,
    ) -> Result<String, TemplateError> {
        let render = self.compiled.get(&id).ok_or(TemplateError::Missing(id))?;
        let context = serde_json::to_value(data).map_err(|source| TemplateError::Data { id, source })?;
        Ok(render(&context))
    }
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Raw text of a field; numbers and booleans are stringified, anything else
/// missing or structured becomes empty.
fn raw(ctx: &Value, key: &str) -> String {
    match ctx.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Escaped text of a field.
fn text(ctx: &Value, key: &str) -> String {
    escape_html(&raw(ctx, key))
}

/// Truthiness of a field: `null`, `false`, `0`, `""` and empty collections
/// are false.
fn truthy(ctx: &Value, key: &str) -> bool {
    match ctx.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Elements of an array field.
fn items<'a>(ctx: &'a Value, key: &str) -> &'a [Value] {
    ctx.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Built-in `alert` template.
fn alert(ctx: &Value) -> String {
    format!(
        r#"<div class="notification is-danger"><button class="delete" aria-label="dismiss"></button>{}</div>"#,
        text(ctx, "message")
    )
}

/// Built-in `grade` template.
fn grade(ctx: &Value) -> String {
    let repo = text(ctx, "repo");
    let title = if truthy(ctx, "link") {
        format!(r#"<a href="{}" rel="nofollow">{repo}</a>"#, text(ctx, "link"))
    } else {
        repo
    };
    let article = if truthy(ctx, "use_an") { "an" } else { "a" };
    let grade = text(ctx, "grade");

    format!(
        r#"<div class="grade-header">
  <h1 class="title">{title}</h1>
  <p class="grade {color}"><span class="grade-letter">{grade}</span> <span class="grade-message">{message}</span></p>
  <p class="subtitle">This repository earned {article} <strong>{grade}</strong> with an overall score of {percentage}%.</p>
  <p class="stats">Files: {files} &middot; Issues: {issues}</p>
  <a class="share" href="https://twitter.com/intent/tweet?text=Report+card+grade:+{grade_encoded}">Share</a>
</div>"#,
        color = text(ctx, "color"),
        message = text(ctx, "message"),
        percentage = text(ctx, "percentage"),
        files = text(ctx, "files"),
        issues = text(ctx, "issues"),
        grade_encoded = text(ctx, "grade_encoded"),
    )
}

/// Built-in `check` template.
fn check(ctx: &Value) -> String {
    let active = if truthy(ctx, "active") { " is-active" } else { "" };
    let name = text(ctx, "name");
    let percentage = text(ctx, "percentage");

    format!(
        r##"<a class="panel-block{active}" href="#{name}" data-check="{name}"><span class="check-name">{name}</span><progress class="progress is-small {color}" value="{percentage}" max="100">{percentage}%</progress><span class="check-score">{percentage}%</span></a>"##,
        color = text(ctx, "color"),
    )
}

/// Built-in `details` template.
fn details(ctx: &Value) -> String {
    let name = text(ctx, "name");
    let body = if truthy(ctx, "error") {
        format!(
            r#"<div class="notification is-warning">This check could not be run: {}</div>"#,
            text(ctx, "error")
        )
    } else if items(ctx, "file_summaries").is_empty() {
        r#"<p class="no-issues">No problems detected. Good job!</p>"#.to_string()
    } else {
        items(ctx, "file_summaries")
            .iter()
            .map(file_summary)
            .join("\n")
    };

    format!(
        r#"<div class="details" id="{name}">
  <h2 class="title is-4">{name} <span class="tag {color}">{percentage}%</span></h2>
  <p class="description">{description}</p>
  {body}
</div>"#,
        color = text(ctx, "color"),
        percentage = text(ctx, "percentage"),
        description = text(ctx, "description"),
    )
}

/// One file within the `details` template. File links are only rendered for
/// allowed hosts.
fn file_summary(summary: &Value) -> String {
    let filename = text(summary, "filename");
    let heading = match raw(summary, "file_url") {
        url if is_allowed_link(&url) => {
            format!(r#"<a href="{}" rel="nofollow">{filename}</a>"#, escape_html(&url))
        }
        _ => filename,
    };
    let errors = items(summary, "errors")
        .iter()
        .map(|e| {
            format!(
                r#"<li><span class="line">Line {}:</span> {}</li>"#,
                text(e, "line_number"),
                text(e, "error_string")
            )
        })
        .join("");

    format!(r#"<div class="file"><h3>{heading}</h3><ul>{errors}</ul></div>"#)
}

/// Built-in `lastrefresh` template.
fn last_refresh(ctx: &Value) -> String {
    let when = if truthy(ctx, "humanized_last_refresh") {
        text(ctx, "humanized_last_refresh")
    } else {
        "never".to_string()
    };

    format!(
        r##"<div class="last-refresh">Last refresh: <span title="{formatted}">{when}</span> <a class="button is-small refresh-button" href="#">Refresh now</a></div>"##,
        formatted = text(ctx, "formatted_last_refresh"),
    )
}

/// Built-in `badgedropdown` template.
fn badge_dropdown(ctx: &Value) -> String {
    format!(
        r#"<div class="badge-dropdown">
  <img class="badge" src="{image_url}" alt="badge" />
  <div id="badge_dropdown" class="hidden">
    <label>Markdown</label><input class="input" type="text" readonly value="{markdown}" />
    <label>HTML</label><input class="input" type="text" readonly value="{html}" />
    <label>Link</label><input class="input" type="text" readonly value="{url}" />
  </div>
</div>"#,
        image_url = text(ctx, "image_url"),
        markdown = text(ctx, "markdown"),
        html = text(ctx, "html"),
        url = text(ctx, "url"),
    )
}
