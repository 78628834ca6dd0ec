#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::Serialize;
use typed_builder::TypedBuilder;

use crate::{
    constants::{ALLOWED_LINK_DOMAINS, BADGE_LABEL},
    template::escape_html,
};

/// Returns true iff `url` starts with one of the allowed link prefixes. This
/// is a literal prefix comparison, so `http://github.com/` or a URL that
/// merely contains an allowed prefix is rejected.
pub fn is_allowed_link(url: &str) -> bool {
    ALLOWED_LINK_DOMAINS
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

/// Returns `url` if it may be rendered as a clickable source link.
pub fn source_link(url: &str) -> Option<&str> {
    is_allowed_link(url).then_some(url)
}

/// Strips any scheme and trailing slash so that `https://` can be prefixed
/// exactly once.
fn bare_domain(domain: &str) -> &str {
    let domain = domain.trim();
    domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain)
        .trim_end_matches('/')
}

/// Report and badge image URLs for a repository, plus the embed snippets
/// offered in the badge dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
#[builder(doc)]
pub struct BadgeLinks {
    /// * `url`: link to the report page
    url:       String,
    /// * `image_url`: link to the badge image
    image_url: String,
}

impl BadgeLinks {
    /// Builds `https://<domain>/report/<repo>` and
    /// `https://<domain>/badge/<repo>`.
    pub fn new(domain: &str, repo: &str) -> Self {
        let domain = bare_domain(domain);
        Self {
            url:       format!("https://{domain}/report/{repo}"),
            image_url: format!("https://{domain}/badge/{repo}"),
        }
    }

    /// Requests a specific badge style (eg. `flat-square`) from the image
    /// endpoint.
    pub fn with_style(mut self, style: &str) -> Self {
        let style = style.trim();
        if !style.is_empty() {
            self.image_url = format!("{}?style={}", self.image_url, urlencoding::encode(style));
        }
        self
    }

    /// Returns the report page URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the badge image URL.
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Markdown snippet for READMEs.
    pub fn markdown(&self) -> String {
        format!("[![{BADGE_LABEL}]({})]({})", self.image_url, self.url)
    }

    /// HTML snippet for web pages.
    pub fn html(&self) -> String {
        format!(
            r#"<a href="{}"><img src="{}" alt="{BADGE_LABEL}" /></a>"#,
            escape_html(&self.url),
            escape_html(&self.image_url)
        )
    }
}
