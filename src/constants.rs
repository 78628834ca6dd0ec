#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// URL prefixes a resolved repository may start with to be shown as a
/// clickable source link.
pub const ALLOWED_LINK_DOMAINS: [&str; 4] = [
    "https://github.com/",
    "https://bitbucket.org/",
    "https://golang.org/",
    "https://go.googlesource.com/",
];

/// Name of the form field that must be non-empty before a submission is sent.
pub const REPO_FIELD: &str = "repo";

/// Name of the optional form field selecting the branch to grade.
pub const BRANCH_FIELD: &str = "branch";

/// Alert shown when the repository field is left empty.
pub const EMPTY_REPO_MESSAGE: &str = "Input cannot be empty. Please enter a valid repository path";

/// Prefix of the alert shown when the backend rejects a submission. The raw
/// response body is appended verbatim.
pub const REQUEST_ERROR_PREFIX: &str = "There was an error processing your request: ";

/// Scroll offset, in pixels, at and beyond which the results navigation sticks
/// to the top of the viewport.
pub const STICKY_NAV_OFFSET: f64 = 240.0;

/// Heading placed above the check navigation rows.
pub const RESULTS_HEADING: &str = r#"<p class="panel-heading">Results</p>"#;

/// Alt text and link label used by badge embed snippets.
pub const BADGE_LABEL: &str = "Go Report Card";

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default public domain used to build badge and report links.
pub const DEFAULT_DOMAIN: &str = "goreportcard.com";

/// Default path of the grading endpoint, relative to the base URL.
pub const DEFAULT_CHECK_PATH: &str = "/checks";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
