//! # reportcard
//!
//! A client for a repository report card service: submits repositories for
//! grading, classifies the returned grades, and renders results as HTML
//! fragments or terminal tables.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Environment-driven client configuration
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Letter grades, grade messages and percentage categories
pub mod grade;
/// Link allow-listing and badge URLs
pub mod links;
/// Page-level behavior: initial load, sticky navigation, expandable rows
pub mod page;
/// Turns grade results into mountable HTML fragments
pub mod render;
/// The grade result wire model
pub mod report;
/// Form submission, the in-flight request slot and response dispatch
pub mod submit;
/// The template registry and built-in templates
pub mod template;
/// Terminal output for the command line client
pub mod terminal;

pub use config::Config;
pub use grade::{Grade, Severity};
pub use render::{Notification, RenderedReport, Renderer};
pub use report::{CheckResult, FileSummary, GradeResult, Issue};
pub use submit::{Form, FormData, HttpTransport, Method, SubmitError, SubmitOutcome, Submitter};
pub use template::{TemplateId, Templates};
