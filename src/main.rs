#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # reportcard
//! ## Introduction
//!
//! Command line client for a repository report card service.
//!
//! ## Configuration
//!
//! The backend is configured through environment variables, which may also be
//! placed in a `.env` file: `REPORTCARD_URL`, `REPORTCARD_DOMAIN`,
//! `REPORTCARD_CHECK_PATH` and `REPORTCARD_TIMEOUT_SECS`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bpaf::*;
use dotenvy::dotenv;
use reportcard::{
    Config, Form, FormData, HttpTransport, Method, Renderer, SubmitOutcome, Submitter, Templates,
    constants::{BRANCH_FIELD, REPO_FIELD},
    links::BadgeLinks,
    page::PageState,
    terminal,
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a repository
    Check {
        /// Repository path, eg. `github.com/owner/name`
        repo:    String,
        /// Branch to grade
        branch:  Option<String>,
        /// Ask the backend to re-grade instead of answering from cache
        refresh: bool,
        /// Where to write a standalone HTML report
        html:    Option<PathBuf>,
        /// Print the raw result as JSON
        json:    bool,
        /// List every problem found
        verbose: bool,
    },
    /// Print badge embed snippets
    Badge {
        /// Repository path
        repo:  String,
        /// Badge style, eg. `flat-square`
        style: Option<String>,
    },
    /// Render a stored result
    Render {
        /// JSON file holding a grade result
        file: PathBuf,
        /// Where to write a standalone HTML report
        html: Option<PathBuf>,
    },
}

/// Output switches shared by commands that show a report.
#[derive(Debug, Clone, Default)]
struct Output {
    /// Where to write a standalone HTML report
    html:    Option<PathBuf>,
    /// Print the raw result as JSON
    json:    bool,
    /// List every problem found
    verbose: bool,
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses a repository path
    fn r() -> impl Parser<String> {
        positional("REPO").help("Repository to grade, eg. github.com/owner/name")
    }

    /// parses the html output path
    fn h() -> impl Parser<Option<PathBuf>> {
        long("html")
            .help("Write a standalone HTML report to this file")
            .argument::<PathBuf>("FILE")
            .optional()
    }

    let check = {
        let repo = r();
        let branch = long("branch")
            .short('b')
            .help("Branch to grade")
            .argument::<String>("BRANCH")
            .optional();
        let refresh = long("refresh")
            .help("Re-grade instead of using a cached result")
            .switch();
        let html = h();
        let json = long("json").help("Print the result as JSON").switch();
        let verbose = long("verbose")
            .short('v')
            .help("List every problem found")
            .switch();
        construct!(Cmd::Check {
            branch,
            refresh,
            html,
            json,
            verbose,
            repo
        })
    }
    .to_options()
    .command("check")
    .help("Grade a repository and show its report card");

    let badge = {
        let repo = r();
        let style = long("style")
            .help("Badge style, eg. flat-square")
            .argument::<String>("STYLE")
            .optional();
        construct!(Cmd::Badge { style, repo })
    }
    .to_options()
    .command("badge")
    .help("Print badge embed snippets for a repository");

    let render = {
        let html = h();
        let file = positional::<PathBuf>("FILE").help("JSON file holding a grade result");
        construct!(Cmd::Render { html, file })
    }
    .to_options()
    .command("render")
    .help("Render a stored grade result");

    let cmd = construct!([check, badge, render]);

    cmd.to_options()
        .descr("Report card client: grade repositories and render their results")
        .run()
}

/// Prints (and optionally writes) whatever a submission produced.
fn present(outcome: SubmitOutcome, config: &Config, output: &Output) -> Result<()> {
    match outcome {
        SubmitOutcome::Rejected(notification) | SubmitOutcome::Failed(notification) => {
            bail!("{}", notification.message)
        }
        SubmitOutcome::Navigate(target) => {
            println!("Report available at {}", config.resolve(&target));
        }
        SubmitOutcome::Report { result, rendered } => {
            if output.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).context("Failed to serialize result")?
                );
            } else {
                println!("{}", terminal::headline(&result));
                println!("{}", terminal::overview(&result));
                if output.verbose {
                    print!("{}", terminal::issue_listing(&result));
                }
            }

            if let Some(path) = &output.html {
                let page = rendered.to_page(&format!("Report card for {}", result.repo));
                std::fs::write(path, page)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                eprintln!("Wrote {}", path.display());
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let cmd = options();
    let config = Config::from_env();
    let templates = Templates::builtin();
    let renderer = Renderer::new(&templates, config.domain());

    match cmd {
        Cmd::Check {
            repo,
            branch,
            refresh,
            html,
            json,
            verbose,
        } => {
            let mut fields = FormData::new();
            fields.insert(REPO_FIELD, repo);
            if let Some(branch) = branch {
                fields.insert(BRANCH_FIELD, branch);
            }
            let form = Form::new(config.check_url(), fields);

            let submitter = Submitter::new(HttpTransport::new(config.http_client()?), renderer);
            let outcome = submitter
                .submit(&form, Method::from_get_flag(!refresh))
                .await
                .with_context(|| format!("Failed to submit to {}", form.action()))?;
            present(outcome, &config, &Output {
                html,
                json,
                verbose,
            })?;
        }
        Cmd::Badge { repo, style } => {
            let links = BadgeLinks::new(config.domain(), &repo)
                .with_style(style.as_deref().unwrap_or_default());
            print!("{}", terminal::badge_snippets(&links));
        }
        Cmd::Render { file, html } => {
            let response = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let form = Form::new(config.check_url(), FormData::new());

            let submitter = Submitter::new(HttpTransport::new(config.http_client()?), renderer);
            let outcome = PageState::with_response(response)
                .load(&submitter, &form)
                .await?;
            present(outcome, &config, &Output {
                html,
                ..Default::default()
            })?;
        }
    };

    Ok(())
}
