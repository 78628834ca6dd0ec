use std::sync::Mutex;

use reportcard::{
    constants::{EMPTY_REPO_MESSAGE, REQUEST_ERROR_PREFIX},
    render::Renderer,
    submit::{
        Form, FormData, Method, RequestSlot, SubmitError, SubmitOutcome, SubmitRequest, Submitter,
        Transport, TransportResponse,
    },
    template::Templates,
};
use tokio::sync::Notify;

/// Records every request and answers with a canned response.
struct Recording {
    requests: Mutex<Vec<SubmitRequest>>,
    reply:    Result<(u16, String), String>,
    gate:     Option<Notify>,
}

impl Recording {
    fn replying(status: u16, body: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply:    Ok((status, body.to_string())),
            gate:     None,
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply:    Err(message.to_string()),
            gate:     None,
        }
    }

    fn gated(status: u16, body: &str) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::replying(status, body)
        }
    }

    fn requests(&self) -> Vec<SubmitRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for Recording {
    async fn send(&self, request: &SubmitRequest) -> Result<TransportResponse, SubmitError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.reply {
            Ok((status, body)) => Ok(TransportResponse {
                status: *status,
                body:   body.clone(),
            }),
            Err(message) => Err(SubmitError::Transport {
                url:    request.url.clone(),
                source: message.clone().into(),
            }),
        }
    }
}

const RESULT: &str = r#"{
    "grade": "B",
    "percentage": 72.5,
    "repo": "github.com/a/b",
    "resolvedRepo": "https://github.com/a/b",
    "checks": [
        {"name": "gofmt", "percentage": 0.8, "file_summaries": []},
        {"name": "vet", "percentage": 0.4, "file_summaries": null}
    ]
}"#;

fn form(repo: &str) -> Form {
    Form::new("http://backend.test/checks", [("repo", repo)].into_iter().collect())
}

#[tokio::test]
async fn empty_repo_is_rejected_without_a_request() -> anyhow::Result<()> {
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        Recording::replying(200, RESULT),
        Renderer::new(&templates, "goreportcard.com"),
    );

    for form in [form(""), Form::new("http://backend.test/checks", FormData::new())] {
        for method in [Method::Get, Method::Post] {
            let outcome = submitter.submit(&form, method).await?;
            match outcome {
                SubmitOutcome::Rejected(n) => assert_eq!(n.message, EMPTY_REPO_MESSAGE),
                other => panic!("expected a rejection, got {other:?}"),
            }
        }
    }

    assert!(submitter.transport().requests().is_empty());
    assert!(!submitter.is_loading());
    Ok(())
}

#[tokio::test]
async fn method_and_fields_are_passed_through() -> anyhow::Result<()> {
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        Recording::replying(200, RESULT),
        Renderer::new(&templates, "goreportcard.com"),
    );

    let mut fields = FormData::new();
    fields.insert("repo", "github.com/a/b").insert("branch", "dev");
    let form = Form::new("http://backend.test/checks", fields);

    submitter.submit(&form, Method::Get).await?;
    submitter.submit(&form, Method::Post).await?;

    let requests = submitter.transport().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[1].method, Method::Post);
    for request in &requests {
        assert_eq!(request.url, "http://backend.test/checks");
        assert_eq!(request.fields.get("repo"), Some("github.com/a/b"));
        assert_eq!(request.fields.get("branch"), Some("dev"));
    }
    Ok(())
}

#[tokio::test]
async fn result_is_rendered() -> anyhow::Result<()> {
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        Recording::replying(200, RESULT),
        Renderer::new(&templates, "goreportcard.com"),
    );

    let outcome = submitter.submit(&form("github.com/a/b"), Method::Get).await?;
    let SubmitOutcome::Report { result, rendered } = outcome else {
        panic!("expected a report, got {outcome:?}");
    };

    assert_eq!(result.repo, "github.com/a/b");
    assert_eq!(rendered.checks.len(), 2);
    assert_eq!(rendered.checks[0].percentage, 80);
    assert_eq!(rendered.checks[1].percentage, 40);
    assert!(rendered.grade.contains("Not bad!"));
    assert!(rendered.grade.contains("a <strong>B</strong>"));
    assert!(!submitter.is_loading());
    Ok(())
}

#[tokio::test]
async fn redirect_navigates_to_the_exact_url() -> anyhow::Result<()> {
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        Recording::replying(200, r#"{"redirect": "/report/github.com/a/b"}"#),
        Renderer::new(&templates, "goreportcard.com"),
    );

    let outcome = submitter.submit(&form("github.com/a/b"), Method::Post).await?;
    assert_eq!(outcome, SubmitOutcome::Navigate("/report/github.com/a/b".to_string()));
    assert_eq!(outcome.notification(), None);
    Ok(())
}

#[test]
fn empty_redirect_falls_through_to_the_result() -> anyhow::Result<()> {
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        Recording::replying(200, ""),
        Renderer::new(&templates, "goreportcard.com"),
    );

    let outcome = submitter.dispatch(r#"{"redirect": "", "grade": "A", "repo": "r"}"#)?;
    assert!(matches!(outcome, SubmitOutcome::Report { .. }));
    Ok(())
}

#[tokio::test]
async fn http_errors_alert_with_the_raw_body() -> anyhow::Result<()> {
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        Recording::replying(500, "could not clone <repo>"),
        Renderer::new(&templates, "goreportcard.com"),
    );

    let outcome = submitter.submit(&form("github.com/a/b"), Method::Post).await?;
    let notification = outcome.notification().expect("failure carries a notification");

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(notification.message, format!("{REQUEST_ERROR_PREFIX}could not clone <repo>"));
    assert!(notification.html.contains("could not clone &lt;repo&gt;"));
    assert!(!submitter.is_loading());
    Ok(())
}

#[tokio::test]
async fn invalid_json_is_a_failure() -> anyhow::Result<()> {
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        Recording::replying(200, "<html>gateway</html>"),
        Renderer::new(&templates, "goreportcard.com"),
    );

    let outcome = submitter.submit(&form("github.com/a/b"), Method::Get).await?;
    match outcome {
        SubmitOutcome::Failed(n) => {
            assert_eq!(n.message, format!("{REQUEST_ERROR_PREFIX}<html>gateway</html>"))
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn transport_errors_become_failures() -> anyhow::Result<()> {
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        Recording::failing("connection refused"),
        Renderer::new(&templates, "goreportcard.com"),
    );

    let outcome = submitter.submit(&form("github.com/a/b"), Method::Get).await?;
    match outcome {
        SubmitOutcome::Failed(n) => {
            assert_eq!(n.message, format!("{REQUEST_ERROR_PREFIX}connection refused"))
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    assert!(!submitter.is_loading());
    Ok(())
}

#[tokio::test]
async fn second_submission_is_refused_while_one_is_in_flight() -> anyhow::Result<()> {
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        Recording::gated(200, RESULT),
        Renderer::new(&templates, "goreportcard.com"),
    );
    let form = form("github.com/a/b");

    let first = submitter.submit(&form, Method::Get);
    let second = async {
        tokio::task::yield_now().await;
        let loading = submitter.is_loading();
        let outcome = submitter.submit(&form, Method::Post).await;
        if let Some(gate) = &submitter.transport().gate {
            gate.notify_one();
        }
        (loading, outcome)
    };
    let (first, (loading, second)) = tokio::join!(first, second);

    assert!(loading);
    assert!(matches!(second, Err(SubmitError::AlreadyInFlight(_))));
    assert!(matches!(first?, SubmitOutcome::Report { .. }));
    assert_eq!(submitter.transport().requests().len(), 1);
    assert!(!submitter.is_loading());
    Ok(())
}

#[test]
fn slot_is_released_when_the_guard_drops() {
    let slot = RequestSlot::new();
    assert!(!slot.is_loading());

    let held = slot.acquire().unwrap();
    assert!(slot.is_loading());
    match slot.acquire() {
        Err(SubmitError::AlreadyInFlight(token)) => assert_eq!(token, held.token()),
        other => panic!("expected the slot to be busy, got {other:?}"),
    }

    drop(held);
    assert!(!slot.is_loading());
    let again = slot.acquire().unwrap();
    assert!(slot.is_loading());
    drop(again);
}

#[test]
fn form_data_replaces_in_place() {
    let mut data = FormData::new();
    data.insert("repo", "a").insert("branch", "main").insert("repo", "b");

    assert_eq!(
        data.pairs(),
        &[("repo".to_string(), "b".to_string()), ("branch".to_string(), "main".to_string())]
    );
    assert!(!data.missing_repo());
    assert!(FormData::new().missing_repo());
}

#[test]
fn method_from_flag() {
    assert_eq!(Method::from_get_flag(true), Method::Get);
    assert_eq!(Method::from_get_flag(false), Method::Post);
    assert_eq!(Method::Post.as_str(), "POST");
}
