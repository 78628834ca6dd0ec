use reportcard::{
    config::Config,
    constants::REQUEST_ERROR_PREFIX,
    render::Renderer,
    submit::{Form, FormData, HttpTransport, Method, SubmitOutcome, Submitter},
    template::Templates,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};

fn config_for(server_uri: &str) -> Config {
    let server_uri = server_uri.to_string();
    Config::from_lookup(move |key| (key == "REPORTCARD_URL").then(|| server_uri.clone()))
}

fn repo_form(config: &Config) -> Form {
    let mut fields = FormData::new();
    fields.insert("repo", "github.com/a/b");
    Form::new(config.check_url(), fields)
}

#[tokio::test]
async fn get_sends_fields_as_query() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/checks"))
        .and(query_param("repo", "github.com/a/b"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "grade": "A",
            "percentage": 85.0,
            "repo": "github.com/a/b",
            "checks": [{"name": "gofmt", "percentage": 1.0}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server.uri());
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        HttpTransport::new(config.http_client()?),
        Renderer::new(&templates, config.domain()),
    );

    let outcome = submitter.submit(&repo_form(&config), Method::Get).await?;
    let SubmitOutcome::Report { result, rendered } = outcome else {
        panic!("expected a report, got {outcome:?}");
    };
    assert_eq!(result.grade_label(), "A");
    assert!(rendered.grade.contains("Great!"));
    Ok(())
}

#[tokio::test]
async fn post_sends_fields_as_form_body() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checks"))
        .and(body_string_contains("repo=github.com%2Fa%2Fb"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"redirect": "/report/github.com/a/b"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server.uri());
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        HttpTransport::new(config.http_client()?),
        Renderer::new(&templates, config.domain()),
    );

    let outcome = submitter.submit(&repo_form(&config), Method::Post).await?;
    assert_eq!(outcome, SubmitOutcome::Navigate("/report/github.com/a/b".to_string()));
    assert_eq!(
        config.resolve("/report/github.com/a/b"),
        format!("{}/report/github.com/a/b", server.uri())
    );
    Ok(())
}

#[tokio::test]
async fn server_errors_surface_the_body() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checks"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Could not download repo"))
        .mount(&server)
        .await;

    let config = config_for(&server.uri());
    let templates = Templates::builtin();
    let submitter = Submitter::new(
        HttpTransport::new(config.http_client()?),
        Renderer::new(&templates, config.domain()),
    );

    let outcome = submitter.submit(&repo_form(&config), Method::Post).await?;
    match outcome {
        SubmitOutcome::Failed(n) => {
            assert_eq!(n.message, format!("{REQUEST_ERROR_PREFIX}Could not download repo"))
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    assert!(!submitter.is_loading());
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_a_failure() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = config_for(&server.uri());
    drop(server);

    let templates = Templates::builtin();
    let submitter = Submitter::new(
        HttpTransport::new(config.http_client()?),
        Renderer::new(&templates, config.domain()),
    );

    let outcome = submitter.submit(&repo_form(&config), Method::Get).await?;
    let notification = outcome.notification().expect("failure carries a notification");
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert!(notification.message.starts_with(REQUEST_ERROR_PREFIX));
    assert!(!submitter.is_loading());
    Ok(())
}
