#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    future::Future,
    sync::{Mutex, PoisonError},
};

use reqwest::{Client, header::ACCEPT};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    constants::{EMPTY_REPO_MESSAGE, REPO_FIELD, REQUEST_ERROR_PREFIX},
    render::{Notification, RenderedReport, Renderer},
    report::GradeResult,
    template::TemplateError,
};

/// HTTP method used for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Fields are sent as a query string. The backend may answer from cache.
    Get,
    /// Fields are sent as a form body. The backend re-grades.
    Post,
}

impl Method {
    /// `GET` when `get_request` is set, `POST` otherwise.
    pub fn from_get_flag(get_request: bool) -> Self {
        if get_request { Method::Get } else { Method::Post }
    }

    /// Returns the method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Flat, ordered form fields. Setting an existing key replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    /// Key/value pairs in first-insertion order.
    fields: Vec<(String, String)>,
}

impl FormData {
    /// Empty form data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    /// Returns the value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all pairs in order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Whether the required repository field is missing or empty.
    pub fn missing_repo(&self) -> bool {
        self.get(REPO_FIELD).is_none_or(str::is_empty)
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = FormData::new();
        for (k, v) in iter {
            data.insert(k, v);
        }
        data
    }
}

/// A form: where it submits to and what it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// Endpoint the form submits to.
    action: String,
    /// Serialized fields.
    fields: FormData,
}

impl Form {
    /// Creates a form submitting `fields` to `action`.
    pub fn new(action: impl Into<String>, fields: FormData) -> Self {
        Self {
            action: action.into(),
            fields,
        }
    }

    /// Returns the endpoint.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the fields.
    pub fn fields(&self) -> &FormData {
        &self.fields
    }
}

/// A request handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    /// Method to send with.
    pub method: Method,
    /// Target URL.
    pub url:    String,
    /// Fields, sent as query string or form body depending on `method`.
    pub fields: FormData,
}

/// Status and raw body of a backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body:   String,
}

impl TransportResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors that stop a submission before an outcome can be produced.
#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    /// Another submission holds the in-flight slot.
    #[error("A submission is already in flight (request {0})")]
    AlreadyInFlight(Uuid),
    /// The request could not be sent or its body could not be read.
    #[error("Request to {url} failed: {source}")]
    Transport {
        /// Target URL.
        url:    String,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A template failed to render.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Sends submissions to the grading backend.
pub trait Transport {
    /// Sends `request`, returning the status and raw body of whatever the
    /// backend answered.
    fn send(
        &self,
        request: &SubmitRequest,
    ) -> impl Future<Output = Result<TransportResponse, SubmitError>> + Send;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Shared HTTP client.
    client: Client,
}

impl HttpTransport {
    /// Wraps `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &SubmitRequest) -> Result<TransportResponse, SubmitError> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url).query(request.fields.pairs()),
            Method::Post => self.client.post(&request.url).form(request.fields.pairs()),
        };
        let transport_error = |e: reqwest::Error| SubmitError::Transport {
            url:    request.url.clone(),
            source: Box::new(e),
        };

        let response = builder
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        Ok(TransportResponse { status, body })
    }
}

/// Single-slot token marking the one outstanding submission.
#[derive(Debug, Default)]
pub struct RequestSlot {
    /// Token of the in-flight request, if any.
    in_flight: Mutex<Option<Uuid>>,
}

impl RequestSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot. Fails if a request is already in flight.
    pub fn acquire(&self) -> Result<InFlight<'_>, SubmitError> {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = *slot {
            return Err(SubmitError::AlreadyInFlight(token));
        }
        let token = Uuid::new_v4();
        *slot = Some(token);
        Ok(InFlight { slot: self, token })
    }

    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Guard for a claimed [`RequestSlot`]; releases the slot when dropped.
#[derive(Debug)]
pub struct InFlight<'a> {
    /// Slot to release.
    slot:  &'a RequestSlot,
    /// Token identifying this request.
    token: Uuid,
}

impl InFlight<'_> {
    /// Returns the request's token.
    pub fn token(&self) -> Uuid {
        self.token
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut slot = self
            .slot
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *slot == Some(self.token) {
            *slot = None;
        }
    }
}

/// What the UI should do after a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed locally; nothing was sent.
    Rejected(Notification),
    /// The backend asked for navigation to this exact URL.
    Navigate(String),
    /// The backend returned a result, which was classified and rendered.
    Report {
        /// The parsed result.
        result:   Box<GradeResult>,
        /// Its rendered fragments.
        rendered: Box<RenderedReport>,
    },
    /// The request failed; the notification carries the raw response body.
    Failed(Notification),
}

impl SubmitOutcome {
    /// The notification to show, if the outcome has one.
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            SubmitOutcome::Rejected(n) | SubmitOutcome::Failed(n) => Some(n),
            _ => None,
        }
    }
}

/// Validates forms, sends them, and turns responses into outcomes.
#[derive(Debug)]
pub struct Submitter<'t, T> {
    /// How requests reach the backend.
    transport: T,
    /// Renders results and alerts.
    renderer:  Renderer<'t>,
    /// The one in-flight request.
    slot:      RequestSlot,
}

impl<'t, T: Transport> Submitter<'t, T> {
    /// Creates a submitter.
    pub fn new(transport: T, renderer: Renderer<'t>) -> Self {
        Self {
            transport,
            renderer,
            slot: RequestSlot::new(),
        }
    }

    /// Returns the renderer.
    pub fn renderer(&self) -> &Renderer<'t> {
        &self.renderer
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether a submission is in flight.
    pub fn is_loading(&self) -> bool {
        self.slot.is_loading()
    }

    /// Submits `form`. An empty `repo` field is rejected without sending
    /// anything; every backend failure becomes a [`SubmitOutcome::Failed`].
    pub async fn submit(&self, form: &Form, method: Method) -> Result<SubmitOutcome, SubmitError> {
        if form.fields().missing_repo() {
            tracing::warn!("refusing to submit a form without a repository");
            return Ok(SubmitOutcome::Rejected(self.renderer.alert(EMPTY_REPO_MESSAGE)?));
        }

        let in_flight = self.slot.acquire()?;
        let request = SubmitRequest {
            method,
            url: form.action().to_string(),
            fields: form.fields().clone(),
        };
        tracing::info!(
            request = %in_flight.token(),
            method = method.as_str(),
            url = %request.url,
            repo = form.fields().get(REPO_FIELD).unwrap_or_default(),
            "submitting repository"
        );

        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(SubmitError::Transport { source, .. }) => {
                tracing::error!("submission failed: {source}");
                return self.failed(&source.to_string());
            }
            Err(e) => return Err(e),
        };
        tracing::debug!(status = response.status, "backend responded");

        if !response.is_success() {
            tracing::error!(status = response.status, "backend rejected the submission");
            return self.failed(&response.body);
        }

        self.dispatch(&response.body)
    }

    /// Turns a successful response body into navigation or a rendered
    /// report. A body that is not JSON fails like an HTTP error.
    pub fn dispatch(&self, body: &str) -> Result<SubmitOutcome, SubmitError> {
        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("response is not valid JSON: {e}");
                return self.failed(body);
            }
        };

        if let Some(redirect) = value.get("redirect").and_then(Value::as_str)
            && !redirect.is_empty()
        {
            tracing::info!(%redirect, "navigating");
            return Ok(SubmitOutcome::Navigate(redirect.to_string()));
        }

        match serde_json::from_value::<GradeResult>(value) {
            Ok(result) => self.report(result),
            Err(e) => {
                tracing::error!("response is not a grade result: {e}");
                self.failed(body)
            }
        }
    }

    /// Renders `result` into a report outcome.
    pub fn report(&self, result: GradeResult) -> Result<SubmitOutcome, SubmitError> {
        let rendered = self.renderer.populate_results(&result)?;
        Ok(SubmitOutcome::Report {
            result:   Box::new(result),
            rendered: Box::new(rendered),
        })
    }

    /// Builds the failure outcome for a raw response body.
    fn failed(&self, body: &str) -> Result<SubmitOutcome, SubmitError> {
        let notification = self
            .renderer
            .alert(format!("{REQUEST_ERROR_PREFIX}{body}"))?;
        Ok(SubmitOutcome::Failed(notification))
    }
}
