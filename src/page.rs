#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::{
    constants::{REPO_FIELD, STICKY_NAV_OFFSET},
    report::GradeResult,
    submit::{Form, Method, SubmitError, SubmitOutcome, Submitter, Transport},
};

/// Whether the results navigation sticks to the top at this scroll offset.
pub fn is_sticky(scroll_top: f64) -> bool {
    scroll_top >= STICKY_NAV_OFFSET
}

/// What the report page was served with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    /// Set when the server had no result yet and the page must fetch one.
    pub loading:  bool,
    /// JSON result embedded in the page; ignored while loading.
    pub response: String,
}

impl PageState {
    /// A page that must fetch its result.
    pub fn loading() -> Self {
        Self {
            loading:  true,
            response: String::new(),
        }
    }

    /// A page served with an embedded result.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            loading:  false,
            response: response.into(),
        }
    }

    /// Runs the page-load step: fetch with `GET` while loading, otherwise
    /// render the embedded response.
    pub async fn load<T: Transport>(
        &self,
        submitter: &Submitter<'_, T>,
        form: &Form,
    ) -> Result<SubmitOutcome, SubmitError> {
        if self.loading {
            tracing::info!(
                repo = form.fields().get(REPO_FIELD).unwrap_or_default(),
                "no cached result, fetching"
            );
            return submitter.submit(form, Method::Get).await;
        }

        match serde_json::from_str::<GradeResult>(&self.response) {
            Ok(result) => submitter.report(result),
            Err(e) => {
                tracing::error!("embedded response is not a grade result: {e}");
                let alert = submitter
                    .renderer()
                    .alert(format!("Could not read the stored report: {e}"))?;
                Ok(SubmitOutcome::Failed(alert))
            }
        }
    }
}

/// Which check row is expanded. At most one row is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckNav {
    /// Number of rows.
    len:    usize,
    /// Active row, if any.
    active: Option<usize>,
}

impl CheckNav {
    /// Navigation over `len` rows with the first one active.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            active: (len > 0).then_some(0),
        }
    }

    /// Makes `index` the only active row. Selecting the active row keeps it
    /// active; out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.len {
            self.active = Some(index);
        }
    }

    /// Returns the active row.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Whether `index` is the active row.
    pub fn is_active(&self, index: usize) -> bool {
        self.active == Some(index)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Visibility of the badge embed dropdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeDropdown {
    /// Whether the dropdown is shown.
    visible: bool,
}

impl BadgeDropdown {
    /// Flips visibility and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// Whether the dropdown is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
