//! Location Entry Form State
//!
//! Field validation and the submit sequence of the entry modal, kept apart
//! from the view so the reset-only-on-success rule can be tested.

use std::future::Future;

use thiserror::Error;

use crate::models::{LatLng, NoteFields};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub handle: String,
    pub body: String,
    pub label: String,
    /// A create is in flight; the form cannot be dismissed
    pub submitting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("a username is required")]
    MissingHandle,
    #[error("a comment is required")]
    MissingBody,
    #[error("no location selected")]
    MissingPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent
    Invalid(FormError),
    /// Created; fields were reset
    Submitted,
    /// Creation failed; fields untouched
    Failed,
}

/// Trimmed handle without a leading `@`
pub fn normalize_handle(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim().to_string()
}

impl FormState {
    pub fn validate(&self, position: Option<LatLng>) -> Result<NoteFields, FormError> {
        let handle = normalize_handle(&self.handle);
        if handle.is_empty() {
            return Err(FormError::MissingHandle);
        }
        let body = self.body.trim();
        if body.is_empty() {
            return Err(FormError::MissingBody);
        }
        let position = position.ok_or(FormError::MissingPosition)?;
        let label = self.label.trim();
        Ok(NoteFields {
            handle,
            body: body.to_string(),
            label: (!label.is_empty()).then(|| label.to_string()),
            position,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clear the fields for a cancel; refused while a submit is running
    pub fn dismiss(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.reset();
        true
    }
}

/// Validate, invoke `create`, and reset the fields only when it succeeds
pub async fn submit<F, Fut, E>(state: &mut FormState, position: Option<LatLng>, create: F) -> SubmitOutcome
where
    F: FnOnce(NoteFields) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let fields = match state.validate(position) {
        Ok(fields) => fields,
        Err(e) => return SubmitOutcome::Invalid(e),
    };
    match create(fields).await {
        Ok(()) => {
            state.reset();
            SubmitOutcome::Submitted
        }
        Err(e) => {
            log::error!("[FORM] error submitting form: {}", e);
            SubmitOutcome::Failed
        }
    }
}
