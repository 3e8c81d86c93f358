//! Shared validation helpers for inbound HTTP adapters.
//!
//! Handlers feed every field through a [`FieldErrors`] collector and call
//! [`FieldErrors::finish`] once, so clients learn about all problems in one
//! response. The list lands in `details.errors`.

use serde::Serialize;
use serde_json::json;

use crate::domain::{Error, JobId, SteamId};

use super::payload::Scalar;

const MULTIPLE_FAILURES: &str = "Missing or invalid fields.";

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ErrorCode {
    MissingField,
    NotNumeric,
    NotPositive,
    InvalidSteamId,
    InvalidValue,
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct FieldError {
    field: &'static str,
    code: ErrorCode,
    message: String,
}

/// Collects field errors across a whole payload.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors {
    errors: Vec<FieldError>,
}

fn present(value: Option<Scalar>) -> Option<Scalar> {
    value.filter(|scalar| !scalar.is_blank())
}

impl FieldErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, field: &'static str, code: ErrorCode, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            code,
            message: message.into(),
        });
    }

    fn missing(&mut self, field: &'static str) {
        self.push(field, ErrorCode::MissingField, format!("{field} is required"));
    }

    /// Required non-blank text.
    pub(crate) fn text(&mut self, field: &'static str, value: Option<Scalar>) -> Option<String> {
        match present(value) {
            Some(scalar) => Some(scalar.text()),
            None => {
                self.missing(field);
                None
            }
        }
    }

    /// Required number; strings are parsed.
    pub(crate) fn number(&mut self, field: &'static str, value: Option<Scalar>) -> Option<f64> {
        let Some(scalar) = present(value) else {
            self.missing(field);
            return None;
        };
        let parsed = scalar.as_f64();
        if parsed.is_none() {
            self.push(
                field,
                ErrorCode::NotNumeric,
                format!("{field} is required and must be numeric"),
            );
        }
        parsed
    }

    /// Required integer; fractional values are rounded.
    pub(crate) fn integer(&mut self, field: &'static str, value: Option<Scalar>) -> Option<i64> {
        let Some(scalar) = present(value) else {
            self.missing(field);
            return None;
        };
        let parsed = scalar.as_i64();
        if parsed.is_none() {
            self.push(
                field,
                ErrorCode::NotNumeric,
                format!("{field} is required and must be an integer"),
            );
        }
        parsed
    }

    /// Required boolean flag.
    pub(crate) fn flag(&mut self, field: &'static str, value: Option<Scalar>) -> Option<bool> {
        let Some(scalar) = value else {
            self.missing(field);
            return None;
        };
        let parsed = scalar.as_bool();
        if parsed.is_none() {
            self.push(field, ErrorCode::InvalidValue, format!("{field} must be a boolean"));
        }
        parsed
    }

    /// Required positive job id.
    pub(crate) fn job_id(&mut self, field: &'static str, value: Option<Scalar>) -> Option<JobId> {
        let parsed = present(value)
            .and_then(|scalar| scalar.as_i64())
            .and_then(|raw| JobId::new(raw).ok());
        if parsed.is_none() {
            self.push(
                field,
                ErrorCode::NotPositive,
                format!("{field} is required and must be a positive integer"),
            );
        }
        parsed
    }

    /// Required Steam id of 6 to 20 digits.
    pub(crate) fn steam_id(&mut self, field: &'static str, value: Option<Scalar>) -> Option<SteamId> {
        let parsed = present(value).and_then(|scalar| SteamId::new(scalar.text().trim()).ok());
        if parsed.is_none() {
            self.push(
                field,
                ErrorCode::InvalidSteamId,
                format!("{field} is required and must be numeric (SteamID64 recommended)"),
            );
        }
        parsed
    }

    /// `Ok` when nothing was rejected, else one invalid-request error listing
    /// every field.
    pub(crate) fn finish(self) -> Result<(), Error> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let message = match self.errors.as_slice() {
            [only] => only.message.clone(),
            _ => MULTIPLE_FAILURES.to_owned(),
        };
        Err(Error::invalid_request(message).with_details(json!({ "errors": self.errors })))
    }
}

/// Run `parse` against a fresh collector and return its value, or every
/// rejected field at once.
pub(crate) fn validate<T>(parse: impl FnOnce(&mut FieldErrors) -> Option<T>) -> Result<T, Error> {
    let mut errors = FieldErrors::new();
    let parsed = parse(&mut errors);
    errors.finish()?;
    parsed.ok_or_else(|| Error::invalid_request(MULTIPLE_FAILURES))
}

/// Single-field invalid request, for form actions.
pub(crate) fn invalid_field(field: &'static str, message: &str) -> Error {
    let mut errors = FieldErrors::new();
    errors.push(field, ErrorCode::InvalidValue, message);
    match errors.finish() {
        Err(error) => error,
        Ok(()) => Error::invalid_request(message.to_owned()),
    }
}
