//! Validating query and body extractors
//!
//! Parse and validation failures are reported with the failure envelope
//! (`400 {success: false, error}`), never axum's plain-text rejections.

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::types::ApiError;

/// Validation rejection with structured error response
#[derive(Debug)]
pub enum ValidationRejection {
    /// Failed to parse query string
    Query(QueryRejection),
    /// Failed to parse JSON body
    Json(JsonRejection),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::Query(rejection) => rejection.body_text(),
            Self::Json(rejection) => rejection.body_text(),
            Self::Validation(errors) => format_validation_errors(&errors),
        };
        tracing::debug!(error = %message, "Request rejected");
        ApiError::bad_request("error-invalid-params", message).into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .errors()
        .iter()
        .flat_map(|(field, kind)| collect_messages(field, kind))
        .collect();
    messages.sort();
    messages.join("; ")
}

fn collect_messages(field: &str, kind: &validator::ValidationErrorsKind) -> Vec<String> {
    use validator::ValidationErrorsKind;

    let describe = |e: &validator::ValidationError| {
        e.message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{}: validation failed", field))
    };

    match kind {
        ValidationErrorsKind::Field(errs) => errs.iter().map(describe).collect(),
        ValidationErrorsKind::Struct(inner) => vec![format_validation_errors(inner)],
        ValidationErrorsKind::List(items) => items
            .values()
            .map(|inner| format_validation_errors(inner))
            .collect(),
    }
}

/// Query extractor with automatic validation.
///
/// Deserializes query parameters and validates them using the `validator` crate.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

/// JSON body extractor with automatic validation.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}
