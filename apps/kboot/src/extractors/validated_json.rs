use std::ops::{Deref, DerefMut};

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest};
use bytes::BytesMut;
use futures_util::StreamExt;
use lazy_regex::regex_captures;
use serde::de::DeserializeOwned;
use serde_json::Error as JsonError;
use tracing::debug;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;
use crate::errors::problem::FieldError;
use crate::trace_ctx;

/// Bodies above this size are rejected with 413.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

/// JSON body extractor that reports every failure through the problem
/// translator.
///
/// - unreadable or oversized bodies become unclassified 400/413 problems;
/// - a missing required property becomes `AppError::MissingField`;
/// - other deserialization failures become a 400 with a sanitized detail;
/// - `validator` failures become `AppError::Validation`.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    /// Extract the inner value from the ValidatedJson wrapper
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for ValidatedJson<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Maps `validator`'s Rust field names to the JSON property names a client
/// sends. The default is the identity, matching serde without renames.
pub trait WireNames {
    fn wire_name(field: &str) -> String {
        field.to_string()
    }
}

/// `snake_case` to `camelCase`, as `#[serde(rename_all = "camelCase")]` does.
pub fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + WireNames + 'static,
{
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(_req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let mut payload = payload.take();

        Box::pin(async move {
            let trace_id = trace_ctx::trace_id().unwrap_or_else(|| "unknown".to_string());

            let mut body = BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk.map_err(|e| {
                    debug!(trace_id = %trace_id, error = %e, "Failed to read request body chunk");
                    AppError::bad_request("Failed to read request body")
                })?;
                if body.len() + chunk.len() > MAX_BODY_BYTES {
                    return Err(AppError::http(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        Some(format!("Request body exceeds {MAX_BODY_BYTES} bytes")),
                    ));
                }
                body.extend_from_slice(&chunk);
            }

            let parsed = serde_json::from_slice::<T>(&body).map_err(|e| {
                debug!(
                    trace_id = %trace_id,
                    error = %e,
                    body_size = body.len(),
                    "JSON parsing failed"
                );
                json_error(&e)
            })?;

            parsed
                .validate()
                .map_err(|errors| {
                    AppError::validation(field_errors(&object_name::<T>(), &errors, T::wire_name))
                })?;

            Ok(ValidatedJson(parsed))
        })
    }
}

/// Map a serde_json failure to the error the translator expects.
pub fn json_error(error: &JsonError) -> AppError {
    if let Some(field) = missing_field(error) {
        return AppError::missing_field(
            field.clone(),
            format!("Missing required property '{field}'"),
        );
    }
    AppError::bad_request(classify_json_error(error))
}

fn missing_field(error: &JsonError) -> Option<String> {
    if !error.is_data() {
        return None;
    }
    let message = error.to_string();
    regex_captures!(r"missing field `([^`]+)`", &message).map(|(_, field)| field.to_string())
}

/// Classify serde_json::Error and return a sanitized error message
fn classify_json_error(error: &JsonError) -> String {
    match error.classify() {
        serde_json::error::Category::Syntax => {
            let line = error.line();
            format!("Invalid JSON at line {line}")
        }
        serde_json::error::Category::Eof => "Invalid JSON: unexpected end of input".to_string(),
        serde_json::error::Category::Data => {
            "Invalid JSON: wrong types for one or more fields".to_string()
        }
        serde_json::error::Category::Io => "Invalid JSON: I/O error while reading body".to_string(),
    }
}

/// Flatten `validator` output into field errors named by their wire name,
/// ordered by that name and then by the order the validator reported them
/// for that field.
pub fn field_errors<F>(object_name: &str, errors: &ValidationErrors, wire_name: F) -> Vec<FieldError>
where
    F: Fn(&str) -> String,
{
    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (wire_name(&field), errs))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(move |e| FieldError::new(object_name, field.clone(), message_of(e)))
        })
        .collect()
}

fn message_of(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

/// Short type name with a lowercase first letter, e.g. `fakeTokenBody`.
fn object_name<T>() -> String {
    let full = std::any::type_name::<T>();
    let short = full.rsplit("::").next().unwrap_or(full);
    let mut chars = short.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
