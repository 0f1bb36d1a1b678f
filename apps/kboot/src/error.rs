use actix_web::error::ResponseError;
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::jwt::{InvalidTokenKind, TokenError};
use crate::errors::problem::{FieldError, Violation, PROBLEM_CONTENT_TYPE};
use crate::errors::translator::{self, ErrorCategory};
use crate::trace_ctx;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{}", entity_not_found_message(entity, id.as_deref()))]
    EntityNotFound { entity: String, id: Option<String> },
    #[error("{detail}")]
    NoSuchElement { detail: String },
    #[error("Validation failed for {} field(s)", field_errors.len())]
    Validation { field_errors: Vec<FieldError> },
    #[error("Constraint violation on {} parameter(s)", violations.len())]
    ConstraintViolation { violations: Vec<Violation> },
    #[error("{detail}")]
    MissingField { field: String, detail: String },
    #[error("{detail}")]
    InvalidData { detail: String },
    #[error("{detail}")]
    IllegalArgument { detail: String },
    #[error("{detail}")]
    IllegalState { detail: String },
    #[error("{detail}")]
    BadRequest { detail: String },
    #[error("Service request {service_name}.{service_method} failed")]
    ServiceFailed {
        service_name: String,
        service_method: String,
        service_args: Vec<Value>,
        service_status: u16,
        details: String,
    },
    #[error("{detail}")]
    DownstreamStatus { status: u16, detail: String },
    #[error("Service {service_name} is unavailable")]
    ServiceUnavailable { service_name: String },
    #[error("{detail}")]
    DownstreamRetryable { detail: String },
    #[error("Service request {service_name}.{service_method} returned unexpected response")]
    UnexpectedServiceResponse {
        service_name: String,
        service_method: String,
        service_args: Vec<Value>,
    },
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: &'static str },
    #[error("HTTP {status}")]
    Http {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

fn entity_not_found_message(entity: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("Entity {entity} with args/value: {id} not found"),
        None => format!("Entity {entity} not found"),
    }
}

impl AppError {
    /// Dispatch tag used by the problem translator.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::EntityNotFound { .. } | AppError::NoSuchElement { .. } => {
                ErrorCategory::NotFound
            }
            AppError::Validation { .. } => ErrorCategory::Validation,
            AppError::ConstraintViolation { .. } => ErrorCategory::ConstraintViolation,
            AppError::MissingField { .. } => ErrorCategory::MissingField,
            AppError::InvalidData { .. }
            | AppError::IllegalArgument { .. }
            | AppError::IllegalState { .. } => ErrorCategory::InvalidData,
            AppError::ServiceFailed { .. } | AppError::DownstreamStatus { .. } => {
                ErrorCategory::DownstreamFailed
            }
            AppError::ServiceUnavailable { .. } | AppError::DownstreamRetryable { .. } => {
                ErrorCategory::DownstreamUnavailable
            }
            AppError::UnexpectedServiceResponse { .. } => ErrorCategory::DownstreamUnexpected,
            AppError::BadRequest { .. }
            | AppError::Unauthorized { .. }
            | AppError::Http { .. }
            | AppError::Internal { .. }
            | AppError::Config { .. } => ErrorCategory::Unclassified,
        }
    }

    /// Status carried by the error itself, if any.
    pub fn explicit_status(&self) -> Option<StatusCode> {
        match self {
            AppError::BadRequest { .. } => Some(StatusCode::BAD_REQUEST),
            AppError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Detail that is safe to hand to a client. Internal and configuration
    /// failures never expose their text.
    pub fn public_detail(&self) -> Option<String> {
        match self {
            AppError::Internal { .. } | AppError::Config { .. } => None,
            AppError::Unauthorized { reason } => Some((*reason).to_string()),
            AppError::Http { detail, .. } => detail.clone(),
            other => Some(other.to_string()),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: Option<String>) -> Self {
        Self::EntityNotFound {
            entity: entity.into(),
            id,
        }
    }

    pub fn no_such_element(detail: impl Into<String>) -> Self {
        Self::NoSuchElement {
            detail: detail.into(),
        }
    }

    pub fn validation(field_errors: Vec<FieldError>) -> Self {
        Self::Validation { field_errors }
    }

    pub fn constraint_violation(violations: Vec<Violation>) -> Self {
        Self::ConstraintViolation { violations }
    }

    pub fn missing_field(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            detail: detail.into(),
        }
    }

    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidData {
            detail: detail.into(),
        }
    }

    pub fn illegal_argument(detail: impl Into<String>) -> Self {
        Self::IllegalArgument {
            detail: detail.into(),
        }
    }

    pub fn illegal_state(detail: impl Into<String>) -> Self {
        Self::IllegalState {
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest {
            detail: detail.into(),
        }
    }

    pub fn service_unavailable(service_name: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service_name: service_name.into(),
        }
    }

    pub fn downstream_status(status: u16, detail: impl Into<String>) -> Self {
        Self::DownstreamStatus {
            status,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(reason: &'static str) -> Self {
        Self::Unauthorized { reason }
    }

    pub fn http(status: StatusCode, detail: Option<String>) -> Self {
        Self::Http { status, detail }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing { detail } => AppError::internal(format!("token signing: {detail}")),
            TokenError::InvalidToken(InvalidTokenKind::Expired) => {
                AppError::unauthorized("Token expired")
            }
            TokenError::InvalidToken(_) => AppError::unauthorized("Invalid token"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        let problem = translator::shared().translate(self, &trace_ctx::current());
        StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let ctx = trace_ctx::current();
        let problem = translator::shared().translate(self, &ctx);
        let status =
            StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(
                trace_id = ctx.trace_id.as_deref().unwrap_or("unknown"),
                category = ?self.category(),
                error = %self,
                "request failed"
            );
        } else {
            debug!(
                trace_id = ctx.trace_id.as_deref().unwrap_or("unknown"),
                category = ?self.category(),
                error = %self,
                "request rejected"
            );
        }

        let mut builder = HttpResponse::build(status);
        builder.content_type(PROBLEM_CONTENT_TYPE);
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(problem)
    }
}
