//! Error-to-problem translation.
//!
//! A [`ProblemTranslator`] holds an ordered table of `(ErrorCategory, handler)`
//! routes, most specific first, and a fallback handler for anything the table
//! does not claim. Every produced problem is then finished with the request
//! path, the trace id (when one is known) and a default `message` key.

use core::fmt;

use actix_web::http::StatusCode;
use once_cell::sync::OnceCell;

use crate::error::AppError;
use crate::errors::problem::{ext, Problem, ProblemType, ERR_VALIDATION, PROBLEM_BASE_URL};
use crate::trace_ctx::RequestContext;

/// Dispatch tag for [`AppError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    Validation,
    ConstraintViolation,
    MissingField,
    InvalidData,
    DownstreamFailed,
    DownstreamUnavailable,
    DownstreamUnexpected,
    Unclassified,
}

/// Builds the category-specific part of a problem. The second argument is the
/// problem type base URL.
pub type ProblemHandler = fn(&AppError, &str) -> Problem;

#[derive(Clone, Copy)]
struct Route {
    category: ErrorCategory,
    handler: ProblemHandler,
}

fn route(category: ErrorCategory, handler: ProblemHandler) -> Route {
    Route { category, handler }
}

#[derive(Clone)]
pub struct ProblemTranslator {
    base_url: String,
    routes: Vec<Route>,
    fallback: ProblemHandler,
}

impl fmt::Debug for ProblemTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemTranslator")
            .field("base_url", &self.base_url)
            .field(
                "routes",
                &self.routes.iter().map(|r| r.category).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl Default for ProblemTranslator {
    fn default() -> Self {
        Self::new(PROBLEM_BASE_URL)
    }
}

impl ProblemTranslator {
    pub fn new(base_url: impl Into<String>) -> Self {
        let routes = vec![
            route(ErrorCategory::NotFound, not_found),
            route(ErrorCategory::Validation, validation),
            route(ErrorCategory::ConstraintViolation, constraint_violation),
            route(ErrorCategory::MissingField, missing_field),
            route(ErrorCategory::InvalidData, invalid_data),
            route(ErrorCategory::DownstreamUnexpected, downstream_unexpected),
            route(ErrorCategory::DownstreamUnavailable, downstream_unavailable),
            route(ErrorCategory::DownstreamFailed, downstream_failed),
        ];

        Self {
            base_url: base_url.into(),
            routes,
            fallback: unclassified,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replaces the handler for `category`, or appends a route if the table
    /// has none. `Unclassified` replaces the fallback.
    pub fn with_handler(mut self, category: ErrorCategory, handler: ProblemHandler) -> Self {
        if category == ErrorCategory::Unclassified {
            self.fallback = handler;
            return self;
        }
        match self.routes.iter_mut().find(|r| r.category == category) {
            Some(route) => route.handler = handler,
            None => self.routes.push(route(category, handler)),
        }
        self
    }

    pub fn translate(&self, error: &AppError, ctx: &RequestContext) -> Problem {
        let category = error.category();
        let handler = self
            .routes
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.handler)
            .unwrap_or(self.fallback);

        finish(handler(error, &self.base_url), ctx)
    }
}

static SHARED: OnceCell<ProblemTranslator> = OnceCell::new();

/// Installs the process-wide translator. Returns `false` if one was already
/// installed (or lazily defaulted by an earlier error).
pub fn install(translator: ProblemTranslator) -> bool {
    SHARED.set(translator).is_ok()
}

/// Process-wide translator used by the `ResponseError` glue.
pub fn shared() -> &'static ProblemTranslator {
    SHARED.get_or_init(ProblemTranslator::default)
}

fn finish(mut problem: Problem, ctx: &RequestContext) -> Problem {
    if !ctx.path.is_empty() {
        problem.instance = Some(ctx.path.clone());
    }
    if let Some(trace_id) = &ctx.trace_id {
        problem
            .extensions
            .insert(ext::TRACE_ID.to_string(), trace_id.clone().into());
    }
    if !problem.extensions.contains_key(ext::MESSAGE) {
        problem.extensions.insert(
            ext::MESSAGE.to_string(),
            format!("error.http.{}", problem.status).into(),
        );
    }
    problem
}

fn reason(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
        .to_string()
}

/// Downstream statuses outside the HTTP range fall back to 500.
fn resolve_status(status: u16) -> u16 {
    if (100..=599).contains(&status) {
        status
    } else {
        500
    }
}

fn not_found(_error: &AppError, base: &str) -> Problem {
    Problem::builder(ProblemType::EntityNotFound.uri(base), 404)
        .title(reason(404))
        .build()
}

fn validation(error: &AppError, base: &str) -> Problem {
    let AppError::Validation { field_errors } = error else {
        return unclassified(error, base);
    };
    Problem::builder(ProblemType::ConstraintViolation.uri(base), 400)
        .title("Method argument not valid")
        .with(ext::MESSAGE, ERR_VALIDATION)
        .with(ext::FIELD_ERRORS, field_errors)
        .build()
}

fn constraint_violation(error: &AppError, base: &str) -> Problem {
    let AppError::ConstraintViolation { violations } = error else {
        return unclassified(error, base);
    };
    Problem::builder(ProblemType::ConstraintViolation.uri(base), 400)
        .title("Constraint Violation")
        .with(ext::MESSAGE, ERR_VALIDATION)
        .with(ext::VIOLATIONS, violations)
        .build()
}

fn missing_field(error: &AppError, base: &str) -> Problem {
    let AppError::MissingField { field, detail } = error else {
        return unclassified(error, base);
    };
    Problem::builder(ProblemType::InvalidData.uri(base), 400)
        .title("Invalid Data")
        .detail(detail.clone())
        .with(ext::MISSING_PROPERTY, field)
        .build()
}

fn invalid_data(error: &AppError, base: &str) -> Problem {
    Problem::builder(ProblemType::InvalidData.uri(base), 400)
        .title("Invalid Data")
        .detail(error.to_string())
        .build()
}

fn downstream_failed(error: &AppError, base: &str) -> Problem {
    let type_ = ProblemType::DownstreamServiceError.uri(base);
    match error {
        AppError::ServiceFailed {
            service_name,
            service_method,
            service_args,
            service_status,
            details,
        } => Problem::builder(type_, resolve_status(*service_status))
            .title("Downstream service failed")
            .detail(error.to_string())
            .with(ext::SERVICE_NAME, service_name)
            .with(ext::SERVICE_METHOD, service_method)
            .with(ext::SERVICE_ARGS, service_args)
            .with(ext::SERVICE_STATUS, service_status)
            .with(ext::SERVICE_EXCEPTION, details)
            .build(),
        AppError::DownstreamStatus { status, detail } => {
            Problem::builder(type_, resolve_status(*status))
                .title("Error accessing backend service")
                .detail(detail.clone())
                .build()
        }
        other => unclassified(other, base),
    }
}

fn downstream_unavailable(error: &AppError, base: &str) -> Problem {
    let type_ = ProblemType::DownstreamServiceUnavailable.uri(base);
    match error {
        AppError::ServiceUnavailable { service_name } => Problem::builder(type_, 503)
            .title("Downstream service is unavailable")
            .with(ext::SERVICE_NAME, service_name)
            .build(),
        AppError::DownstreamRetryable { detail } => Problem::builder(type_, 503)
            .title("Error accessing backend service")
            .detail(detail.clone())
            .build(),
        other => unclassified(other, base),
    }
}

fn downstream_unexpected(error: &AppError, base: &str) -> Problem {
    let AppError::UnexpectedServiceResponse {
        service_name,
        service_method,
        service_args,
    } = error
    else {
        return unclassified(error, base);
    };
    Problem::builder(ProblemType::DownstreamServiceError.uri(base), 503)
        .title("Downstream service returned unexpected or invalid content")
        .with(ext::SERVICE_NAME, service_name)
        .with(ext::SERVICE_METHOD, service_method)
        .with(ext::SERVICE_ARGS, service_args)
        .build()
}

fn unclassified(error: &AppError, base: &str) -> Problem {
    let status = error
        .explicit_status()
        .map(|s| s.as_u16())
        .unwrap_or(500);
    Problem::builder(ProblemType::ProblemWithMessage.uri(base), status)
        .title(reason(status))
        .maybe_detail(error.public_detail())
        .build()
}
