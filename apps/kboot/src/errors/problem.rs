//! RFC7807 problem-detail body and the value types carried in its extensions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Base URI for every problem `type` emitted by this crate.
pub const PROBLEM_BASE_URL: &str = "http://keepcalm/problem";

/// Message key used for every validation-style problem.
pub const ERR_VALIDATION: &str = "error.validation";

/// Media type for problem responses.
pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Extension keys written by the translator.
pub mod ext {
    pub const TRACE_ID: &str = "trace-id";
    pub const MESSAGE: &str = "message";
    pub const FIELD_ERRORS: &str = "fieldErrors";
    pub const VIOLATIONS: &str = "violations";
    pub const MISSING_PROPERTY: &str = "missing-property";
    pub const SERVICE_NAME: &str = "service-name";
    pub const SERVICE_METHOD: &str = "service-method";
    pub const SERVICE_ARGS: &str = "service-args";
    pub const SERVICE_STATUS: &str = "service-status";
    pub const SERVICE_EXCEPTION: &str = "service-exception";
}

/// Classification of a problem, rendered as `<base>/<suffix>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemType {
    ProblemWithMessage,
    ConstraintViolation,
    EntityNotFound,
    InvalidData,
    DownstreamServiceError,
    DownstreamServiceUnavailable,
}

impl ProblemType {
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::ProblemWithMessage => "problem-with-message",
            Self::ConstraintViolation => "constraint-violation",
            Self::EntityNotFound => "entity-not-found",
            Self::InvalidData => "invalid-data",
            Self::DownstreamServiceError => "downstream-service-error",
            Self::DownstreamServiceUnavailable => "downstream-service-unavailable",
        }
    }

    pub fn uri(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.suffix())
    }
}

/// RFC7807 problem body plus open extension members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl Problem {
    pub fn builder(type_: impl Into<String>, status: u16) -> ProblemBuilder {
        ProblemBuilder {
            problem: Problem {
                type_: type_.into(),
                title: None,
                status,
                detail: None,
                instance: None,
                extensions: Map::new(),
            },
        }
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.extension(ext::TRACE_ID).and_then(Value::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.extension(ext::MESSAGE).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    problem: Problem,
}

impl ProblemBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.problem.title = Some(title.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.problem.detail = Some(detail.into());
        self
    }

    pub fn maybe_detail(mut self, detail: Option<String>) -> Self {
        self.problem.detail = detail;
        self
    }

    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.problem.instance = Some(instance.into());
        self
    }

    /// Adds an extension member. Values that fail to serialize are dropped.
    pub fn with<V: Serialize>(mut self, key: &str, value: V) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.problem.extensions.insert(key.to_string(), value);
        }
        self
    }

    pub fn with_opt<V: Serialize>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn build(self) -> Problem {
        self.problem
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub object_name: String,
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(
        object_name: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            object_name: object_name.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A constraint violation on a bound parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
