//! Problem Details assertions for integration tests.
//!
//! These work on raw response parts so they stay independent of the app's
//! own `Problem` type.

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{HeaderMap, CONTENT_TYPE};
use actix_web::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The fixed RFC7807 members. Extensions stay in the raw `Value`.
#[derive(Debug, Deserialize)]
struct ProblemLike {
    #[serde(rename = "type")]
    type_: String,
    status: u16,
    instance: Option<String>,
    #[serde(rename = "trace-id")]
    trace_id: Option<String>,
    message: Option<String>,
}

/// Assert that response parts carry a problem body of the given status and
/// type suffix, echo the `x-request-id` header as `trace-id`, and name
/// `expected_instance` as the instance. Returns the parsed body.
pub fn assert_problem_from_parts(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    expected_status: StatusCode,
    expected_type_suffix: &str,
    expected_instance: &str,
) -> Value {
    assert_eq!(status, expected_status);

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/problem+json"),
        "Content-Type must be application/problem+json (got {content_type})"
    );

    let value: Value =
        serde_json::from_slice(body).expect("Response body should be valid JSON");
    let problem: ProblemLike = serde_json::from_value(value.clone())
        .expect("Response body should be a problem document");

    assert_eq!(problem.status, expected_status.as_u16());
    assert!(
        problem.type_.ends_with(&format!("/{expected_type_suffix}")),
        "Expected type ending in '{expected_type_suffix}', got '{}'",
        problem.type_
    );
    assert_eq!(problem.instance.as_deref(), Some(expected_instance));
    assert!(problem.message.is_some(), "problem should carry a message");

    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .expect("x-request-id header should be present")
        .to_str()
        .expect("x-request-id header should be valid UTF-8");
    assert_eq!(
        problem.trace_id.as_deref(),
        Some(request_id),
        "trace-id in body should match x-request-id header"
    );

    value
}

/// [`assert_problem_from_parts`] for a `ServiceResponse`.
pub async fn assert_problem(
    resp: ServiceResponse<BoxBody>,
    expected_status: StatusCode,
    expected_type_suffix: &str,
    expected_instance: &str,
) -> Value {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;

    assert_problem_from_parts(
        status,
        &headers,
        &body,
        expected_status,
        expected_type_suffix,
        expected_instance,
    )
}
