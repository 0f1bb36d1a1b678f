// Translation table tests: error in, problem out. No HTTP involved.
use actix_web::http::StatusCode;
use proptest::prelude::*;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::errors::problem::{ext, FieldError, Problem, Violation};
use crate::errors::translator::ProblemTranslator;
use crate::trace_ctx::RequestContext;

const BASE: &str = "http://keepcalm/problem";

fn translate(error: AppError) -> Problem {
    ProblemTranslator::default().translate(&error, &RequestContext::new("/orders/7"))
}

fn type_of(suffix: &str) -> String {
    format!("{BASE}/{suffix}")
}

#[test]
fn every_category_maps_to_its_row() {
    let cases = vec![
        (AppError::not_found("Order", Some("7".into())), 404, "entity-not-found"),
        (AppError::no_such_element("empty"), 404, "entity-not-found"),
        (
            AppError::validation(vec![FieldError::new("order", "qty", "must be positive")]),
            400,
            "constraint-violation",
        ),
        (
            AppError::constraint_violation(vec![Violation::new("id", "must be > 0")]),
            400,
            "constraint-violation",
        ),
        (AppError::missing_field("qty", "Missing required property 'qty'"), 400, "invalid-data"),
        (AppError::invalid("bad"), 400, "invalid-data"),
        (AppError::illegal_argument("bad arg"), 400, "invalid-data"),
        (AppError::illegal_state("bad state"), 400, "invalid-data"),
        (
            AppError::ServiceFailed {
                service_name: "pricing-service".into(),
                service_method: "quote".into(),
                service_args: vec![],
                service_status: 502,
                details: "bad gateway".into(),
            },
            502,
            "downstream-service-error",
        ),
        (AppError::downstream_status(504, "timed out"), 504, "downstream-service-error"),
        (AppError::service_unavailable("pricing-service"), 503, "downstream-service-unavailable"),
        (
            AppError::DownstreamRetryable { detail: "try again".into() },
            503,
            "downstream-service-unavailable",
        ),
        (
            AppError::UnexpectedServiceResponse {
                service_name: "pricing-service".into(),
                service_method: "quote".into(),
                service_args: vec![],
            },
            503,
            "downstream-service-error",
        ),
        (AppError::bad_request("nope"), 400, "problem-with-message"),
        (AppError::unauthorized("Invalid token"), 401, "problem-with-message"),
        (AppError::http(StatusCode::PAYLOAD_TOO_LARGE, None), 413, "problem-with-message"),
        (AppError::internal("boom"), 500, "problem-with-message"),
        (AppError::config("no secret"), 500, "problem-with-message"),
    ];

    for (error, status, suffix) in cases {
        let label = format!("{error:?}");
        let problem = translate(error);
        assert_eq!(problem.status, status, "status for {label}");
        assert_eq!(problem.type_, type_of(suffix), "type for {label}");
        assert_eq!(problem.instance.as_deref(), Some("/orders/7"), "instance for {label}");
        assert!(problem.message().is_some(), "message for {label}");
    }
}

#[test]
fn not_found_has_no_detail() {
    let problem = translate(AppError::not_found("Order", Some("7".into())));
    assert_eq!(problem.title.as_deref(), Some("Not Found"));
    assert_eq!(problem.detail, None);
    assert_eq!(problem.message(), Some("error.http.404"));
}

#[test]
fn validation_carries_message_and_field_errors() {
    let problem = translate(AppError::validation(vec![FieldError::new(
        "order",
        "qty",
        "must be positive",
    )]));

    assert_eq!(problem.title.as_deref(), Some("Method argument not valid"));
    assert_eq!(problem.message(), Some("error.validation"));
    assert_eq!(
        problem.extension(ext::FIELD_ERRORS),
        Some(&json!([{ "objectName": "order", "field": "qty", "message": "must be positive" }]))
    );
}

#[test]
fn constraint_violation_lists_violations() {
    let problem = translate(AppError::constraint_violation(vec![
        Violation::new("id", "must be > 0"),
        Violation::new("page", "must be >= 1"),
    ]));

    assert_eq!(problem.title.as_deref(), Some("Constraint Violation"));
    assert_eq!(problem.message(), Some("error.validation"));
    assert_eq!(
        problem.extension(ext::VIOLATIONS),
        Some(&json!([
            { "field": "id", "message": "must be > 0" },
            { "field": "page", "message": "must be >= 1" }
        ]))
    );
}

#[test]
fn missing_field_names_the_property() {
    let problem = translate(AppError::missing_field("qty", "Missing required property 'qty'"));
    assert_eq!(problem.title.as_deref(), Some("Invalid Data"));
    assert_eq!(problem.detail.as_deref(), Some("Missing required property 'qty'"));
    assert_eq!(problem.extension(ext::MISSING_PROPERTY), Some(&json!("qty")));
}

#[test]
fn service_failure_describes_the_call() {
    let problem = translate(AppError::ServiceFailed {
        service_name: "pricing-service".into(),
        service_method: "quote".into(),
        service_args: vec![json!("sku-1"), json!(3)],
        service_status: 502,
        details: "bad gateway".into(),
    });

    assert_eq!(problem.title.as_deref(), Some("Downstream service failed"));
    assert_eq!(problem.extension(ext::SERVICE_NAME), Some(&json!("pricing-service")));
    assert_eq!(problem.extension(ext::SERVICE_METHOD), Some(&json!("quote")));
    assert_eq!(problem.extension(ext::SERVICE_ARGS), Some(&json!(["sku-1", 3])));
    assert_eq!(problem.extension(ext::SERVICE_STATUS), Some(&json!(502)));
    assert_eq!(problem.extension(ext::SERVICE_EXCEPTION), Some(&json!("bad gateway")));
}

#[test]
fn out_of_range_downstream_status_defaults_to_500() {
    let problem = translate(AppError::downstream_status(0, "no status"));
    assert_eq!(problem.status, 500);
    assert_eq!(problem.type_, type_of("downstream-service-error"));
}

#[test]
fn unavailable_service_is_named() {
    let problem = translate(AppError::service_unavailable("pricing-service"));

    assert_eq!(problem.status, 503);
    assert_eq!(problem.type_, type_of("downstream-service-unavailable"));
    assert_eq!(problem.title.as_deref(), Some("Downstream service is unavailable"));
    assert_eq!(problem.extension(ext::SERVICE_NAME), Some(&json!("pricing-service")));
}

#[test]
fn unexpected_response_describes_the_call() {
    let problem = translate(AppError::UnexpectedServiceResponse {
        service_name: "pricing-service".into(),
        service_method: "quote".into(),
        service_args: vec![json!(1)],
    });

    assert_eq!(
        problem.title.as_deref(),
        Some("Downstream service returned unexpected or invalid content")
    );
    assert_eq!(problem.extension(ext::SERVICE_ARGS), Some(&json!([1])));
    assert_eq!(problem.extension(ext::SERVICE_STATUS), None);
}

#[test]
fn unclassified_defaults_to_500_with_http_message() {
    let problem = translate(AppError::internal("connection pool exhausted"));

    assert_eq!(problem.status, 500);
    assert_eq!(problem.type_, type_of("problem-with-message"));
    assert_eq!(problem.title.as_deref(), Some("Internal Server Error"));
    assert_eq!(problem.message(), Some("error.http.500"));
    assert_eq!(problem.detail, None);
}

#[test]
fn unclassified_keeps_explicit_status() {
    let problem = translate(AppError::unauthorized("Token expired"));

    assert_eq!(problem.status, 401);
    assert_eq!(problem.title.as_deref(), Some("Unauthorized"));
    assert_eq!(problem.detail.as_deref(), Some("Token expired"));
    assert_eq!(problem.message(), Some("error.http.401"));
}

#[test]
fn trace_id_is_echoed_only_when_known() {
    let translator = ProblemTranslator::default();
    let error = AppError::invalid("bad");

    let without = translator.translate(&error, &RequestContext::new("/a"));
    assert_eq!(without.trace_id(), None);
    assert!(!serde_json::to_value(&without)
        .unwrap()
        .as_object()
        .unwrap()
        .contains_key("trace-id"));

    let with = translator.translate(
        &error,
        &RequestContext::new("/a").with_trace_id(Some("abc-123".into())),
    );
    assert_eq!(with.trace_id(), Some("abc-123"));
}

#[test]
fn empty_path_leaves_instance_unset() {
    let problem = ProblemTranslator::default()
        .translate(&AppError::invalid("bad"), &RequestContext::default());
    assert_eq!(problem.instance, None);
}

#[test]
fn serialized_problem_is_flat() {
    let problem = ProblemTranslator::default().translate(
        &AppError::missing_field("qty", "Missing required property 'qty'"),
        &RequestContext::new("/orders").with_trace_id(Some("t-1".into())),
    );
    let body: Value = serde_json::to_value(&problem).unwrap();

    assert_eq!(body["type"], json!(type_of("invalid-data")));
    assert_eq!(body["status"], json!(400));
    assert_eq!(body["instance"], json!("/orders"));
    assert_eq!(body["trace-id"], json!("t-1"));
    assert_eq!(body["missing-property"], json!("qty"));
    assert_eq!(body["message"], json!("error.http.400"));
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, failure_persistence: None, ..ProptestConfig::default() })]

    #[test]
    fn field_errors_keep_count_and_order(
        fields in prop::collection::vec(("[a-z]{1,8}", "[a-z ]{1,16}"), 0..12)
    ) {
        let errors: Vec<FieldError> = fields
            .iter()
            .map(|(field, message)| FieldError::new("order", field.clone(), message.clone()))
            .collect();

        let problem = translate(AppError::validation(errors.clone()));
        let listed: Vec<FieldError> = serde_json::from_value(
            problem.extension(ext::FIELD_ERRORS).cloned().unwrap_or(Value::Null),
        )
        .unwrap();

        prop_assert_eq!(listed, errors);
    }
}
