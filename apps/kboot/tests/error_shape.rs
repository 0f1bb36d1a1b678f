mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, HttpResponse};
use common::create_test_app;
use kboot::errors::problem::FieldError;
use kboot::AppError;
use kboot_test_support::problem_details::{assert_problem, REQUEST_ID_HEADER};
use serde_json::json;

async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::not_found("Order", Some("7".to_string())))
}

async fn invalid_fields() -> Result<HttpResponse, AppError> {
    Err(AppError::validation(vec![
        FieldError::new("order", "qty", "must be positive"),
        FieldError::new("order", "sku", "must not be blank"),
    ]))
}

async fn unavailable() -> Result<HttpResponse, AppError> {
    Err(AppError::service_unavailable("pricing-service"))
}

async fn internal() -> Result<HttpResponse, AppError> {
    Err(AppError::internal("connection pool exhausted"))
}

fn test_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/_test/not-found", web::get().to(not_found))
        .route("/_test/invalid", web::get().to(invalid_fields))
        .route("/_test/unavailable", web::get().to(unavailable))
        .route("/_test/internal", web::get().to(internal));
}

#[actix_web::test]
async fn test_not_found_shape() {
    let app = create_test_app().with_routes(test_routes).build().await;

    let req = test::TestRequest::get().uri("/_test/not-found").to_request();
    let resp = test::call_service(&app, req).await;

    let body = assert_problem(
        resp,
        StatusCode::NOT_FOUND,
        "entity-not-found",
        "/_test/not-found",
    )
    .await;
    assert_eq!(body["title"], "Not Found");
    assert_eq!(body["message"], "error.http.404");
    assert!(body.get("detail").is_none());
}

#[actix_web::test]
async fn test_validation_shape_lists_field_errors_in_order() {
    let app = create_test_app().with_routes(test_routes).build().await;

    let req = test::TestRequest::get().uri("/_test/invalid").to_request();
    let resp = test::call_service(&app, req).await;

    let body = assert_problem(
        resp,
        StatusCode::BAD_REQUEST,
        "constraint-violation",
        "/_test/invalid",
    )
    .await;
    assert_eq!(body["message"], "error.validation");
    assert_eq!(
        body["fieldErrors"],
        json!([
            { "objectName": "order", "field": "qty", "message": "must be positive" },
            { "objectName": "order", "field": "sku", "message": "must not be blank" }
        ])
    );
}

#[actix_web::test]
async fn test_unavailable_downstream_shape() {
    let app = create_test_app().with_routes(test_routes).build().await;

    let req = test::TestRequest::get().uri("/_test/unavailable").to_request();
    let resp = test::call_service(&app, req).await;

    let body = assert_problem(
        resp,
        StatusCode::SERVICE_UNAVAILABLE,
        "downstream-service-unavailable",
        "/_test/unavailable",
    )
    .await;
    assert_eq!(body["service-name"], "pricing-service");
}

#[actix_web::test]
async fn test_internal_error_hides_detail() {
    let app = create_test_app().with_routes(test_routes).build().await;

    let req = test::TestRequest::get().uri("/_test/internal").to_request();
    let resp = test::call_service(&app, req).await;

    let body = assert_problem(
        resp,
        StatusCode::INTERNAL_SERVER_ERROR,
        "problem-with-message",
        "/_test/internal",
    )
    .await;
    assert_eq!(body["message"], "error.http.500");
    assert!(body.get("detail").is_none());
    assert!(!body.to_string().contains("connection pool"));
}

#[actix_web::test]
async fn test_incoming_request_id_is_reused() {
    let app = create_test_app().with_routes(test_routes).build().await;

    let req = test::TestRequest::get()
        .uri("/_test/not-found")
        .insert_header((REQUEST_ID_HEADER, "client-trace-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers().get(REQUEST_ID_HEADER).unwrap(),
        "client-trace-42"
    );
    let body = assert_problem(
        resp,
        StatusCode::NOT_FOUND,
        "entity-not-found",
        "/_test/not-found",
    )
    .await;
    assert_eq!(body["trace-id"], "client-trace-42");
}

#[actix_web::test]
async fn test_unsafe_request_id_is_replaced() {
    let app = create_test_app().with_routes(test_routes).build().await;

    let req = test::TestRequest::get()
        .uri("/_test/not-found")
        .insert_header((REQUEST_ID_HEADER, "spaces and <tags>"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let echoed = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_ne!(echoed, "spaces and <tags>");
    assert!(!echoed.is_empty());
}
