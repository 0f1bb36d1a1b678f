//! Access log: one `request_completed` event per request.
//!
//! Level follows the status class (5xx error, 4xx warn, rest info). Each
//! event says whether the body was a problem document.

use std::future::{ready, Ready};
use std::time::{Duration, Instant};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::CONTENT_TYPE;
use actix_web::http::{Method, StatusCode};
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use super::request_trace::TraceId;
use crate::errors::problem::PROBLEM_CONTENT_TYPE;

pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

struct Completed {
    method: Method,
    path: String,
    status: StatusCode,
    trace_id: String,
    problem: bool,
    elapsed: Duration,
}

impl Completed {
    fn emit(&self) {
        macro_rules! completed {
            ($level:ident) => {
                $level!(
                    http.method = %self.method,
                    url.path = %self.path,
                    http.status_code = self.status.as_u16(),
                    duration_us = self.elapsed.as_micros() as u64,
                    trace_id = %self.trace_id,
                    problem = self.problem,
                    "request_completed"
                )
            };
        }

        if self.status.is_server_error() {
            completed!(error);
        } else if self.status.is_client_error() {
            completed!(warn);
        } else {
            completed!(info);
        }
    }
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let (status, trace_id, problem) = match &result {
                Ok(res) => (
                    res.status(),
                    TraceId::from_extensions(&res.request().extensions()),
                    res.headers()
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .is_some_and(|ct| ct.starts_with(PROBLEM_CONTENT_TYPE)),
                ),
                Err(err) => (err.as_response_error().status_code(), None, false),
            };

            Completed {
                method,
                path,
                status,
                trace_id: trace_id.unwrap_or_else(|| "unknown".to_string()),
                problem,
                elapsed: start.elapsed(),
            }
            .emit();

            result
        })
    }
}
