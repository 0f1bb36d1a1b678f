//! Assigns a trace id to every request.
//!
//! An incoming `x-request-id` is reused when it is a sane token; otherwise a
//! UUID is generated. The id is stored in request extensions as a
//! [`TraceId`], the rest of the chain runs inside a [`RequestContext`] scope
//! (path + trace id), and the id is echoed back in the `x-request-id`
//! response header.

use actix_web::{
    dev::{forward_ready, Extensions, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    HttpMessage,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use uuid::Uuid;

use crate::trace_ctx::{with_request_context, RequestContext};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Incoming ids longer than this are replaced.
const MAX_INCOMING_ID_LEN: usize = 128;

/// Trace id of the current request, as stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn from_extensions(extensions: &Extensions) -> Option<String> {
        extensions.get::<TraceId>().map(|id| id.0.clone())
    }
}

pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: S,
}

fn is_sane_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_INCOMING_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn incoming_id(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| is_sane_id(id))
        .map(str::to_string)
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = incoming_id(&req).unwrap_or_else(|| Uuid::new_v4().to_string());

        req.extensions_mut().insert(TraceId(trace_id.clone()));

        let ctx = RequestContext::new(req.path()).with_trace_id(Some(trace_id.clone()));
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = with_request_context(ctx, fut).await?;

            // Sane ids and UUIDs are always valid header values.
            if let Ok(value) = HeaderValue::from_str(&trace_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            Ok(res)
        })
    }
}
