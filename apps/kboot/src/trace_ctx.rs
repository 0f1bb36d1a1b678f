//! Task-local request context for web requests.
//!
//! `RequestTrace` scopes a [`RequestContext`] around every request so the
//! error glue can hand the translator the request path and trace id without
//! threading them through handlers. Translation itself only ever sees the
//! explicit context value.

use tokio::task_local;

task_local! {
    static REQUEST_CONTEXT: RequestContext;
}

/// Per-request input to error translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Request path, used as the problem `instance`. Empty outside a request.
    pub path: String,
    /// Correlation id, if one is active.
    pub trace_id: Option<String>,
}

impl RequestContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            trace_id: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: Option<String>) -> Self {
        self.trace_id = trace_id;
        self
    }
}

/// Context of the current task, or an empty one outside of a request.
pub fn current() -> RequestContext {
    REQUEST_CONTEXT
        .try_with(|ctx| ctx.clone())
        .unwrap_or_default()
}

/// Trace id of the current task, if any.
pub fn trace_id() -> Option<String> {
    REQUEST_CONTEXT
        .try_with(|ctx| ctx.trace_id.clone())
        .ok()
        .flatten()
}

/// Run a future within a request context.
pub async fn with_request_context<F, R>(ctx: RequestContext, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    REQUEST_CONTEXT.scope(ctx, future).await
}
