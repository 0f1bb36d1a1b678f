#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod config;
pub mod downstream;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod trace_ctx;

#[cfg(test)]
pub mod test_bootstrap;

pub use auth::{issue, issue_with_secret, verify, Claims, TokenError, TokenRequest};
pub use config::Config;
pub use downstream::DownstreamCall;
pub use error::AppError;
pub use errors::{Problem, ProblemTranslator};
pub use extractors::{BearerClaims, ValidatedJson};
pub use middleware::{RequestTrace, StructuredLogger, TraceSpan};
pub use state::{AppState, SecurityConfig, SigningSecret};
pub use trace_ctx::RequestContext;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
