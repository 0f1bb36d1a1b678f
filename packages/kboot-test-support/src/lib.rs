//! Shared helpers for kboot integration tests: logging setup and
//! problem-details assertions that do not depend on kboot types.

pub mod logging;
pub mod problem_details;
