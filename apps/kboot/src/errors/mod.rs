//! Problem-detail model and the error translator.

pub mod problem;
pub mod translator;

#[cfg(test)]
mod tests_translation;

pub use problem::{FieldError, Problem, ProblemType, Violation};
pub use translator::{ErrorCategory, ProblemTranslator};
