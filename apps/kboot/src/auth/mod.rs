//! Bearer token issuance and verification.

pub mod claims;
pub mod jwt;

pub use claims::{Claims, TokenRequest};
pub use jwt::{issue, issue_with_secret, verify, InvalidTokenKind, TokenError};
