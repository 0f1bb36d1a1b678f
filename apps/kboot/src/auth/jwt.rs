use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::claims::{is_wire_safe_role, Claims, TokenRequest};
use crate::state::security_config::SigningSecret;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Issuance cannot proceed. Not retried.
    #[error("token signing failed: {detail}")]
    Signing { detail: String },
    #[error("invalid token: {0}")]
    InvalidToken(InvalidTokenKind),
}

impl TokenError {
    pub fn signing(detail: impl Into<String>) -> Self {
        Self::Signing {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTokenKind {
    Malformed,
    BadSignature,
    Expired,
}

impl fmt::Display for InvalidTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Malformed => "malformed",
            Self::BadSignature => "signature mismatch",
            Self::Expired => "expired",
        })
    }
}

fn unix_seconds(at: SystemTime) -> Option<i64> {
    at.duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_secs()).ok())
}

/// Issue a HS256 token for `request`, signed with `request.secret`.
pub fn issue(request: &TokenRequest, now: SystemTime) -> Result<String, TokenError> {
    let secret = SigningSecret::new(&request.secret)?;
    issue_with_secret(request, &secret, now)
}

/// Issue a HS256 token for `request`, signed with an already-built secret.
/// `request.secret` is ignored.
pub fn issue_with_secret(
    request: &TokenRequest,
    secret: &SigningSecret,
    now: SystemTime,
) -> Result<String, TokenError> {
    if request.expiration == 0 {
        return Err(TokenError::signing("expiration must be greater than zero"));
    }
    if let Some(role) = request.roles.iter().find(|r| !is_wire_safe_role(r)) {
        return Err(TokenError::signing(format!(
            "role {role:?} cannot be carried in the roles claim"
        )));
    }

    let iat = unix_seconds(now).ok_or_else(|| TokenError::signing("clock is before the epoch"))?;
    let exp = i64::try_from(request.expiration)
        .ok()
        .and_then(|ttl| iat.checked_add(ttl))
        .ok_or_else(|| TokenError::signing("expiration overflows"))?;

    let claims = Claims {
        jti: Uuid::new_v4().to_string(),
        sub: request.subject.clone(),
        iat,
        exp,
        iss: request.issuer.clone(),
        aud: request.audience.clone(),
        language: request.language.clone(),
        name: request.name.clone(),
        first_name: request.first_name.clone(),
        email: request.user_email.clone(),
        roles: request.roles.clone(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &secret.encoding_key()?,
    )
    .map_err(|e| TokenError::signing(format!("failed to encode JWT: {e}")))?;

    debug!(jti = %claims.jti, sub = %claims.sub, exp = claims.exp, "token issued");
    Ok(token)
}

/// Verify a token and return its claims.
///
/// Expiry is checked against `now` with no leeway: a token is expired once
/// `now >= exp`.
pub fn verify(token: &str, secret: &SigningSecret, now: SystemTime) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;

    let claims = decode::<Claims>(token, &secret.decoding_key()?, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            let kind = match e.kind() {
                ErrorKind::InvalidSignature => InvalidTokenKind::BadSignature,
                ErrorKind::ExpiredSignature => InvalidTokenKind::Expired,
                _ => InvalidTokenKind::Malformed,
            };
            debug!(error = %e, %kind, "token rejected");
            TokenError::InvalidToken(kind)
        })?;

    let now = unix_seconds(now).unwrap_or(0);
    if now >= claims.exp {
        debug!(jti = %claims.jti, exp = claims.exp, now, "token rejected: expired");
        return Err(TokenError::InvalidToken(InvalidTokenKind::Expired));
    }

    Ok(claims)
}
