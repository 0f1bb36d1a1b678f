use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::auth::claims::{DEFAULT_AUDIENCE, DEFAULT_ISSUER};
use crate::auth::jwt::TokenError;

/// HMAC signing secret, held in base64 form.
///
/// The plain text is encoded exactly once, on construction. Signing keys are
/// derived by decoding that form, so the key bytes are the UTF-8 bytes of the
/// plain secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret {
    encoded: String,
}

impl SigningSecret {
    pub fn new(plain: &str) -> Result<Self, TokenError> {
        if plain.is_empty() {
            return Err(TokenError::signing("signing secret must not be empty"));
        }
        Ok(Self {
            encoded: STANDARD.encode(plain.as_bytes()),
        })
    }

    /// Base64 form of the secret.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub(crate) fn encoding_key(&self) -> Result<EncodingKey, TokenError> {
        EncodingKey::from_base64_secret(&self.encoded)
            .map_err(|e| TokenError::signing(format!("failed to build signing key: {e}")))
    }

    pub(crate) fn decoding_key(&self) -> Result<DecodingKey, TokenError> {
        DecodingKey::from_base64_secret(&self.encoded)
            .map_err(|e| TokenError::signing(format!("failed to build verification key: {e}")))
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// JWT settings (`security.jwt.*`), immutable once built.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub issuer: String,
    pub audience: String,
    pub secret: SigningSecret,
}

impl SecurityConfig {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        secret: &str,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            issuer: issuer.into(),
            audience: audience.into(),
            secret: SigningSecret::new(secret)?,
        })
    }

    /// Default issuer and audience with the given secret.
    pub fn with_secret(secret: &str) -> Result<Self, TokenError> {
        Self::new(DEFAULT_ISSUER, DEFAULT_AUDIENCE, secret)
    }
}
