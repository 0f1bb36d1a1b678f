//! Claims records for token issuance and the signed token payload.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::security_config::SecurityConfig;

pub const DEFAULT_SUBJECT: &str = "john.doe@foo.bar.ch";
pub const DEFAULT_ISSUER: &str = "Keepcalm Auth";
pub const DEFAULT_AUDIENCE: &str = "Keepcalm";
pub const DEFAULT_SECRET: &str = "willbereplacedinalaterversiononceRSAcanbeused";
/// Seconds from issuance.
pub const DEFAULT_EXPIRATION: u64 = 3_600_000;

/// Input to token issuance. Built per call and dropped after signing.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub subject: String,
    pub first_name: String,
    pub name: String,
    pub language: String,
    /// Each role must pass [`is_wire_safe_role`]; issuance rejects the
    /// request otherwise.
    pub roles: Vec<String>,
    pub issuer: String,
    pub audience: String,
    /// Plain text; base64-encoded before it is used as the HMAC key.
    pub secret: String,
    pub user_email: String,
    /// Seconds from issuance. Must be greater than zero.
    pub expiration: u64,
}

impl Default for TokenRequest {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            first_name: "John".to_string(),
            name: "Doe".to_string(),
            language: "de".to_string(),
            roles: vec!["keepcalm.user".to_string()],
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            secret: DEFAULT_SECRET.to_string(),
            user_email: "joh.doe@foo.bar.ch".to_string(),
            expiration: DEFAULT_EXPIRATION,
        }
    }
}

impl TokenRequest {
    /// Default record with issuer and audience taken from `security`.
    ///
    /// The secret is left at its default; callers that sign with the
    /// configured key go through [`crate::auth::jwt::issue_with_secret`].
    pub fn for_settings(security: &SecurityConfig) -> Self {
        Self {
            issuer: security.issuer.clone(),
            audience: security.audience.clone(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("subject", &self.subject)
            .field("first_name", &self.first_name)
            .field("name", &self.name)
            .field("language", &self.language)
            .field("roles", &self.roles)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("secret", &"<redacted>")
            .field("user_email", &self.user_email)
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Claims carried in tokens issued by this crate.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Random token id.
    pub jti: String,
    pub sub: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(with = "roles_format", default)]
    pub roles: Vec<String>,
}

/// Splits a comma-delimited role list, dropping blanks.
pub fn split_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}

/// Roles travel as one comma-joined string, so a role only survives the
/// round trip if it is non-empty, has no comma and no surrounding whitespace.
pub fn is_wire_safe_role(role: &str) -> bool {
    !role.is_empty() && !role.contains(',') && role.trim() == role
}

/// Roles go on the wire as one comma-delimited string and are read back from
/// either that form or a JSON array.
mod roles_format {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(roles: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&roles.join(","))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Joined(String),
            List(Vec<String>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Joined(raw) => super::split_roles(&raw),
            Repr::List(roles) => roles,
        })
    }
}
