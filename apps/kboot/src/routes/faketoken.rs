//! Demo token endpoints.
//!
//! Tokens are always signed with the configured secret so that they verify
//! against `/principal`; a request body can override every other claim.

use std::time::SystemTime;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::auth::claims::{is_wire_safe_role, TokenRequest};
use crate::auth::jwt::issue_with_secret;
use crate::error::AppError;
use crate::errors::problem::FieldError;
use crate::extractors::validated_json::{camel_case, ValidatedJson, WireNames};
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Overrides for the default demo claims. Only `subject` is required.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FakeTokenBody {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub subject: String,
    pub first_name: Option<String>,
    pub name: Option<String>,
    #[validate(length(min = 2, max = 8, message = "must be a language tag"))]
    pub language: Option<String>,
    pub roles: Option<Vec<String>>,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub issuer: Option<String>,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub audience: Option<String>,
    #[validate(email(message = "must be a well-formed email address"))]
    pub user_email: Option<String>,
    /// Seconds from issuance.
    #[validate(range(min = 1, message = "must be greater than or equal to 1"))]
    pub expiration: Option<u64>,
}

impl WireNames for FakeTokenBody {
    fn wire_name(field: &str) -> String {
        camel_case(field)
    }
}

impl FakeTokenBody {
    /// Roles must survive the comma-joined `roles` claim.
    pub fn check_roles(&self) -> Result<(), AppError> {
        let roles = self.roles.as_deref().unwrap_or_default();
        if roles.iter().all(|role| is_wire_safe_role(role)) {
            return Ok(());
        }
        Err(AppError::validation(vec![FieldError::new(
            "fakeTokenBody",
            "roles",
            "must not be blank or contain commas or surrounding whitespace",
        )]))
    }

    pub fn into_request(self, security: &SecurityConfig) -> TokenRequest {
        let defaults = TokenRequest::for_settings(security);
        TokenRequest {
            subject: self.subject,
            first_name: self.first_name.unwrap_or(defaults.first_name),
            name: self.name.unwrap_or(defaults.name),
            language: self.language.unwrap_or(defaults.language),
            roles: self.roles.unwrap_or(defaults.roles),
            issuer: self.issuer.unwrap_or(defaults.issuer),
            audience: self.audience.unwrap_or(defaults.audience),
            secret: defaults.secret,
            user_email: self.user_email.unwrap_or(defaults.user_email),
            expiration: self.expiration.unwrap_or(defaults.expiration),
        }
    }
}

fn signed(request: &TokenRequest, security: &SecurityConfig) -> Result<HttpResponse, AppError> {
    let token = issue_with_secret(request, &security.secret, SystemTime::now())?;
    info!(sub = %request.subject, iss = %request.issuer, "demo token issued");
    Ok(HttpResponse::Ok().content_type(TEXT_PLAIN).body(token))
}

/// Token for the default demo user.
async fn default_token(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let request = TokenRequest::for_settings(&app_state.security);
    signed(&request, &app_state.security)
}

async fn custom_token(
    body: ValidatedJson<FakeTokenBody>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    body.check_roles()?;
    let request = body.into_request(&app_state.security);
    signed(&request, &app_state.security)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/faketoken")
            .route(web::get().to(default_token))
            .route(web::post().to(custom_token)),
    );
}
