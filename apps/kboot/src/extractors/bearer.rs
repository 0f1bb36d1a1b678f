use std::ops::Deref;
use std::time::SystemTime;

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};

use crate::auth::claims::Claims;
use crate::auth::jwt::verify;
use crate::error::AppError;
use crate::state::app_state::AppState;

const MISSING_BEARER: &str = "Missing or malformed Bearer token";

/// Claims of a verified `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerClaims(pub Claims);

impl BearerClaims {
    pub fn into_inner(self) -> Claims {
        self.0
    }
}

impl Deref for BearerClaims {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Pull the token out of an `Authorization` header value.
pub fn parse_bearer(value: &str) -> Option<&str> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

impl FromRequest for BearerClaims {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let auth_value = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .ok_or(AppError::unauthorized(MISSING_BEARER))?;

            let token = parse_bearer(auth_value).ok_or(AppError::unauthorized(MISSING_BEARER))?;

            let app_state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::internal("AppState not found"))?;

            let claims = verify(token, &app_state.security.secret, SystemTime::now())?;
            Ok(BearerClaims(claims))
        })
    }
}
