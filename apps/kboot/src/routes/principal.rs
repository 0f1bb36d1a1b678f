use actix_web::{web, HttpResponse};
use tracing::debug;

use crate::error::AppError;
use crate::extractors::bearer::BearerClaims;

/// Echo the verified claims of the caller's bearer token.
async fn principal(claims: BearerClaims) -> Result<HttpResponse, AppError> {
    debug!(sub = %claims.sub, jti = %claims.jti, "principal resolved");
    Ok(HttpResponse::Ok().json(claims.into_inner()))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/principal", web::get().to(principal));
}
