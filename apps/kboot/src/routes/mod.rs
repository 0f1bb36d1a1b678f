use actix_web::web;

pub mod faketoken;
pub mod health;
pub mod principal;

/// Register all application routes.
///
/// `faketoken_enabled` decides whether the demo token endpoints are mounted
/// at all; when off, `/faketoken` falls through to the default 404.
pub fn configure(cfg: &mut web::ServiceConfig, faketoken_enabled: bool) {
    cfg.configure(health::configure_routes);
    cfg.configure(principal::configure_routes);

    if faketoken_enabled {
        cfg.configure(faketoken::configure_routes);
    }
}
