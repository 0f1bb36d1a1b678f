#![allow(dead_code)]

// tests/common/mod.rs
use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use kboot::middleware::{RequestTrace, StructuredLogger, TraceSpan};
use kboot::routes;
use kboot::state::{AppState, SecurityConfig};

pub const TEST_ISSUER: &str = "kboot-test-issuer";
pub const TEST_AUDIENCE: &str = "kboot-test-audience";
pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only";

// Logging is auto-installed for every test binary that includes this module
#[ctor::ctor]
fn init_logging() {
    kboot_test_support::logging::init();
}

pub fn test_security() -> SecurityConfig {
    SecurityConfig::new(TEST_ISSUER, TEST_AUDIENCE, TEST_SECRET)
        .expect("test security config should build")
}

type RouteConfigFn = Box<dyn Fn(&mut web::ServiceConfig) + Send + Sync>;

/// Builds a service with the production middleware stack.
pub struct TestAppBuilder {
    state: AppState,
    route_config: Option<RouteConfigFn>,
}

impl TestAppBuilder {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            route_config: None,
        }
    }

    /// Production routes, with the demo token endpoints on or off.
    pub fn with_prod_routes(mut self, faketoken_enabled: bool) -> Self {
        self.route_config = Some(Box::new(move |cfg: &mut web::ServiceConfig| {
            routes::configure(cfg, faketoken_enabled)
        }) as RouteConfigFn);
        self
    }

    pub fn with_routes<F>(mut self, config_fn: F) -> Self
    where
        F: Fn(&mut web::ServiceConfig) + Send + Sync + 'static,
    {
        self.route_config = Some(Box::new(config_fn) as RouteConfigFn);
        self
    }

    pub async fn build(
        self,
    ) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
        let data = web::Data::new(self.state);
        let route_config = self.route_config;

        test::init_service(
            App::new()
                .wrap(StructuredLogger)
                .wrap(TraceSpan)
                .wrap(RequestTrace)
                .app_data(data)
                .configure(move |cfg| {
                    if let Some(config_fn) = &route_config {
                        config_fn(cfg);
                    }
                }),
        )
        .await
    }
}

pub fn create_test_app() -> TestAppBuilder {
    TestAppBuilder::new(AppState::new(test_security()))
}
