use super::security_config::SecurityConfig;

/// Application state shared by all workers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// JWT settings used to issue and verify tokens
    pub security: SecurityConfig,
}

impl AppState {
    pub fn new(security: SecurityConfig) -> Self {
        Self { security }
    }
}
