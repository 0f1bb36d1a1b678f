use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directives used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,kboot=info,actix_web=info";

/// JSON logs to stdout, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_target(false)
                .with_ansi(false)
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses_and_names_this_crate() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("kboot=info"), "{rendered}");
        assert!(rendered.contains("actix_web=info"), "{rendered}");
    }
}
