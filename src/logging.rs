use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

/// Build the filter: `RUST_LOG` if set, otherwise the configured directives.
pub fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Output goes to stderr so command results
/// on stdout stay clean. A second call is a no-op.
pub fn setup_logger(configured: &str) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact()
        .with_env_filter(build_filter(configured))
        .try_init();
}
