use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "livi_media=info";

/// Logs go to stderr so command output on stdout stays pipeable.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
