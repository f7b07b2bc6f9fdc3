use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. Output goes to stderr so the scan report
/// written to stdout stays machine-readable.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
