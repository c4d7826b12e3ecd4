use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "COMPOSER_LOG";
const DEFAULT_FILTER: &str = "info";

/// Installs the global fmt subscriber. `COMPOSER_LOG` wins over `RUST_LOG`;
/// repeated calls are ignored.
pub fn init() {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
