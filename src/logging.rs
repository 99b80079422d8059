/// Logging Module
///
/// Structured logging setup. Filter priority: explicit filter >
/// `LITEBASE_LOG` > `RUST_LOG` > `info`.

use tracing_subscriber::EnvFilter;

/// Environment variable read for the log filter.
pub const LOG_ENV: &str = "LITEBASE_LOG";

const DEFAULT_FILTER: &str = "info";

/// Installs a stderr fmt subscriber.
///
/// Returns false when a global subscriber was already installed.
pub fn init_logging(filter: Option<&str>) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Build the environment filter from config or defaults.
pub fn build_env_filter(custom_filter: Option<&str>) -> EnvFilter {
    if let Some(filter) = custom_filter {
        return EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    }
    if let Ok(filter) = std::env::var(LOG_ENV) {
        if let Ok(env_filter) = EnvFilter::try_new(&filter) {
            return env_filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
