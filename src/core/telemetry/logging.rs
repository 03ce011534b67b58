use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,object_store=warn,hyper=warn";

/// Installs the global fmt subscriber. `RUST_LOG` replaces the default filter.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt().with_env_filter(env_filter).with_target(false).try_init();
}
