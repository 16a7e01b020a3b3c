pub mod build_info;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber. `RUST_LOG` wins over the default
/// `finance_core=info` filter. Logs go to stderr so command output stays clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("finance_core=info"));

        let installed = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        if installed.is_ok() {
            tracing::info!("Finance Core tracing initialized.");
        }
    });
}
