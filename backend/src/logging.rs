//! Tracing subscriber setup for the binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "linefilter=info,tower_http=info";

/// Install the global subscriber, logging to stderr.
///
/// `RUST_LOG` wins over `verbose`, which raises this crate to `debug`.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "linefilter=debug,tower_http=debug"
    } else {
        DEFAULT_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
