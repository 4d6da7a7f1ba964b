pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod storage;

pub use domain::*;
pub use storage::{MemoryRepository, Repository};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Install the global tracing subscriber, logging to stderr.
/// `RUST_LOG` takes precedence; otherwise `verbose` selects debug over warn.
pub fn init_tracing(verbose: bool) {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let fallback = if verbose {
            "ledgerbook=debug"
        } else {
            "ledgerbook=warn"
        };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
