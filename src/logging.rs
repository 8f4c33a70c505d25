//! Tracing bootstrap for host shells.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING_INSTALLED: Once = Once::new();

/// Installs the global tracing subscriber (idempotent).
///
/// The filter comes from `RUST_LOG` when set and falls back to `info`.
/// Installation failures are reported on stderr instead of panicking, so
/// embedders that already installed their own subscriber keep it.
pub fn install_tracing() {
    TRACING_INSTALLED.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let result = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
        if result.is_err() {
            eprintln!("estuary tracing subscriber failed to initialize");
        }
    });
}
