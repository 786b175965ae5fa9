use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

/// Default filter used when `RUST_LOG` is unset. Per-turn chatter stays at debug.
pub const DEFAULT_FILTER: &str = "info,tunnelrogue::ai=warn";

/// Installs the global subscriber. Safe to call more than once; the first call wins.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "debug".to_string()
    } else {
        DEFAULT_FILTER.to_string()
    };
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact();
        // a test harness may already own the global subscriber
        let _ = subscriber.try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init(false);
        init(true);
        tracing::info!("logging initialised twice");
    }
}
