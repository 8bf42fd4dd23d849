//! Logging setup

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Default filter directive for a given verbosity
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "elastic_container=debug,info"
    } else {
        "info"
    }
}

/// Installs a tracing subscriber writing to stderr (if one is not already active).
///
/// `RUST_LOG` wins when present; otherwise `-v` selects debug output for this
/// crate. Calling this function multiple times is harmless.
pub fn init_tracing(verbose: bool) {
    if TRACING_INIT.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();

    let _ = TRACING_INIT.set(());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_follows_verbosity() {
        assert_eq!(default_directive(false), "info");
        assert!(default_directive(true).contains("debug"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(false);
        init_tracing(true);
    }
}
