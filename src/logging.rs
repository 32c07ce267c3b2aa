//! Log output for the jsonfetch binary
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary so embedding applications keep control of their output.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "jsonfetch=debug"
    } else {
        "jsonfetch=info"
    }
}

/// Installs a stderr subscriber honouring `RUST_LOG`
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "jsonfetch=info");
        assert_eq!(default_directive(true), "jsonfetch=debug");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(false);
        init(true);
    }
}
