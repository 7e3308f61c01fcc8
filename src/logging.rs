//! Logging initialization for the keydiff binary

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `keydiff=debug`
pub const LOG_ENV: &str = "KEYDIFF_LOG";

static INIT_ONCE: Once = Once::new();

/// Filter directive for a `-v` count: warn, info, debug, then trace
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "keydiff=warn",
        1 => "keydiff=info",
        2 => "keydiff=debug",
        _ => "keydiff=trace",
    }
}

/// Install a stderr subscriber. `KEYDIFF_LOG` takes precedence over the
/// verbosity level. Calling this more than once is a no-op.
pub fn init(verbosity: u8) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
        // Another subscriber may already be installed (tests, embedding)
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(0);
        init(3);
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(0), "keydiff=warn");
        assert_eq!(default_directive(2), "keydiff=debug");
        assert_eq!(default_directive(9), "keydiff=trace");
    }
}
