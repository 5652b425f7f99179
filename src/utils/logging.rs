// ============================================================================
// Logging Setup
// ============================================================================
//
// The library only emits `tracing` events:
// - trace: lossy precision reductions and formula evaluation
// - debug: explicit tag conversions, settlement clamps and outcomes
// - warn:  negative settlement inputs replaced by zero
//
// Binaries and tests that want to see them install a subscriber once.

use tracing::Level;

/// Install a global `fmt` subscriber printing events up to `level`.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(level: Level) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // Another test may have installed the subscriber first.
        let _ = init_logging(Level::DEBUG);
        assert!(init_logging(Level::TRACE).is_err());
    }
}
