// ============================================================================
// Utilities Module
// Subscriber setup for the crate's tracing instrumentation
// ============================================================================

#[cfg(feature = "logging")]
mod logging;

#[cfg(feature = "logging")]
pub use logging::init_logging;
