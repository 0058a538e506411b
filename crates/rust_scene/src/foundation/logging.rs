//! Logging utilities and diagnostics switch

use std::sync::atomic::{AtomicBool, Ordering};

pub use log::{debug, info, warn, error, trace};

static DIAGNOSTICS: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Initialize the logging system
pub fn init() {
    // A second call (e.g. from several tests) must not panic
    let _ = env_logger::try_init();
}

/// Initialize the logging system with an explicit filter such as `"rust_scene=debug"`
pub fn init_with_filter(filter: &str) {
    let _ = env_logger::Builder::new().parse_filters(filter).try_init();
}

/// Enable or disable warnings about degenerate geometry
pub fn set_diagnostics(enabled: bool) {
    DIAGNOSTICS.store(enabled, Ordering::Relaxed);
}

/// Whether degenerate geometry should be reported
pub fn diagnostics_enabled() -> bool {
    DIAGNOSTICS.load(Ordering::Relaxed)
}

/// Emit a warning about degenerate input when diagnostics are enabled
macro_rules! diagnostic {
    ($($arg:tt)+) => {
        if $crate::foundation::logging::diagnostics_enabled() {
            log::warn!($($arg)+);
        }
    };
}

pub(crate) use diagnostic;
