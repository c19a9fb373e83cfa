#![deny(missing_docs)]
//! Logging front door for the HireIntel crates.
//!
//! Core, engine and app log through the `hi_*` macros so the backend can be
//! swapped in one place. The binary installs the real sinks; test binaries
//! call [`initialize_for_tests`].

/// Fine-grained tracing, e.g. individual stream frames.
#[macro_export]
macro_rules! hi_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Lifecycle milestones: initial load settled, stream connected.
#[macro_export]
macro_rules! hi_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Effects, dropped payloads and other diagnostic detail.
#[macro_export]
macro_rules! hi_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Recoverable trouble such as a failed fetch or a degraded stream.
#[macro_export]
macro_rules! hi_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Failures the dashboard cannot recover from on its own.
#[macro_export]
macro_rules! hi_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Route HireIntel log records into the test harness output.
///
/// Records from other crates (reqwest, wiremock) are filtered out. Calling
/// this more than once is harmless.
pub fn initialize_for_tests() {
    use simplelog::{ConfigBuilder, TestLogger};

    let config = ConfigBuilder::new()
        .add_filter_allow_str("hireintel")
        .build();

    let _ = TestLogger::init(log::LevelFilter::Debug, config);
}
