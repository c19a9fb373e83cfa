//! Terminal front end for the HireIntel admin dashboard.
pub mod platform;

pub use platform::app::run_app;
