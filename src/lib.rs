//! NotosIsland: a small always-on-top overlay showing live system metrics.
//!
//! The window plumbing lives in [`app`]; everything it drives (polling,
//! formatting, display state, background style) is plain data and can be
//! exercised without a window.

pub mod app;
pub mod background;
pub mod config;
pub mod display;
pub mod error;
pub mod format;
pub mod gpu;
pub mod poller;
pub mod sensors;

pub use config::Config;
pub use error::{Result, WidgetError};

/// Initialise logging. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
