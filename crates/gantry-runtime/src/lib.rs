//! Gantry Runtime - orchestration layer for the gantry plugin host.
//!
//! This crate provides:
//! - Manifest and host configuration reading (`config`)
//! - Raw-mode console input and the prompt line editor (`console`)
//! - Logging configuration (`logging`)
//! - The cooperative main loop (`runtime`)
//!
//! ```ignore
//! use gantry_runtime::config::{DEFAULT_MANIFEST, HostConfig, Manifest};
//! use gantry_runtime::runtime::GantryRuntime;
//!
//! fn main() -> anyhow::Result<()> {
//!     let manifest = Manifest::load(DEFAULT_MANIFEST.as_ref())?;
//!     let config = HostConfig::from_entries(manifest.section("HOST"));
//!     let runtime = GantryRuntime::new(config);
//!     runtime.bootstrap(manifest.section("PLUGINS"));
//!     runtime.run()
//! }
//! ```

pub mod config;
pub mod console;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{
    DEFAULT_MANIFEST, HOST_SECTION, HostConfig, Manifest, ManifestError, ManifestResult,
    PLUGINS_SECTION,
};
pub use console::{ConsoleKey, LineEditor, RawModeGuard};
pub use logging::LoggingBuilder;
pub use runtime::GantryRuntime;

// Re-export tracing for use by embedders
pub use tracing;
pub use tracing_subscriber;
