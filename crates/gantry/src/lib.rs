//! # Gantry
//!
//! A dynamic plugin host runtime: one long-running process that discovers,
//! loads, initializes, brokers communication between, and tears down
//! independently compiled shared libraries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐ tick/input ┌─────────┐  fan-out  ┌──────────┐
//! │   Driver    │───────────▶│ Kernel  │──────────▶│ Plugins  │
//! │ (main loop) │            │ bus/kv/ │◀──────────│ (cdylib) │
//! └─────────────┘            │ timers  │   vtable  └──────────┘
//!                            └─────────┘
//! ```
//!
//! - **gantry-abi** — the `#[repr(C)]` contract: descriptors, the twelve-slot
//!   host vtable, entry-point signatures, and plugin-author macros.
//! - **gantry-kernel** — event bus, key-value store, timer wheel, plugin
//!   loader and lifecycle, and the vtable trampolines.
//! - **gantry-runtime** — manifest/config reading, logging, the raw-mode
//!   console, and the cooperative main loop.
//!
//! ## Hosting
//!
//! ```rust,ignore
//! use gantry::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let manifest = Manifest::load("plugins.ini".as_ref())?;
//!     let config = HostConfig::from_entries(manifest.section("HOST"));
//!     let runtime = GantryRuntime::new(config);
//!     runtime.bootstrap(manifest.section("PLUGINS"));
//!     runtime.run()
//! }
//! ```
//!
//! ## Writing a plugin
//!
//! See [`gantry_abi::declare_plugin!`] — plugins depend only on `gantry-abi`
//! and build as `cdylib`s; they may equally be written in any language that
//! can export the three C entry points.

// ABI contract
pub use gantry_abi;

// Host kernel
pub use gantry_kernel;

// Runtime
pub use gantry_runtime;

/// Prelude module for convenient imports.
pub mod prelude {
    // Runtime - main entry point
    pub use gantry_runtime::runtime::GantryRuntime;

    // Configuration
    pub use gantry_runtime::config::{HostConfig, Manifest};

    // Kernel surface for embedders
    pub use gantry_kernel::{Kernel, KernelError, KernelStats, topics, vtable};

    // ABI types plugin-side code needs
    pub use gantry_abi::{EventCallback, PluginHost, PluginInfo};
}
