//! # Gantry Kernel
//!
//! The host side of the gantry plugin runtime: everything that makes the
//! plugin ecosystem safe and composable.
//!
//! - [`kernel::Kernel`] — event bus, key-value store, timer wheel, plugin
//!   table, and the load/unload lifecycle, behind one lock that is never
//!   held across a plugin callback.
//! - [`loader`] — the [`ImageLoader`](loader::ImageLoader) seam over dynamic
//!   libraries, with the `libloading`-backed production implementation and
//!   descriptor parsing.
//! - [`vtable`] — the twelve C-convention trampolines plugins call back
//!   through, plus the install/uninstall of the kernel behind them.
//! - [`topics`] — topic names the host itself publishes on.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gantry_kernel::{Kernel, loader::DynamicImageLoader, vtable};
//!
//! let kernel = Arc::new(Kernel::new("plugins", Box::new(DynamicImageLoader)));
//! vtable::install(Arc::clone(&kernel));
//! kernel.load_plugin("echo.so")?;
//! // ...drive ticks and publishes...
//! kernel.shutdown();
//! vtable::uninstall();
//! ```

mod bus;
mod store;
mod timer;

pub mod error;
pub mod kernel;
pub mod loader;
pub mod topics;
pub mod vtable;

pub use error::{KernelError, KernelResult};
pub use kernel::{Kernel, KernelStats, PluginSummary};
pub use loader::{
    DependencyKind, DependencySpec, DynamicImageLoader, EntryPoints, ImageLoader, PluginImage,
    PluginMeta, Priority,
};

/// Host-assigned identity of a loaded plugin; strictly increasing, never
/// reused within a process lifetime.
pub type PluginId = u64;
