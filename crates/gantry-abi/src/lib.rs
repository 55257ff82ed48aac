//! # Gantry ABI
//!
//! The binary contract between the gantry host and every plugin it loads.
//!
//! Plugins are independently compiled shared objects; nothing in this crate
//! assumes host and plugin share a Rust toolchain.  Everything that crosses
//! the boundary is `#[repr(C)]`, C-calling-convention, and NUL-terminated:
//!
//! - [`PluginInfo`] / [`Dependency`] — the static descriptor a plugin exports.
//! - [`PluginHost`] — the host-services vtable handed to `plugin_init`.
//!   Its field order is part of the ABI and never changes within [`ABI_V1`].
//! - The three mandatory entry points every plugin exports:
//!
//! | Symbol | Signature |
//! |--------|-----------|
//! | `plugin_get_info` | `() -> *const PluginInfo` |
//! | `plugin_init` | `(*mut PluginHost) -> bool` |
//! | `plugin_shutdown` | `() -> ()` |
//!
//! # Writing a plugin in Rust
//!
//! The [`declare_plugin!`] macro generates the three exports, and
//! [`event_handler!`] wraps a callback body in the C signature:
//!
//! ```rust,ignore
//! use gantry_abi::{self as abi, DEP_KIND_REQUIRED, PRIORITY_DEFAULT};
//!
//! gantry_abi::event_handler! {
//!     fn on_chat(_topic, payload) {
//!         abi::log(c"INFO", payload);
//!     }
//! }
//!
//! fn init() -> bool {
//!     abi::register_event(c"chatMessage", on_chat);
//!     true
//! }
//!
//! fn shutdown() {}
//!
//! gantry_abi::declare_plugin! {
//!     name: c"greeter",
//!     version: c"1.0.0",
//!     priority: PRIORITY_DEFAULT,
//!     dependencies: [],
//!     init: init,
//!     shutdown: shutdown,
//! }
//! ```
//!
//! Strings crossing the boundary are immutable, caller-owned, and valid only
//! for the duration of the call unless documented otherwise (`get_data`
//! return values, [`PluginInfo`] fields).

pub mod host;
pub mod info;
pub mod plugin;

mod export;

pub use host::{
    EventCallback, PluginGetInfoFn, PluginHost, PluginInitFn, PluginShutdownFn,
    SYM_PLUGIN_GET_INFO, SYM_PLUGIN_INIT, SYM_PLUGIN_SHUTDOWN,
};
pub use info::{
    ABI_V1, DEP_KIND_OPTIONAL, DEP_KIND_REQUIRED, Dependency, MAX_DEPENDENCIES, PRIORITY_DEFAULT,
    PRIORITY_FIRST, PRIORITY_LATER, PluginInfo, dependency_table,
};
pub use plugin::{
    bind_host, cancel_timer, delete_data, get_data, has_data, load_plugin, log, register_event,
    send_event, set_data, set_timer, unbind_host, unload_plugin, unregister_event,
};
