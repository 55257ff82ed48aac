//! The host-services vtable and the plugin entry-point signatures.

use std::ffi::c_char;

use crate::info::PluginInfo;

/// Shape of every callback the host invokes: event subscribers and timer
/// callbacks share it, so one function pointer type works for both paths.
///
/// `event_name` and `payload` are NUL-terminated and never null at the
/// callback boundary; an empty payload means "no payload".  Both are valid
/// only for the duration of the call.
pub type EventCallback = extern "C" fn(event_name: *const c_char, payload: *const c_char);

/// The host interface passed to every `plugin_init`.
///
/// Twelve function pointers bound by the host at startup.  The order and
/// shape of this struct are part of [`ABI_V1`](crate::ABI_V1) and never
/// change within it.  All strings crossing these slots are NUL-terminated,
/// immutable, and caller-owned; they are valid only for the duration of the
/// call except the `get_data` return value, which stays valid until the next
/// `set_data`/`delete_data` of the same key or host shutdown.
#[repr(C)]
pub struct PluginHost {
    /// Synchronous fan-out of `payload` to every subscriber of `event_name`,
    /// in registration order.
    pub send_event: extern "C" fn(event_name: *const c_char, payload: *const c_char),
    /// Appends `callback` to the topic's subscriber list.  Duplicate
    /// registrations are legal and are not collapsed.
    pub register_event: extern "C" fn(event_name: *const c_char, callback: EventCallback),
    /// Removes every occurrence of `callback` from every topic.
    pub unregister_event: extern "C" fn(callback: EventCallback),
    /// Loads another plugin by file name.  Returns true on success or when
    /// the plugin is already loaded.
    pub load_plugin: extern "C" fn(name: *const c_char) -> bool,
    /// Unloads a plugin by name.  Returns false when no such plugin is
    /// loaded.  Requests made from inside a callback are deferred to the next
    /// host iteration.
    pub unload_plugin: extern "C" fn(name: *const c_char) -> bool,
    /// Writes `[level] message` to the host log.  `level` is advisory.
    pub log: extern "C" fn(level: *const c_char, message: *const c_char),
    /// Stores `value` under `key`; last write wins.
    pub set_data: extern "C" fn(key: *const c_char, value: *const c_char) -> bool,
    /// Returns the value stored under `key`, or null.  The pointer stays
    /// valid until the next `set_data`/`delete_data` of the same key.
    pub get_data: extern "C" fn(key: *const c_char) -> *const c_char,
    /// Presence predicate for `key`.
    pub has_data: extern "C" fn(key: *const c_char) -> bool,
    /// Removes `key`; returns whether a removal actually occurred.
    pub delete_data: extern "C" fn(key: *const c_char) -> bool,
    /// Schedules `callback` to fire after `period_ms` (and every `period_ms`
    /// thereafter when `repeat`).  Returns the timer id, strictly increasing
    /// from 1.  The callback is delivered as `("timer", "")`.
    pub set_timer: extern "C" fn(period_ms: u32, callback: EventCallback, repeat: bool) -> u64,
    /// Cancels an active timer; returns whether one existed.
    pub cancel_timer: extern "C" fn(timer_id: u64) -> bool,
}

// ─── Entry points ─────────────────────────────────────────────────────────────

/// `plugin_get_info` — returns a descriptor valid for the library's lifetime.
pub type PluginGetInfoFn = unsafe extern "C" fn() -> *const PluginInfo;
/// `plugin_init` — true on success; on false the host releases the library
/// without calling `plugin_shutdown`.
pub type PluginInitFn = unsafe extern "C" fn(host: *mut PluginHost) -> bool;
/// `plugin_shutdown` — releases plugin resources; the plugin must not call
/// back into the host after returning.
pub type PluginShutdownFn = unsafe extern "C" fn();

/// Export name resolved to [`PluginGetInfoFn`].
pub const SYM_PLUGIN_GET_INFO: &[u8] = b"plugin_get_info\0";
/// Export name resolved to [`PluginInitFn`].
pub const SYM_PLUGIN_INIT: &[u8] = b"plugin_init\0";
/// Export name resolved to [`PluginShutdownFn`].
pub const SYM_PLUGIN_SHUTDOWN: &[u8] = b"plugin_shutdown\0";
