//! Plugin-side helpers over the host vtable.
//!
//! Each plugin image carries its own copy of this module (it is statically
//! linked into the `cdylib`), so the bound host pointer is per-plugin state,
//! mirroring the conventional `plugin_host` global of C plugins.  The
//! [`declare_plugin!`](crate::declare_plugin) macro binds the pointer before
//! the author's init runs and unbinds it after shutdown; every helper is a
//! no-op (or returns its failure value) while unbound.

use std::ffi::{CStr, CString, c_char};
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::host::{EventCallback, PluginHost};

static HOST: AtomicPtr<PluginHost> = AtomicPtr::new(ptr::null_mut());

/// Binds the host vtable for this image.  Called by the generated
/// `plugin_init`; plugin authors normally never call it themselves.
pub fn bind_host(host: *mut PluginHost) {
    HOST.store(host, Ordering::Release);
}

/// Clears the bound vtable.  Called by the generated `plugin_shutdown`.
pub fn unbind_host() {
    HOST.store(ptr::null_mut(), Ordering::Release);
}

fn host<'a>() -> Option<&'a PluginHost> {
    let ptr = HOST.load(Ordering::Acquire);
    if ptr.is_null() {
        None
    } else {
        // The host guarantees the vtable outlives the plugin; the pointer is
        // only non-null between init and shutdown.
        Some(unsafe { &*ptr })
    }
}

/// Publishes `payload` on `topic`.
pub fn send_event(topic: &CStr, payload: &CStr) {
    if let Some(h) = host() {
        (h.send_event)(topic.as_ptr(), payload.as_ptr());
    }
}

/// Subscribes `callback` to `topic`.
pub fn register_event(topic: &CStr, callback: EventCallback) {
    if let Some(h) = host() {
        (h.register_event)(topic.as_ptr(), callback);
    }
}

/// Removes every subscription of `callback`, across all topics.
pub fn unregister_event(callback: EventCallback) {
    if let Some(h) = host() {
        (h.unregister_event)(callback);
    }
}

/// Asks the host to load another plugin by file name.
pub fn load_plugin(name: &CStr) -> bool {
    host().is_some_and(|h| (h.load_plugin)(name.as_ptr()))
}

/// Asks the host to unload a plugin by name.
pub fn unload_plugin(name: &CStr) -> bool {
    host().is_some_and(|h| (h.unload_plugin)(name.as_ptr()))
}

/// Writes `[level] message` to the host log.
pub fn log(level: &CStr, message: &CStr) {
    if let Some(h) = host() {
        (h.log)(level.as_ptr(), message.as_ptr());
    }
}

/// Stores `value` under `key` in the shared store.
pub fn set_data(key: &CStr, value: &CStr) -> bool {
    host().is_some_and(|h| (h.set_data)(key.as_ptr(), value.as_ptr()))
}

/// Fetches the value under `key`, copied out of the host store.
pub fn get_data(key: &CStr) -> Option<CString> {
    let h = host()?;
    let value = (h.get_data)(key.as_ptr());
    if value.is_null() {
        None
    } else {
        // Valid until the next set/delete of the key; we copy before
        // returning so the caller never holds the raw pointer.
        Some(unsafe { CStr::from_ptr(value) }.to_owned())
    }
}

/// Presence predicate for `key`.
pub fn has_data(key: &CStr) -> bool {
    host().is_some_and(|h| (h.has_data)(key.as_ptr()))
}

/// Removes `key`; returns whether a removal occurred.
pub fn delete_data(key: &CStr) -> bool {
    host().is_some_and(|h| (h.delete_data)(key.as_ptr()))
}

/// Arms a timer.  Returns the timer id, or 0 when no host is bound.
pub fn set_timer(period_ms: u32, callback: EventCallback, repeat: bool) -> u64 {
    host().map_or(0, |h| (h.set_timer)(period_ms, callback, repeat))
}

/// Cancels a timer by id.
pub fn cancel_timer(id: u64) -> bool {
    host().is_some_and(|h| (h.cancel_timer)(id))
}
