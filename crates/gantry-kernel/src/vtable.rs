//! The concrete host-services vtable handed to every `plugin_init`.
//!
//! The ABI carries no receiver pointer, so the C-convention trampolines here
//! reach the kernel through a process-global slot: [`install`] the kernel
//! before loading plugins, [`uninstall`] after shutdown.  While no kernel is
//! installed every slot is a no-op returning its failure value.

use std::ffi::{CStr, CString, c_char};
use std::ptr;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, trace, warn};

use gantry_abi::{EventCallback, PluginHost};

use crate::kernel::Kernel;

static ACTIVE: RwLock<Option<Arc<Kernel>>> = RwLock::new(None);

/// Installs `kernel` as the receiver behind the vtable trampolines,
/// replacing any previous kernel.  One kernel per process.
pub fn install(kernel: Arc<Kernel>) {
    *ACTIVE.write() = Some(kernel);
}

/// Clears the installed kernel; subsequent vtable calls become no-ops.
pub fn uninstall() {
    *ACTIVE.write() = None;
}

/// The currently installed kernel, if any.
pub fn active() -> Option<Arc<Kernel>> {
    ACTIVE.read().clone()
}

/// Pointer to the host vtable, shaped for `plugin_init`.
///
/// The table itself is immutable static data; the `*mut` is signature
/// fidelity only and plugins must not write through it.
pub fn host_vtable() -> *mut PluginHost {
    &HOST_VTABLE as *const PluginHost as *mut PluginHost
}

static HOST_VTABLE: PluginHost = PluginHost {
    send_event: host_send_event,
    register_event: host_register_event,
    unregister_event: host_unregister_event,
    load_plugin: host_load_plugin,
    unload_plugin: host_unload_plugin,
    log: host_log,
    set_data: host_set_data,
    get_data: host_get_data,
    has_data: host_has_data,
    delete_data: host_delete_data,
    set_timer: host_set_timer,
    cancel_timer: host_cancel_timer,
};

/// Borrows a plugin-supplied string for the duration of the trampoline.
fn borrowed<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: the ABI requires NUL-terminated strings valid for the
        // duration of the call; null is the only tolerated deviation.
        Some(unsafe { CStr::from_ptr(ptr) })
    }
}

extern "C" fn host_send_event(topic: *const c_char, payload: *const c_char) {
    let Some(kernel) = active() else { return };
    let Some(topic) = borrowed(topic) else { return };
    let payload = borrowed(payload)
        .map(|p| p.to_string_lossy())
        .unwrap_or_default();
    kernel.publish(&topic.to_string_lossy(), &payload);
}

extern "C" fn host_register_event(topic: *const c_char, callback: EventCallback) {
    let Some(kernel) = active() else { return };
    let Some(topic) = borrowed(topic) else { return };
    kernel.subscribe(&topic.to_string_lossy(), callback);
}

extern "C" fn host_unregister_event(callback: EventCallback) {
    if let Some(kernel) = active() {
        kernel.unsubscribe(callback);
    }
}

extern "C" fn host_load_plugin(name: *const c_char) -> bool {
    let Some(kernel) = active() else { return false };
    let Some(name) = borrowed(name) else {
        return false;
    };
    let name = name.to_string_lossy();
    match kernel.load_plugin(&name) {
        Ok(()) => true,
        Err(err) => {
            error!(plugin = %name, error = %err, "Plugin-requested load failed");
            false
        }
    }
}

extern "C" fn host_unload_plugin(name: *const c_char) -> bool {
    let Some(kernel) = active() else { return false };
    let Some(name) = borrowed(name) else {
        return false;
    };
    kernel.unload_plugin(&name.to_string_lossy())
}

extern "C" fn host_log(level: *const c_char, message: *const c_char) {
    let Some(message) = borrowed(message) else {
        return;
    };
    let message = message.to_string_lossy();
    let level = borrowed(level)
        .map(|l| l.to_string_lossy().to_ascii_uppercase())
        .unwrap_or_default();
    match level.as_str() {
        "ERROR" => error!(target: "plugin", "{message}"),
        "WARN" | "WARNING" => warn!(target: "plugin", "{message}"),
        "DEBUG" => debug!(target: "plugin", "{message}"),
        "TRACE" => trace!(target: "plugin", "{message}"),
        _ => info!(target: "plugin", "{message}"),
    }
}

extern "C" fn host_set_data(key: *const c_char, value: *const c_char) -> bool {
    let Some(kernel) = active() else { return false };
    let (Some(key), Some(value)) = (borrowed(key), borrowed(value)) else {
        return false;
    };
    kernel.set_data(&key.to_string_lossy(), value.to_owned());
    true
}

extern "C" fn host_get_data(key: *const c_char) -> *const c_char {
    let Some(kernel) = active() else {
        return ptr::null();
    };
    let Some(key) = borrowed(key) else {
        return ptr::null();
    };
    kernel.get_data_ptr(&key.to_string_lossy())
}

extern "C" fn host_has_data(key: *const c_char) -> bool {
    let Some(kernel) = active() else { return false };
    borrowed(key).is_some_and(|key| kernel.has_data(&key.to_string_lossy()))
}

extern "C" fn host_delete_data(key: *const c_char) -> bool {
    let Some(kernel) = active() else { return false };
    borrowed(key).is_some_and(|key| kernel.delete_data(&key.to_string_lossy()))
}

extern "C" fn host_set_timer(period_ms: u32, callback: EventCallback, repeat: bool) -> u64 {
    active().map_or(0, |kernel| kernel.set_timer(period_ms, callback, repeat))
}

extern "C" fn host_cancel_timer(timer_id: u64) -> bool {
    active().is_some_and(|kernel| kernel.cancel_timer(timer_id))
}
