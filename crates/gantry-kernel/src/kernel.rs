//! The host kernel: event bus, store, timers, plugin table, and lifecycle.
//!
//! [`Kernel`] is an explicit value — construct it, install it behind the
//! vtable with [`vtable::install`](crate::vtable::install), and drive it from
//! the main loop.  All state sits behind one `parking_lot` lock; the lock is
//! **never held across a plugin callback invocation**, so callbacks are free
//! to re-enter every kernel operation.
//!
//! # Ownership scopes
//!
//! The ABI identifies callbacks only by pointer, so the kernel tags every
//! subscription and timer with the plugin whose code was on the stack when
//! the registration was made: a scope is pushed around `plugin_init` and
//! around each callback delivery.  Unloading a plugin scrubs everything
//! carrying its tag before the library handle is released, which keeps the
//! bus and the timer wheel free of pointers into unmapped code.
//!
//! # Re-entrant unloads
//!
//! A callback may request the unload of any plugin — including its own.
//! Unload requests made while a dispatch is in flight are queued and drained
//! at the top of the next main-loop iteration; loads happen immediately.

use std::ffi::{CStr, CString, c_char};
use std::fmt;
use std::path::PathBuf;
use std::ptr;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use gantry_abi::{ABI_V1, EventCallback};

use crate::PluginId;
use crate::bus::EventBus;
use crate::error::{KernelError, KernelResult};
use crate::loader::{DependencyKind, EntryPoints, ImageLoader, PluginImage, PluginMeta};
use crate::store::DataStore;
use crate::timer::TimerWheel;
use crate::{topics, vtable};

// ─── Plugin record ────────────────────────────────────────────────────────────

/// Table entry for one live plugin.
///
/// A record exists iff `plugin_init` returned success and `plugin_shutdown`
/// has not yet been called.  Field order matters: `image` is declared last
/// so the library handle is the final resource dropped.
struct PluginRecord {
    id: PluginId,
    requested_name: String,
    meta: PluginMeta,
    entries: EntryPoints,
    /// Held for Drop; releasing it unmaps the plugin's code.
    #[allow(dead_code)]
    image: Box<dyn PluginImage>,
}

/// Read-only view of a loaded plugin, for listings and logs.
#[derive(Debug, Clone)]
pub struct PluginSummary {
    /// Name the loader was asked to open (typically a file name).
    pub requested_name: String,
    /// Name the plugin declares about itself.
    pub name: String,
    /// Declared version string.
    pub version: String,
}

// ─── Kernel state ─────────────────────────────────────────────────────────────

struct KernelState {
    bus: EventBus,
    store: DataStore,
    timers: TimerWheel,
    plugins: Vec<PluginRecord>,
    /// Requested names currently mid-load; breaks dependency cycles.
    loading: Vec<String>,
    /// Stack of plugin tags for registrations made by nested init/dispatch.
    owner_scopes: Vec<Option<PluginId>>,
    /// Non-zero while a fan-out (event or timer) is in flight.
    dispatch_depth: u32,
    /// Unloads requested during dispatch, drained by the driver.
    pending_unloads: Vec<String>,
    next_plugin_id: PluginId,
}

impl KernelState {
    fn new() -> Self {
        Self {
            bus: EventBus::default(),
            store: DataStore::default(),
            timers: TimerWheel::default(),
            plugins: Vec::new(),
            loading: Vec::new(),
            owner_scopes: Vec::new(),
            dispatch_depth: 0,
            pending_unloads: Vec::new(),
            next_plugin_id: 1,
        }
    }

    fn current_owner(&self) -> Option<PluginId> {
        self.owner_scopes.last().copied().flatten()
    }

    /// Index of the record loaded from the file name `name`.
    ///
    /// Requested names are the host's identity namespace: loads are deduped
    /// on them and on nothing else.  A plugin's self-declared `info.name` is
    /// advisory and must never make an unrelated file look already loaded.
    fn find_requested(&self, name: &str) -> Option<usize> {
        self.plugins.iter().position(|p| p.requested_name == name)
    }

    /// Unload lookup: the requested (file) name wins; the declared name is
    /// accepted as a console convenience, first match in load order.
    fn find_for_unload(&self, name: &str) -> Option<usize> {
        self.find_requested(name)
            .or_else(|| self.plugins.iter().position(|p| p.meta.name == name))
    }
}

// ─── Kernel ───────────────────────────────────────────────────────────────────

/// The gantry host kernel.
pub struct Kernel {
    plugin_dir: PathBuf,
    loader: Box<dyn ImageLoader>,
    state: Mutex<KernelState>,
}

impl Kernel {
    /// Creates a kernel that resolves plugin names against `plugin_dir`.
    pub fn new(plugin_dir: impl Into<PathBuf>, loader: Box<dyn ImageLoader>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            loader,
            state: Mutex::new(KernelState::new()),
        }
    }

    // ─── Event bus ───────────────────────────────────────────────────────────

    /// Publishes `payload` on `topic`: synchronous fan-out to a snapshot of
    /// the topic's subscribers, in registration order.
    ///
    /// Callbacks may publish, subscribe, unsubscribe, arm timers, and load
    /// plugins re-entrantly; nested publishes fan out synchronously.  A
    /// callback unsubscribed mid-publish still runs for the snapshot it was
    /// part of.
    pub fn publish(&self, topic: &str, payload: &str) {
        let (Ok(c_topic), Ok(c_payload)) = (CString::new(topic), CString::new(payload)) else {
            warn!(topic, "Discarding publish with embedded NUL");
            return;
        };
        let snapshot = {
            let mut state = self.state.lock();
            state.dispatch_depth += 1;
            state.bus.snapshot(topic)
        };
        for subscription in snapshot {
            self.deliver(subscription.callback, subscription.owner, &c_topic, &c_payload);
        }
        self.state.lock().dispatch_depth -= 1;
    }

    /// Appends `callback` to `topic`'s subscriber list, tagged with the
    /// plugin currently on the call stack (if any).
    pub fn subscribe(&self, topic: &str, callback: EventCallback) {
        let mut state = self.state.lock();
        let owner = state.current_owner();
        state.bus.subscribe(topic, callback, owner);
    }

    /// Removes every occurrence of `callback` from every topic.
    pub fn unsubscribe(&self, callback: EventCallback) {
        self.state.lock().bus.unsubscribe_callback(callback);
    }

    /// Invokes one callback under its owner's scope, with the kernel lock
    /// released for the duration of the call.
    fn deliver(
        &self,
        callback: EventCallback,
        owner: Option<PluginId>,
        topic: &CStr,
        payload: &CStr,
    ) {
        self.state.lock().owner_scopes.push(owner);
        callback(topic.as_ptr(), payload.as_ptr());
        self.state.lock().owner_scopes.pop();
    }

    // ─── Key-value store ─────────────────────────────────────────────────────

    /// Stores `value` under `key`; last write wins.
    pub fn set_data(&self, key: &str, value: CString) {
        self.state.lock().store.set(key, value);
    }

    /// Copies the value under `key` out of the store.
    pub fn get_data(&self, key: &str) -> Option<CString> {
        self.state.lock().store.get(key).map(CStr::to_owned)
    }

    /// Raw pointer to the value under `key`, or null.
    ///
    /// ABI contract: the pointer stays valid until the next
    /// `set_data`/`delete_data` of the same key or kernel teardown — the
    /// store owns values as `CString`, so unrelated writes never move them.
    pub fn get_data_ptr(&self, key: &str) -> *const c_char {
        self.state
            .lock()
            .store
            .get(key)
            .map_or(ptr::null(), CStr::as_ptr)
    }

    /// Presence predicate for `key`.
    pub fn has_data(&self, key: &str) -> bool {
        self.state.lock().store.has(key)
    }

    /// Removes `key`; returns whether a removal actually occurred.
    pub fn delete_data(&self, key: &str) -> bool {
        self.state.lock().store.delete(key)
    }

    // ─── Timers ──────────────────────────────────────────────────────────────

    /// Schedules a timer; first fire at `now + period_ms`.  Returns its id.
    pub fn set_timer(&self, period_ms: u32, callback: EventCallback, repeat: bool) -> u64 {
        let now = Instant::now();
        let mut state = self.state.lock();
        let owner = state.current_owner();
        state.timers.schedule(now, period_ms, callback, repeat, owner)
    }

    /// Cancels an active timer; returns whether one existed.
    pub fn cancel_timer(&self, id: u64) -> bool {
        self.state.lock().timers.cancel(id)
    }

    /// Advances the timer wheel to `now` and delivers everything due as
    /// `("timer", "")`, in insertion order.
    pub fn tick(&self, now: Instant) {
        let due = {
            let mut state = self.state.lock();
            state.dispatch_depth += 1;
            state.timers.advance(now)
        };
        for (callback, owner) in due {
            self.deliver(callback, owner, c"timer", c"");
        }
        self.state.lock().dispatch_depth -= 1;
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    /// Loads the plugin file `requested` from the plugin directory.
    ///
    /// Already-loaded plugins and dependency cycles resolve to success
    /// without touching the loader.  Required dependencies load before the
    /// parent and abort it on failure; optional ones are best-effort.  On
    /// success the host publishes the plugin's declared name on
    /// [`topics::PLUGIN_LOADED`].
    pub fn load_plugin(&self, requested: &str) -> KernelResult<()> {
        {
            let mut state = self.state.lock();
            if state.find_requested(requested).is_some() {
                debug!(plugin = %requested, "Plugin already loaded");
                return Ok(());
            }
            if state.loading.iter().any(|n| n == requested) {
                debug!(plugin = %requested, "Load already in progress, treating as satisfied");
                return Ok(());
            }
            state.loading.push(requested.to_string());
        }

        let result = self.load_plugin_inner(requested);

        {
            let mut state = self.state.lock();
            if let Some(pos) = state.loading.iter().rposition(|n| n == requested) {
                state.loading.remove(pos);
            }
        }

        match result {
            Ok(declared_name) => {
                self.publish(topics::PLUGIN_LOADED, &declared_name);
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    fn load_plugin_inner(&self, requested: &str) -> KernelResult<String> {
        let path = self.plugin_dir.join(requested);
        let image = self.loader.open(&path)?;
        let entries = image.entries();

        // SAFETY: the image just resolved these exports; the descriptor
        // pointer must stay valid for the library's lifetime per the ABI.
        let info = unsafe { (entries.get_info)() };
        if info.is_null() {
            return Err(KernelError::InvalidDescriptor {
                name: requested.to_string(),
            });
        }
        let abi_version = unsafe { (*info).abi_version };
        if abi_version != ABI_V1 {
            return Err(KernelError::AbiMismatch {
                name: requested.to_string(),
                found: abi_version,
                required: ABI_V1,
            });
        }
        let meta = unsafe { PluginMeta::from_raw(&*info) };

        for dep in &meta.dependencies {
            match dep.kind {
                DependencyKind::Required => {
                    if let Err(source) = self.load_plugin(&dep.name) {
                        return Err(KernelError::DependencyUnavailable {
                            name: requested.to_string(),
                            dependency: dep.name.clone(),
                            source: Box::new(source),
                        });
                    }
                }
                DependencyKind::Optional => {
                    if let Err(error) = self.load_plugin(&dep.name) {
                        warn!(
                            plugin = %requested,
                            dependency = %dep.name,
                            %error,
                            "Optional dependency unavailable"
                        );
                    }
                }
            }
        }

        let id = {
            let mut state = self.state.lock();
            let id = state.next_plugin_id;
            state.next_plugin_id += 1;
            state.owner_scopes.push(Some(id));
            id
        };

        // SAFETY: entry point resolved from the live image above.
        let accepted = unsafe { (entries.init)(vtable::host_vtable()) };

        {
            let mut state = self.state.lock();
            state.owner_scopes.pop();
            if !accepted {
                // Registrations made before the rejection would dangle once
                // the image drops; scrub them.  Shutdown is not called.
                state.bus.unsubscribe_owner(id);
                state.timers.cancel_owner(id);
            }
        }
        if !accepted {
            return Err(KernelError::InitRejected {
                name: requested.to_string(),
            });
        }

        let declared_name = meta.name.clone();
        info!(
            plugin = %declared_name,
            version = %meta.version,
            file = %requested,
            "Plugin loaded"
        );
        self.state.lock().plugins.push(PluginRecord {
            id,
            requested_name: requested.to_string(),
            meta,
            entries,
            image,
        });
        Ok(declared_name)
    }

    /// Unloads the named plugin.
    ///
    /// The requested (file) name is the canonical identity; the declared
    /// name is accepted as a console convenience, first match in load order
    /// winning on collision.  While a dispatch is in flight the actual
    /// teardown is deferred to
    /// [`drain_pending_unloads`](Self::drain_pending_unloads); the result
    /// still reflects table membership at request time.
    pub fn try_unload_plugin(&self, name: &str) -> KernelResult<()> {
        let deferred = {
            let mut state = self.state.lock();
            let Some(pos) = state.find_for_unload(name) else {
                return Err(KernelError::UnknownPlugin(name.to_string()));
            };
            if state.dispatch_depth > 0 {
                let requested = state.plugins[pos].requested_name.clone();
                if !state.pending_unloads.contains(&requested) {
                    state.pending_unloads.push(requested);
                }
                true
            } else {
                false
            }
        };
        if deferred {
            debug!(plugin = %name, "Unload requested during dispatch, deferred");
            return Ok(());
        }
        if self.unload_now(name) {
            Ok(())
        } else {
            Err(KernelError::UnknownPlugin(name.to_string()))
        }
    }

    /// [`try_unload_plugin`](Self::try_unload_plugin) downgraded to the ABI
    /// boolean: false when no such plugin is loaded, with no side effect.
    pub fn unload_plugin(&self, name: &str) -> bool {
        match self.try_unload_plugin(name) {
            Ok(()) => true,
            Err(error) => {
                debug!(plugin = %name, %error, "Unload refused");
                false
            }
        }
    }

    fn unload_now(&self, name: &str) -> bool {
        let record = {
            let mut state = self.state.lock();
            let Some(pos) = state.find_for_unload(name) else {
                return false;
            };
            state.plugins.remove(pos)
        };

        // The record is already out of the table, so a shutdown hook that
        // re-enters the host cannot unload the same plugin twice.
        // SAFETY: the image is still alive; it is dropped below.
        unsafe { (record.entries.shutdown)() };

        {
            let mut state = self.state.lock();
            state.bus.unsubscribe_owner(record.id);
            state.timers.cancel_owner(record.id);
        }

        info!(
            plugin = %record.meta.name,
            file = %record.requested_name,
            "Plugin unloaded"
        );
        // Releases the library handle — strictly after the scrub, so no
        // subscription or timer can point into unmapped code.
        drop(record);
        true
    }

    /// Performs unloads that were requested during dispatch.  The driver
    /// calls this at the top of every iteration.
    pub fn drain_pending_unloads(&self) {
        loop {
            let next = {
                let mut state = self.state.lock();
                if state.pending_unloads.is_empty() {
                    None
                } else {
                    Some(state.pending_unloads.remove(0))
                }
            };
            let Some(name) = next else { break };
            self.unload_now(&name);
        }
    }

    /// Unloads every plugin in reverse load order.
    pub fn shutdown(&self) {
        self.drain_pending_unloads();
        loop {
            let last = {
                let state = self.state.lock();
                state.plugins.last().map(|p| p.requested_name.clone())
            };
            let Some(name) = last else { break };
            self.unload_now(&name);
        }
    }

    // ─── Introspection ───────────────────────────────────────────────────────

    /// Summaries of every loaded plugin, in load order.
    pub fn plugin_summaries(&self) -> Vec<PluginSummary> {
        self.state
            .lock()
            .plugins
            .iter()
            .map(|p| PluginSummary {
                requested_name: p.requested_name.clone(),
                name: p.meta.name.clone(),
                version: p.meta.version.clone(),
            })
            .collect()
    }

    /// Point-in-time counters, for logs and tests.
    pub fn stats(&self) -> KernelStats {
        let state = self.state.lock();
        KernelStats {
            plugins: state.plugins.len(),
            subscriptions: state.bus.subscription_count(),
            timers: state.timers.active_count(),
        }
    }
}

/// Counters reported by [`Kernel::stats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelStats {
    /// Plugins currently in the table.
    pub plugins: usize,
    /// Subscriptions across all topics.
    pub subscriptions: usize,
    /// Active timers.
    pub timers: usize,
}

impl fmt::Display for KernelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} plugin(s), {} subscription(s), {} active timer(s)",
            self.plugins, self.subscriptions, self.timers
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoImages;

    impl ImageLoader for NoImages {
        fn open(&self, path: &std::path::Path) -> KernelResult<Box<dyn PluginImage>> {
            Err(KernelError::LibraryLoadFailure {
                path: path.to_path_buf(),
                reason: "no images in this test".into(),
            })
        }
    }

    fn kernel() -> Kernel {
        Kernel::new("plugins", Box::new(NoImages))
    }

    static TICKS: AtomicUsize = AtomicUsize::new(0);
    extern "C" fn count_tick(_: *const c_char, _: *const c_char) {
        TICKS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn publish_reaches_subscribers_in_order_and_unsubscribe_silences() {
        let k = kernel();
        TICKS.store(0, Ordering::SeqCst);

        k.subscribe("tick", count_tick);
        k.publish("tick", "16ms");
        k.publish("tick", "16ms");
        assert_eq!(TICKS.load(Ordering::SeqCst), 2);

        k.unsubscribe(count_tick);
        k.publish("tick", "16ms");
        assert_eq!(TICKS.load(Ordering::SeqCst), 2);
        assert_eq!(k.stats().subscriptions, 0);
    }

    #[test]
    fn store_round_trip_and_delete() {
        let k = kernel();
        k.set_data("answer", CString::new("42").unwrap());
        assert_eq!(k.get_data("answer").unwrap().to_str().unwrap(), "42");
        assert!(k.has_data("answer"));

        assert!(k.delete_data("answer"));
        assert!(!k.has_data("answer"));
        assert!(k.get_data("answer").is_none());
        assert!(k.get_data_ptr("answer").is_null());
    }

    static TIMER_FIRES: AtomicUsize = AtomicUsize::new(0);
    extern "C" fn count_timer(_: *const c_char, _: *const c_char) {
        TIMER_FIRES.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn timers_fire_through_tick_and_cancel_sticks() {
        let k = kernel();
        TIMER_FIRES.store(0, Ordering::SeqCst);
        let base = Instant::now();

        let id = k.set_timer(50, count_timer, true);
        assert_eq!(id, 1);

        k.tick(base + std::time::Duration::from_millis(100));
        assert_eq!(TIMER_FIRES.load(Ordering::SeqCst), 1);

        assert!(k.cancel_timer(id));
        k.tick(base + std::time::Duration::from_millis(1000));
        assert_eq!(TIMER_FIRES.load(Ordering::SeqCst), 1);
        assert_eq!(k.stats().timers, 0);
    }

    #[test]
    fn unload_of_unknown_plugin_is_a_no_op() {
        let k = kernel();
        assert!(!k.unload_plugin("ghost.so"));
        assert!(matches!(
            k.try_unload_plugin("ghost.so"),
            Err(KernelError::UnknownPlugin(name)) if name == "ghost.so"
        ));
        assert_eq!(k.stats().plugins, 0);
    }

    #[test]
    fn load_failure_surfaces_loader_error() {
        let k = kernel();
        let err = k.load_plugin("anything.so").unwrap_err();
        assert!(matches!(err, KernelError::LibraryLoadFailure { .. }));
    }
}
