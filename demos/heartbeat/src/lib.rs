//! Heartbeat demo plugin: publishes `heartbeat` once a second from a
//! repeating host timer.

use std::sync::atomic::{AtomicU64, Ordering};

use gantry_abi::{self as abi, PRIORITY_FIRST};

static TIMER_ID: AtomicU64 = AtomicU64::new(0);

gantry_abi::event_handler! {
    fn on_timer(_topic, _payload) {
        abi::send_event(c"heartbeat", c"1s");
    }
}

fn init() -> bool {
    let id = abi::set_timer(1000, on_timer, true);
    if id == 0 {
        return false;
    }
    TIMER_ID.store(id, Ordering::SeqCst);
    true
}

fn shutdown() {
    let id = TIMER_ID.swap(0, Ordering::SeqCst);
    if id != 0 {
        abi::cancel_timer(id);
    }
}

gantry_abi::declare_plugin! {
    name: c"heartbeat",
    version: c"1.0.0",
    priority: PRIORITY_FIRST,
    dependencies: [],
    init: init,
    shutdown: shutdown,
}
