//! Logger demo plugin: mirrors interesting topics into the host log.
//!
//! Registers one callback against several topics; the host delivers the
//! topic name with every event, so a single handler covers them all.

use std::ffi::CString;

use gantry_abi::{self as abi, PRIORITY_LATER};

gantry_abi::event_handler! {
    fn on_any(topic, payload) {
        let line = format!(
            "event={} payload={}",
            topic.to_string_lossy(),
            payload.to_string_lossy()
        );
        if let Ok(line) = CString::new(line) {
            abi::log(c"INFO", &line);
        }
    }
}

fn init() -> bool {
    for topic in [c"heartbeat", c"chatMessage", c"chatReply", c"pluginLoaded"] {
        abi::register_event(topic, on_any);
    }
    true
}

fn shutdown() {
    // One call scrubs every registration of the pointer.
    abi::unregister_event(on_any);
}

gantry_abi::declare_plugin! {
    name: c"logger",
    version: c"1.0.0",
    priority: PRIORITY_LATER,
    dependencies: [],
    init: init,
    shutdown: shutdown,
}
