//! Echo demo plugin: replies to every `chatMessage` with a `chatReply`.

use std::ffi::CString;

use gantry_abi::{self as abi, PRIORITY_DEFAULT};

gantry_abi::event_handler! {
    fn on_chat(_topic, payload) {
        let reply = format!("Echo: {}", payload.to_string_lossy());
        if let Ok(reply) = CString::new(reply) {
            abi::send_event(c"chatReply", &reply);
        }
    }
}

fn init() -> bool {
    abi::log(c"INFO", c"echo initialized");
    abi::register_event(c"chatMessage", on_chat);
    true
}

fn shutdown() {
    abi::log(c"INFO", c"echo shutdown");
}

gantry_abi::declare_plugin! {
    name: c"echo",
    version: c"1.0.0",
    priority: PRIORITY_DEFAULT,
    dependencies: [],
    init: init,
    shutdown: shutdown,
}
