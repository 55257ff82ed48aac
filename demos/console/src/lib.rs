//! Command console demo plugin.
//!
//! Interprets committed console lines as commands:
//!
//! ```text
//! load <plugin>     ask the host to load a plugin file
//! unload <plugin>   ask the host to unload a plugin
//! list              print the plugin table
//! help              print this summary
//! ```

use std::ffi::CString;

use gantry_abi::{self as abi, PRIORITY_LATER};

gantry_abi::event_handler! {
    fn on_plugin_list(_topic, payload) {
        let line = format!("loaded: {}", payload.to_string_lossy());
        if let Ok(line) = CString::new(line) {
            abi::log(c"INFO", &line);
        }
    }
}

gantry_abi::event_handler! {
    fn on_console_input(_topic, payload) {
        let line = payload.to_string_lossy();
        let mut words = line.split_whitespace();
        match words.next() {
            Some("help") => {
                abi::log(c"INFO", c"commands: load <plugin>, unload <plugin>, list, help");
            }
            Some("load") => match words.next() {
                Some(name) => {
                    let Ok(name) = CString::new(name) else { return };
                    if !abi::load_plugin(&name) {
                        abi::log(c"ERROR", c"load failed");
                    }
                }
                None => abi::log(c"WARN", c"usage: load <plugin>"),
            },
            Some("unload") => match words.next() {
                Some(name) => {
                    let Ok(name) = CString::new(name) else { return };
                    if !abi::unload_plugin(&name) {
                        abi::log(c"ERROR", c"no such plugin");
                    }
                }
                None => abi::log(c"WARN", c"usage: unload <plugin>"),
            },
            Some("list") => abi::send_event(c"requestPluginList", c""),
            Some(other) => {
                if let Ok(line) = CString::new(format!("unknown command: {other}")) {
                    abi::log(c"WARN", &line);
                }
            }
            None => {}
        }
    }
}

fn init() -> bool {
    abi::register_event(c"consoleInput", on_console_input);
    abi::register_event(c"pluginList", on_plugin_list);
    true
}

fn shutdown() {
    abi::unregister_event(on_console_input);
    abi::unregister_event(on_plugin_list);
}

gantry_abi::declare_plugin! {
    name: c"console",
    version: c"1.0.0",
    priority: PRIORITY_LATER,
    dependencies: [],
    init: init,
    shutdown: shutdown,
}
