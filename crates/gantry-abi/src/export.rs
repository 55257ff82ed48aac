//! Macros that generate the three mandatory exports of a plugin.

/// Declares a plugin: emits the static [`PluginInfo`](crate::PluginInfo)
/// descriptor plus the `plugin_get_info` / `plugin_init` / `plugin_shutdown`
/// exports.
///
/// `name` and `version` are C-string literals; `init` is a `fn() -> bool`
/// and `shutdown` a `fn()`.  The host vtable is bound before `init` runs, so
/// the helpers in [`gantry_abi::plugin`](crate::plugin) are usable from
/// inside it.
///
/// ```rust,ignore
/// gantry_abi::declare_plugin! {
///     name: c"echo",
///     version: c"1.0.0",
///     priority: gantry_abi::PRIORITY_DEFAULT,
///     dependencies: [c"logger.so" => gantry_abi::DEP_KIND_OPTIONAL],
///     init: init,
///     shutdown: shutdown,
/// }
/// ```
#[macro_export]
macro_rules! declare_plugin {
    (
        name: $name:expr,
        version: $version:expr,
        priority: $priority:expr,
        dependencies: [$($dep_name:expr => $dep_kind:expr),* $(,)?],
        init: $init:path,
        shutdown: $shutdown:path $(,)?
    ) => {
        static __GANTRY_PLUGIN_INFO: $crate::PluginInfo = $crate::PluginInfo {
            name: $name.as_ptr(),
            version: $version.as_ptr(),
            abi_version: $crate::ABI_V1,
            priority: $priority,
            dependencies: $crate::dependency_table([
                $($crate::Dependency {
                    name: $dep_name.as_ptr(),
                    kind: $dep_kind,
                }),*
            ]),
        };

        #[unsafe(no_mangle)]
        pub extern "C" fn plugin_get_info() -> *const $crate::PluginInfo {
            &__GANTRY_PLUGIN_INFO
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn plugin_init(host: *mut $crate::PluginHost) -> bool {
            if host.is_null() {
                return false;
            }
            $crate::bind_host(host);
            let ok: bool = $init();
            if !ok {
                $crate::unbind_host();
            }
            ok
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn plugin_shutdown() {
            $shutdown();
            $crate::unbind_host();
        }
    };
}

/// Wraps a callback body in the C [`EventCallback`](crate::EventCallback)
/// signature, presenting the topic and payload as `&CStr`.
///
/// ```rust,ignore
/// gantry_abi::event_handler! {
///     fn on_chat(topic, payload) {
///         let _ = (topic, payload);
///     }
/// }
/// ```
#[macro_export]
macro_rules! event_handler {
    ($(#[$meta:meta])* $vis:vis fn $name:ident($topic:ident, $payload:ident) $body:block) => {
        $(#[$meta])*
        $vis extern "C" fn $name(
            __topic: *const ::std::ffi::c_char,
            __payload: *const ::std::ffi::c_char,
        ) {
            let $topic: &::std::ffi::CStr = if __topic.is_null() {
                c""
            } else {
                unsafe { ::std::ffi::CStr::from_ptr(__topic) }
            };
            let $payload: &::std::ffi::CStr = if __payload.is_null() {
                c""
            } else {
                unsafe { ::std::ffi::CStr::from_ptr(__payload) }
            };
            $body
        }
    };
}
