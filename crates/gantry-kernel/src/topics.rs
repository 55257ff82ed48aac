//! Well-known topic names used by the host itself.

/// Published once per main-loop iteration; payload is the tick interval,
/// e.g. `"16ms"`.
pub const TICK: &str = "tick";

/// Published when the console line editor commits a non-empty line; payload
/// is the line.
pub const CONSOLE_INPUT: &str = "consoleInput";

/// Published after each successful plugin load; payload is the plugin's
/// declared name.
pub const PLUGIN_LOADED: &str = "pluginLoaded";

/// Plugins publish here to ask for the plugin table; the host answers on
/// [`PLUGIN_LIST`].
pub const PLUGIN_LIST_REQUEST: &str = "requestPluginList";

/// Host answer to [`PLUGIN_LIST_REQUEST`]; payload is a comma-separated list
/// of `name vVERSION (file)` entries.
pub const PLUGIN_LIST: &str = "pluginList";

/// Topic name timers are delivered under; the payload is always empty.
pub const TIMER: &str = "timer";
