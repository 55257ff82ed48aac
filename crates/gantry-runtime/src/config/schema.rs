//! Host configuration schema.

use std::path::PathBuf;

use tracing::warn;

/// Manifest file name looked up in the working directory.
pub const DEFAULT_MANIFEST: &str = "plugins.ini";
/// Section holding host settings.
pub const HOST_SECTION: &str = "HOST";
/// Section listing plugin files to load at startup, in order.
pub const PLUGINS_SECTION: &str = "PLUGINS";

/// Host settings from the `[HOST]` manifest section, with defaults for
/// everything the section omits.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Directory plugin file names are resolved against.
    pub plugin_dir: PathBuf,
    /// Main-loop tick interval in milliseconds.
    pub tick_ms: u64,
    /// Default `tracing` filter (overridden by `RUST_LOG`).
    pub log_filter: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            plugin_dir: PathBuf::from("plugins"),
            tick_ms: 16,
            log_filter: "info".to_string(),
        }
    }
}

impl HostConfig {
    /// Applies `[HOST]` entries over the defaults.  Unknown keys and
    /// malformed values warn and keep the default.
    pub fn from_entries(entries: &[(String, String)]) -> Self {
        let mut config = HostConfig::default();
        for (key, value) in entries {
            match key.as_str() {
                "plugin_dir" => config.plugin_dir = PathBuf::from(value),
                "tick_ms" => match value.parse::<u64>() {
                    Ok(ms) if ms > 0 => config.tick_ms = ms,
                    _ => warn!(value = %value, "Invalid tick_ms in [HOST], keeping default"),
                },
                "log_filter" => config.log_filter = value.clone(),
                other => warn!(key = %other, "Unknown [HOST] key ignored"),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_section_yields_defaults() {
        let config = HostConfig::from_entries(&[]);
        assert_eq!(config.plugin_dir, PathBuf::from("plugins"));
        assert_eq!(config.tick_ms, 16);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn known_keys_override_defaults() {
        let config = HostConfig::from_entries(&entries(&[
            ("plugin_dir", "extensions"),
            ("tick_ms", "50"),
            ("log_filter", "gantry=debug"),
        ]));
        assert_eq!(config.plugin_dir, PathBuf::from("extensions"));
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.log_filter, "gantry=debug");
    }

    #[test]
    fn bad_tick_values_keep_the_default() {
        let config = HostConfig::from_entries(&entries(&[("tick_ms", "soon"), ("tick_ms", "0")]));
        assert_eq!(config.tick_ms, 16);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = HostConfig::from_entries(&entries(&[("color", "mauve")]));
        assert_eq!(config.tick_ms, 16);
    }
}
