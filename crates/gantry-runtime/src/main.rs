//! Gantry host entrypoint.

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use gantry_runtime::config::{
    DEFAULT_MANIFEST, HOST_SECTION, HostConfig, Manifest, PLUGINS_SECTION,
};
use gantry_runtime::logging::LoggingBuilder;
use gantry_runtime::runtime::GantryRuntime;

fn main() -> Result<()> {
    let manifest = Manifest::load(Path::new(DEFAULT_MANIFEST));
    let host_entries = manifest
        .as_ref()
        .map(|m| m.section(HOST_SECTION).to_vec())
        .unwrap_or_default();

    // Bring logging up before the config pass so its warnings are visible;
    // the filter key is the only setting logging itself needs.
    let filter = host_entries
        .iter()
        .rev()
        .find(|(key, _)| key == "log_filter")
        .map(|(_, value)| value.clone())
        .unwrap_or_else(|| "info".to_string());
    LoggingBuilder::new().with_filter(filter).init();

    info!("Starting gantry host");
    let config = HostConfig::from_entries(&host_entries);

    let plugin_entries = match &manifest {
        Ok(m) => {
            if !m.has_section(PLUGINS_SECTION) {
                warn!("Manifest has no [{PLUGINS_SECTION}] section");
            }
            m.section(PLUGINS_SECTION).to_vec()
        }
        Err(err) => {
            warn!(error = %err, "Proceeding without a manifest");
            Vec::new()
        }
    };

    let runtime = GantryRuntime::new(config);
    runtime.bootstrap(&plugin_entries);
    runtime.run()
}
