//! Configuration module for the gantry host.
//!
//! Everything on disk is flat INI: one `plugins.ini` with a `[HOST]` section
//! for host settings and a `[PLUGINS]` section listing plugin files in load
//! order.

pub mod error;
pub mod manifest;
pub mod schema;

pub use error::{ManifestError, ManifestResult};
pub use manifest::Manifest;
pub use schema::{DEFAULT_MANIFEST, HOST_SECTION, HostConfig, PLUGINS_SECTION};
