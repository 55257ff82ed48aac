//! Error types for the gantry kernel.
//!
//! Every variant is surfaced at a lifecycle boundary (load/unload); none of
//! them propagate into the event-dispatch hot path.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or unloading plugins.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The platform loader rejected the file.
    #[error("failed to load library '{path}': {reason}")]
    LibraryLoadFailure {
        /// Path handed to the dynamic loader.
        path: PathBuf,
        /// Loader-reported reason.
        reason: String,
    },

    /// One of the three mandatory exports is absent.
    #[error("plugin '{name}' is missing required export `{symbol}`")]
    MissingSymbol {
        /// Image the symbol was looked up in.
        name: String,
        /// The missing export.
        symbol: &'static str,
    },

    /// `plugin_get_info` returned a null descriptor.
    #[error("plugin '{name}' returned a null descriptor")]
    InvalidDescriptor {
        /// Image that misbehaved.
        name: String,
    },

    /// The descriptor's `abi_version` is not the one this host honors.
    #[error("plugin '{name}' targets ABI version {found}, host requires {required}")]
    AbiMismatch {
        /// Image that was refused.
        name: String,
        /// Version the descriptor declared.
        found: u32,
        /// Version the host honors.
        required: u32,
    },

    /// `plugin_init` returned false.  The library is released without
    /// calling `plugin_shutdown`.
    #[error("plugin '{name}' rejected initialization")]
    InitRejected {
        /// Image that declined.
        name: String,
    },

    /// A required dependency failed to load, aborting the parent load.
    #[error("required dependency '{dependency}' of plugin '{name}' failed to load")]
    DependencyUnavailable {
        /// Plugin whose load was aborted.
        name: String,
        /// The dependency that could not be loaded.
        dependency: String,
        /// Why the dependency load failed.
        #[source]
        source: Box<KernelError>,
    },

    /// `unload_plugin` named a plugin that is not in the table.
    #[error("no loaded plugin named '{0}'")]
    UnknownPlugin(String),
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;
