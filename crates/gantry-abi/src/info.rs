//! Plugin descriptor — the static, C-layout handle to a plugin image.

use std::ffi::c_char;
use std::ptr;

/// The single honored ABI revision.  A plugin whose
/// [`PluginInfo::abi_version`] differs is refused at load time.
pub const ABI_V1: u32 = 1;

/// Capacity of the [`PluginInfo::dependencies`] table.
///
/// The table is terminated by the first entry whose `name` is null or empty;
/// entries past the terminator are never read.
pub const MAX_DEPENDENCIES: usize = 128;

/// Advisory priority: load as early as possible.
pub const PRIORITY_FIRST: c_char = 0;
/// Advisory priority: no ordering preference.
pub const PRIORITY_DEFAULT: c_char = 1;
/// Advisory priority: load after the rest.
pub const PRIORITY_LATER: c_char = 2;

/// The named plugin must load before the declaring plugin; failure to load it
/// aborts the declaring plugin's load.
pub const DEP_KIND_REQUIRED: u8 = 0;
/// The named plugin is loaded on a best-effort basis; failure is reported and
/// ignored.
pub const DEP_KIND_OPTIONAL: u8 = 1;

// ─── Dependency ───────────────────────────────────────────────────────────────

/// One entry in a plugin's dependency table.
///
/// `name` is the file name of another plugin (resolved against the host's
/// plugin directory), NUL-terminated, valid for the library's lifetime.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Dependency {
    /// Plugin file name; null or empty terminates the table.
    pub name: *const c_char,
    /// [`DEP_KIND_REQUIRED`] or [`DEP_KIND_OPTIONAL`].
    pub kind: u8,
}

impl Dependency {
    /// The table terminator.
    pub const END: Dependency = Dependency {
        name: ptr::null(),
        kind: DEP_KIND_REQUIRED,
    };
}

// The pointers inside a descriptor reference static data inside the plugin
// image and are never written after construction.
unsafe impl Sync for Dependency {}

// ─── PluginInfo ───────────────────────────────────────────────────────────────

/// Static descriptor returned by a plugin's `plugin_get_info` export.
///
/// The pointer returned from `plugin_get_info` must stay valid for the whole
/// lifetime of the loaded library; the conventional implementation is a
/// `static` item inside the plugin image.
///
/// # Memory layout
///
/// `PluginInfo` is `#[repr(C)]`.  Fields **must not be reordered** — the
/// layout is part of [`ABI_V1`].
#[repr(C)]
pub struct PluginInfo {
    /// Human-readable identifier, NUL-terminated.
    pub name: *const c_char,
    /// Semver-ish version string, NUL-terminated.
    pub version: *const c_char,
    /// Must equal [`ABI_V1`].
    pub abi_version: u32,
    /// One of [`PRIORITY_FIRST`] / [`PRIORITY_DEFAULT`] / [`PRIORITY_LATER`].
    /// Advisory only.
    pub priority: c_char,
    /// Dependency table, terminated by the first null/empty `name`.
    pub dependencies: [Dependency; MAX_DEPENDENCIES],
}

// Same reasoning as Dependency: immutable for the image's lifetime.
unsafe impl Sync for PluginInfo {}

/// Builds a full-capacity dependency table from a shorter prefix, padding
/// with [`Dependency::END`].
///
/// `const`, so it can initialize the `static` descriptor emitted by
/// [`declare_plugin!`](crate::declare_plugin).
pub const fn dependency_table<const N: usize>(
    prefix: [Dependency; N],
) -> [Dependency; MAX_DEPENDENCIES] {
    let mut table = [Dependency::END; MAX_DEPENDENCIES];
    let mut i = 0;
    while i < N {
        table[i] = prefix[i];
        i += 1;
    }
    table
}
