//! Plugin image loading and descriptor parsing.
//!
//! [`ImageLoader`] is the seam over the dynamic-library mechanics:
//! production uses [`DynamicImageLoader`] (backed by `libloading`), tests
//! substitute an in-process registry of entry points.  Everything above the
//! seam — ABI verification, dependency resolution, init/shutdown — lives in
//! the [`Kernel`](crate::kernel::Kernel) and is identical in both cases.

use std::ffi::{CStr, c_char};
use std::path::Path;

use libloading::Library;

use gantry_abi::{
    DEP_KIND_REQUIRED, PRIORITY_FIRST, PRIORITY_LATER, PluginGetInfoFn, PluginInfo, PluginInitFn,
    PluginShutdownFn, SYM_PLUGIN_GET_INFO, SYM_PLUGIN_INIT, SYM_PLUGIN_SHUTDOWN,
};

use crate::error::{KernelError, KernelResult};

// ─── Entry points ─────────────────────────────────────────────────────────────

/// The three mandatory exports, resolved to plain function pointers.
#[derive(Clone, Copy)]
pub struct EntryPoints {
    /// `plugin_get_info`.
    pub get_info: PluginGetInfoFn,
    /// `plugin_init`.
    pub init: PluginInitFn,
    /// `plugin_shutdown`.
    pub shutdown: PluginShutdownFn,
}

// ─── Image seam ───────────────────────────────────────────────────────────────

/// A loaded plugin image.
///
/// Dropping the image releases the underlying library handle, so the owner
/// must hold it for as long as any pointer resolved from it may be invoked —
/// the kernel drops it strictly after scrubbing the bus and the timer wheel.
pub trait PluginImage: Send {
    /// Resolved mandatory entry points.
    fn entries(&self) -> EntryPoints;
}

/// Opens plugin images by path.
pub trait ImageLoader: Send + Sync {
    /// Opens the image at `path` and resolves its mandatory exports.
    fn open(&self, path: &Path) -> KernelResult<Box<dyn PluginImage>>;
}

/// Production loader backed by the platform dynamic linker.
pub struct DynamicImageLoader;

struct DynamicImage {
    entries: EntryPoints,
    // Held purely for Drop: releasing the handle unmaps the code every
    // resolved pointer jumps into.
    _library: Library,
}

impl PluginImage for DynamicImage {
    fn entries(&self) -> EntryPoints {
        self.entries
    }
}

impl ImageLoader for DynamicImageLoader {
    fn open(&self, path: &Path) -> KernelResult<Box<dyn PluginImage>> {
        // SAFETY: loading a library runs its initializers; we trust anything
        // the operator put into the plugin directory, per the host's
        // no-sandboxing contract.
        let library = unsafe { Library::new(path) }.map_err(|e| KernelError::LibraryLoadFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let get_info =
            resolve::<PluginGetInfoFn>(&library, path, SYM_PLUGIN_GET_INFO, "plugin_get_info")?;
        let init = resolve::<PluginInitFn>(&library, path, SYM_PLUGIN_INIT, "plugin_init")?;
        let shutdown =
            resolve::<PluginShutdownFn>(&library, path, SYM_PLUGIN_SHUTDOWN, "plugin_shutdown")?;

        Ok(Box::new(DynamicImage {
            entries: EntryPoints {
                get_info,
                init,
                shutdown,
            },
            _library: library,
        }))
    }
}

fn resolve<T: Copy>(
    library: &Library,
    path: &Path,
    symbol: &[u8],
    display: &'static str,
) -> KernelResult<T> {
    // SAFETY: the symbol type is one of the ABI entry-point signatures; a
    // plugin exporting the name with a different shape is undefined behavior
    // by the ABI contract, not something the host can detect.
    unsafe { library.get::<T>(symbol) }
        .map(|sym| *sym)
        .map_err(|_| KernelError::MissingSymbol {
            name: image_label(path),
            symbol: display,
        })
}

/// File-name label used in diagnostics.
pub(crate) fn image_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ─── Parsed descriptor ────────────────────────────────────────────────────────

/// Advisory load priority, decoded from the raw descriptor byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Load as early as possible.
    First,
    /// No preference.
    Default,
    /// Load after the rest.
    Later,
}

impl Priority {
    fn from_raw(raw: c_char) -> Self {
        match raw {
            _ if raw == PRIORITY_FIRST => Priority::First,
            _ if raw == PRIORITY_LATER => Priority::Later,
            _ => Priority::Default,
        }
    }
}

/// Dependency kind, decoded per entry.  Unknown kind bytes are treated as
/// optional rather than refusing the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Must load before the declaring plugin.
    Required,
    /// Loaded best-effort.
    Optional,
}

/// One parsed dependency entry.
#[derive(Debug, Clone)]
pub struct DependencySpec {
    /// Plugin file name, resolved against the plugin directory.
    pub name: String,
    /// Required or optional.
    pub kind: DependencyKind,
}

/// Owned, host-side copy of a plugin's [`PluginInfo`] descriptor.
#[derive(Debug, Clone)]
pub struct PluginMeta {
    /// Declared plugin name.
    pub name: String,
    /// Declared version string.
    pub version: String,
    /// Advisory priority.
    pub priority: Priority,
    /// Dependency table up to the first null/empty name, kinds honored
    /// per entry.
    pub dependencies: Vec<DependencySpec>,
}

impl PluginMeta {
    /// Copies a raw descriptor into owned form.
    ///
    /// # Safety
    ///
    /// `info.name`, `info.version`, and every dependency `name` up to the
    /// table terminator must be null or point to NUL-terminated strings
    /// valid for the duration of the call.
    pub unsafe fn from_raw(info: &PluginInfo) -> Self {
        let mut dependencies = Vec::new();
        for dep in &info.dependencies {
            let Some(name) = (unsafe { owned_non_empty(dep.name) }) else {
                break;
            };
            let kind = if dep.kind == DEP_KIND_REQUIRED {
                DependencyKind::Required
            } else {
                DependencyKind::Optional
            };
            dependencies.push(DependencySpec { name, kind });
        }

        PluginMeta {
            name: unsafe { owned_or_empty(info.name) },
            version: unsafe { owned_or_empty(info.version) },
            priority: Priority::from_raw(info.priority),
            dependencies,
        }
    }
}

unsafe fn owned_or_empty(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

unsafe fn owned_non_empty(ptr: *const c_char) -> Option<String> {
    let s = unsafe { owned_or_empty(ptr) };
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_abi::{
        ABI_V1, DEP_KIND_OPTIONAL, Dependency, PRIORITY_DEFAULT, dependency_table,
    };

    fn info_with(deps: [Dependency; 3]) -> PluginInfo {
        PluginInfo {
            name: c"sample".as_ptr(),
            version: c"0.3.1".as_ptr(),
            abi_version: ABI_V1,
            priority: PRIORITY_DEFAULT,
            dependencies: dependency_table(deps),
        }
    }

    #[test]
    fn descriptor_strings_are_copied() {
        let info = info_with([Dependency::END; 3]);
        let meta = unsafe { PluginMeta::from_raw(&info) };
        assert_eq!(meta.name, "sample");
        assert_eq!(meta.version, "0.3.1");
        assert_eq!(meta.priority, Priority::Default);
        assert!(meta.dependencies.is_empty());
    }

    #[test]
    fn dependency_walk_honors_kind_per_entry() {
        // An optional entry must not terminate the table; only an empty
        // name does.
        let info = info_with([
            Dependency {
                name: c"first.so".as_ptr(),
                kind: DEP_KIND_OPTIONAL,
            },
            Dependency {
                name: c"second.so".as_ptr(),
                kind: DEP_KIND_REQUIRED,
            },
            Dependency::END,
        ]);
        let meta = unsafe { PluginMeta::from_raw(&info) };
        assert_eq!(meta.dependencies.len(), 2);
        assert_eq!(meta.dependencies[0].kind, DependencyKind::Optional);
        assert_eq!(meta.dependencies[1].kind, DependencyKind::Required);
        assert_eq!(meta.dependencies[1].name, "second.so");
    }

    #[test]
    fn empty_name_terminates_before_later_entries() {
        let info = info_with([
            Dependency {
                name: c"".as_ptr(),
                kind: DEP_KIND_REQUIRED,
            },
            Dependency {
                name: c"unreachable.so".as_ptr(),
                kind: DEP_KIND_REQUIRED,
            },
            Dependency::END,
        ]);
        let meta = unsafe { PluginMeta::from_raw(&info) };
        assert!(meta.dependencies.is_empty());
    }

    #[test]
    fn priority_decodes_known_values_and_defaults_the_rest() {
        assert_eq!(Priority::from_raw(PRIORITY_FIRST), Priority::First);
        assert_eq!(Priority::from_raw(PRIORITY_LATER), Priority::Later);
        assert_eq!(Priority::from_raw(77), Priority::Default);
    }

    #[test]
    fn dynamic_loader_reports_missing_files() {
        let result = DynamicImageLoader.open(Path::new("plugins/definitely-absent.so"));
        assert!(matches!(
            result,
            Err(KernelError::LibraryLoadFailure { .. })
        ));
    }
}
