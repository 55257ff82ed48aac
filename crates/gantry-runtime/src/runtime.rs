//! Main runtime orchestration: bootstrap, the cooperative tick loop, and
//! shutdown.
//!
//! Each iteration of [`GantryRuntime::run`]:
//!
//! 1. Drains unloads deferred from the previous iteration's dispatches.
//! 2. Advances the timer wheel with the current monotonic time.
//! 3. Publishes [`topics::TICK`] with the tick interval as payload.
//! 4. Services console input until the tick deadline, which doubles as the
//!    per-iteration sleep: ESC initiates shutdown, Enter commits the line
//!    editor onto [`topics::CONSOLE_INPUT`], Backspace erases, printable
//!    ASCII echoes.
//!
//! On shutdown the plugin table unloads in reverse load order.

use std::ffi::c_char;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use gantry_kernel::loader::DynamicImageLoader;
use gantry_kernel::{Kernel, topics, vtable};

use crate::config::HostConfig;
use crate::console::{ConsoleKey, LineEditor, PROMPT, RawModeGuard, poll_key};

/// The gantry host runtime.
pub struct GantryRuntime {
    kernel: Arc<Kernel>,
    config: HostConfig,
}

impl GantryRuntime {
    /// Creates a runtime with a kernel resolving plugins against
    /// `config.plugin_dir`.
    pub fn new(config: HostConfig) -> Self {
        let kernel = Arc::new(Kernel::new(
            config.plugin_dir.clone(),
            Box::new(DynamicImageLoader),
        ));
        Self { kernel, config }
    }

    /// The kernel handle, for embedders and tests.
    pub fn kernel(&self) -> &Arc<Kernel> {
        &self.kernel
    }

    /// Installs the kernel behind the host vtable and loads the manifest
    /// entries in order.  Failed loads are reported and skipped; the host
    /// keeps running.
    pub fn bootstrap(&self, entries: &[(String, String)]) {
        vtable::install(Arc::clone(&self.kernel));
        self.kernel
            .subscribe(topics::PLUGIN_LIST_REQUEST, answer_plugin_list);

        if entries.is_empty() {
            warn!("No plugins listed in the manifest, starting empty");
        }
        for (entry, file) in entries {
            info!(entry = %entry, file = %file, "Loading plugin");
            if let Err(err) = self.kernel.load_plugin(file) {
                error!(file = %file, error = %err, "Failed to load plugin");
            }
        }
        info!("Host ready: {}", self.kernel.stats());
    }

    /// Runs the cooperative main loop until ESC, then tears everything down.
    pub fn run(&self) -> anyhow::Result<()> {
        let tick = Duration::from_millis(self.config.tick_ms);
        let tick_payload = format!("{}ms", self.config.tick_ms);

        let mut guard = RawModeGuard::enter()?;
        let mut editor = LineEditor::default();
        let mut stdout = io::stdout();
        write!(stdout, "{PROMPT}")?;
        stdout.flush()?;

        let mut running = true;
        while running {
            self.kernel.drain_pending_unloads();
            self.kernel.tick(Instant::now());
            self.kernel.publish(topics::TICK, &tick_payload);

            // Service input until the tick deadline; the poll wait is the
            // loop's only suspension point.
            let deadline = Instant::now() + tick;
            loop {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                let Some(key) = poll_key(deadline - now)? else {
                    continue;
                };
                match key {
                    ConsoleKey::Escape => {
                        write!(stdout, "\r\n")?;
                        stdout.flush()?;
                        info!("ESC pressed, shutting down");
                        running = false;
                        break;
                    }
                    ConsoleKey::Enter => {
                        write!(stdout, "\r\n")?;
                        stdout.flush()?;
                        if let Some(line) = editor.commit() {
                            self.kernel.publish(topics::CONSOLE_INPUT, &line);
                        }
                        write!(stdout, "{PROMPT}")?;
                        stdout.flush()?;
                    }
                    ConsoleKey::Backspace => {
                        if editor.backspace() {
                            write!(stdout, "\x08 \x08")?;
                            stdout.flush()?;
                        }
                    }
                    ConsoleKey::Char(c) => {
                        editor.push(c);
                        write!(stdout, "{c}")?;
                        stdout.flush()?;
                    }
                }
            }
        }

        self.kernel.shutdown();
        vtable::uninstall();
        guard.leave()?;
        info!("Clean shutdown");
        Ok(())
    }
}

/// Host-owned subscriber answering [`topics::PLUGIN_LIST_REQUEST`] with the
/// current plugin table on [`topics::PLUGIN_LIST`].
extern "C" fn answer_plugin_list(_topic: *const c_char, _payload: *const c_char) {
    let Some(kernel) = vtable::active() else {
        return;
    };
    let listing = kernel
        .plugin_summaries()
        .iter()
        .map(|p| format!("{} v{} ({})", p.name, p.version, p.requested_name))
        .collect::<Vec<_>>()
        .join(", ");
    kernel.publish(topics::PLUGIN_LIST, &listing);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::sync::Mutex;

    static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());

    extern "C" fn capture(_topic: *const c_char, payload: *const c_char) {
        let payload = if payload.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(payload) }
                .to_string_lossy()
                .into_owned()
        };
        CAPTURED.lock().unwrap().push(payload);
    }

    #[test]
    fn plugin_list_answer_round_trips_through_the_bus() {
        CAPTURED.lock().unwrap().clear();

        let runtime = GantryRuntime::new(HostConfig::default());
        vtable::install(Arc::clone(runtime.kernel()));
        runtime.kernel().subscribe(topics::PLUGIN_LIST_REQUEST, answer_plugin_list);
        runtime.kernel().subscribe(topics::PLUGIN_LIST, capture);

        runtime.kernel().publish(topics::PLUGIN_LIST_REQUEST, "");
        assert_eq!(*CAPTURED.lock().unwrap(), vec![String::new()]);

        vtable::uninstall();
    }
}
