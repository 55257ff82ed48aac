//! Raw-mode console input and the prompt line editor.
//!
//! The terminal is held in raw (non-canonical, no-echo) mode for the life of
//! the [`RawModeGuard`] and restored on drop, even when the driver
//! early-returns.  [`poll_key`] is the host's only suspension point: it
//! doubles as the per-tick sleep.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Prompt redrawn after every committed line.
pub const PROMPT: &str = "> ";

// ─── Raw mode ─────────────────────────────────────────────────────────────────

/// RAII guard holding the terminal in raw mode.
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    /// Enters raw mode.
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self { active: true })
    }

    /// Restores the terminal explicitly (also happens on drop).
    pub fn leave(&mut self) -> Result<()> {
        if self.active {
            disable_raw_mode()?;
            self.active = false;
        }
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Key input ────────────────────────────────────────────────────────────────

/// Keys the driver reacts to; everything else is dropped at translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleKey {
    /// ESC — initiate shutdown.
    Escape,
    /// CR/LF — commit the input buffer.
    Enter,
    /// Backspace or DEL — erase one character.
    Backspace,
    /// Printable ASCII (0x20–0x7E).
    Char(char),
}

/// Waits up to `timeout` for the next interesting key.
///
/// Returns `Ok(None)` on timeout or when the pending event is not a key the
/// driver cares about (resize, release events, non-ASCII input).
pub fn poll_key(timeout: Duration) -> Result<Option<ConsoleKey>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(translate(key)),
        _ => Ok(None),
    }
}

fn translate(key: KeyEvent) -> Option<ConsoleKey> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match key.code {
        KeyCode::Esc => Some(ConsoleKey::Escape),
        KeyCode::Enter => Some(ConsoleKey::Enter),
        KeyCode::Backspace | KeyCode::Delete => Some(ConsoleKey::Backspace),
        KeyCode::Char(c) if (' '..='~').contains(&c) => Some(ConsoleKey::Char(c)),
        _ => None,
    }
}

// ─── Line editor ──────────────────────────────────────────────────────────────

/// Minimal line editor behind the `"> "` prompt.
///
/// Pure state; the driver owns the echoing.
#[derive(Default)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    /// Appends a character.
    pub fn push(&mut self, c: char) {
        self.buffer.push(c);
    }

    /// Removes the last character; returns whether one was removed.
    pub fn backspace(&mut self) -> bool {
        self.buffer.pop().is_some()
    }

    /// Takes the buffered line when non-empty, clearing the buffer.
    pub fn commit(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    /// Current buffer contents.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn printable_ascii_translates_and_the_rest_drops() {
        assert_eq!(translate(key(KeyCode::Char('a'))), Some(ConsoleKey::Char('a')));
        assert_eq!(translate(key(KeyCode::Char(' '))), Some(ConsoleKey::Char(' ')));
        assert_eq!(translate(key(KeyCode::Char('~'))), Some(ConsoleKey::Char('~')));
        assert_eq!(translate(key(KeyCode::Char('é'))), None);
        assert_eq!(translate(key(KeyCode::Tab)), None);
    }

    #[test]
    fn control_chords_are_ignored() {
        let chord = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate(chord), None);
    }

    #[test]
    fn editing_keys_translate() {
        assert_eq!(translate(key(KeyCode::Esc)), Some(ConsoleKey::Escape));
        assert_eq!(translate(key(KeyCode::Enter)), Some(ConsoleKey::Enter));
        assert_eq!(translate(key(KeyCode::Backspace)), Some(ConsoleKey::Backspace));
        assert_eq!(translate(key(KeyCode::Delete)), Some(ConsoleKey::Backspace));
    }

    #[test]
    fn editor_commits_only_non_empty_lines() {
        let mut editor = LineEditor::default();
        assert_eq!(editor.commit(), None);

        editor.push('h');
        editor.push('i');
        assert_eq!(editor.as_str(), "hi");
        assert_eq!(editor.commit(), Some("hi".to_string()));
        assert_eq!(editor.as_str(), "");
        assert_eq!(editor.commit(), None);
    }

    #[test]
    fn backspace_pops_until_empty() {
        let mut editor = LineEditor::default();
        editor.push('x');
        assert!(editor.backspace());
        assert!(!editor.backspace());
        assert_eq!(editor.commit(), None);
    }
}
