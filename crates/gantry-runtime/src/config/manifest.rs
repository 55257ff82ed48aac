//! INI-style manifest reading.
//!
//! The grammar is flat: `[SECTION]` headers, `key=value` lines, comment
//! leaders `;` and `#`, whitespace stripped from both sides of keys and
//! values.  Lines without `=` inside a section are skipped with a debug log;
//! entries before the first header are skipped likewise.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::error::{ManifestError, ManifestResult};

/// Parsed manifest: section name → ordered `(key, value)` entries.
#[derive(Debug)]
pub struct Manifest {
    sections: HashMap<String, Vec<(String, String)>>,
}

impl Manifest {
    /// Reads and parses the manifest at `path`.
    pub fn load(path: &Path) -> ManifestResult<Manifest> {
        if !path.exists() {
            return Err(ManifestError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Parses manifest text.  Never fails: malformed lines are skipped.
    pub fn parse(content: &str) -> Manifest {
        let mut sections: HashMap<String, Vec<(String, String)>> = HashMap::new();
        let mut current: Option<String> = None;

        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = header.trim().to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }
            let Some(section) = current.as_ref() else {
                debug!(line = %line, "Manifest entry before any section header, skipped");
                continue;
            };
            match line.split_once('=') {
                Some((key, value)) => sections
                    .entry(section.clone())
                    .or_default()
                    .push((key.trim().to_string(), value.trim().to_string())),
                None => {
                    debug!(section = %section, line = %line, "Manifest line without '=', skipped");
                }
            }
        }

        Manifest { sections }
    }

    /// The ordered entries of `name`; empty when the section is absent.
    pub fn section(&self, name: &str) -> &[(String, String)] {
        self.sections.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a `[name]` header appeared in the file.
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }
}
