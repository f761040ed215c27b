//! Read-only INI parser compatible with the QSettings format MO2 writes.
//!
//! - Sections in `[brackets]`
//! - Keys with `=` separator, values optionally `"quoted"`
//! - Comments start with `;` (MO2 also tolerates `#`)
//! - Nested keys use `\` (e.g. `Plugin Name\setting`)

use std::path::Path;

/// A parsed INI file, sections in file order.
#[derive(Debug, Clone, Default)]
pub struct IniFile {
    /// Empty name = keys before the first section header.
    pub sections: Vec<IniSection>,
}

#[derive(Debug, Clone)]
pub struct IniSection {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl IniFile {
    /// Parse an INI file from string content.
    pub fn parse(content: &str) -> Self {
        let mut sections = vec![IniSection {
            name: String::new(),
            entries: Vec::new(),
        }];

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
                continue;
            }

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                sections.push(IniSection {
                    name: trimmed[1..trimmed.len() - 1].to_string(),
                    entries: Vec::new(),
                });
            } else if let Some(eq_pos) = trimmed.find('=') {
                let key = trimmed[..eq_pos].trim().to_string();
                let value = unquote(trimmed[eq_pos + 1..].trim()).to_string();
                if let Some(section) = sections.last_mut() {
                    section.entries.push((key, value));
                }
            }
        }

        IniFile { sections }
    }

    /// Read and parse an INI file from disk.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Get a value from a specific section by key.
    ///
    /// Later duplicates of a section or key win, as with QSettings.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .rev()
            .filter(|s| s.name == section)
            .find_map(|s| {
                s.entries
                    .iter()
                    .rev()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.as_str())
            })
    }

    /// Get a boolean value (`true`/`false`, `1`/`0`).
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match self.get(section, key)?.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
