//! Reader for a profile's `modlist.txt`.
//!
//! One mod per line, highest priority first:
//! - `+Name` enabled
//! - `-Name` disabled
//! - `*Name` unmanaged (DLC and other game-provided content)
//!
//! Lines starting with `#` are comments.

use std::io;
use std::path::Path;

use crate::paths::eq_ignore_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModStatus {
    Enabled,
    Disabled,
    Unmanaged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModListEntry {
    pub name: String,
    pub status: ModStatus,
    /// 0 is the lowest priority (last line of the file)
    pub priority: i32,
}

/// Parsed modlist.txt
#[derive(Debug, Clone, Default)]
pub struct ModList {
    /// Entries in file order (highest priority first)
    pub entries: Vec<ModListEntry>,
}

impl ModList {
    pub fn parse(content: &str) -> Self {
        let mut entries: Vec<ModListEntry> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let status = match line.as_bytes()[0] {
                    b'+' => ModStatus::Enabled,
                    b'-' => ModStatus::Disabled,
                    b'*' => ModStatus::Unmanaged,
                    _ => return None,
                };
                let name = line[1..].trim();
                (!name.is_empty()).then(|| ModListEntry {
                    name: name.to_string(),
                    status,
                    priority: 0,
                })
            })
            .collect();

        let count = entries.len() as i32;
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.priority = count - 1 - i as i32;
        }
        ModList { entries }
    }

    pub fn read(path: &Path) -> io::Result<Self> {
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    /// Find an entry by mod name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&ModListEntry> {
        self.entries.iter().find(|e| eq_ignore_case(&e.name, name))
    }

    pub fn priority(&self, name: &str) -> Option<i32> {
        self.find(name).map(|e| e.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# This file was automatically generated by Mod Organizer.\r\n\
        +SKSE\r\n\
        -Old Textures\r\n\
        *DLC: Dawnguard\r\n\
        \r\n\
        +Unofficial Patch\r\n";

    #[test]
    fn test_parse() {
        let list = ModList::parse(SAMPLE);
        let names: Vec<&str> = list.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["SKSE", "Old Textures", "DLC: Dawnguard", "Unofficial Patch"]
        );
        assert_eq!(list.entries[1].status, ModStatus::Disabled);
        assert_eq!(list.entries[2].status, ModStatus::Unmanaged);
    }

    #[test]
    fn test_priority() {
        let list = ModList::parse(SAMPLE);
        assert_eq!(list.priority("SKSE"), Some(3));
        assert_eq!(list.priority("unofficial patch"), Some(0));
        assert_eq!(list.priority("Missing"), None);
    }

    #[test]
    fn test_ignores_malformed_lines() {
        let list = ModList::parse("garbage\n+\n+Real\n");
        assert_eq!(list.entries.len(), 1);
        assert_eq!(list.entries[0].name, "Real");
        assert_eq!(list.entries[0].priority, 0);
    }
}
